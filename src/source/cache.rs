//! Entity snapshot cache
//!
//! Wraps any source with a JSON snapshot on disk: the first collection
//! writes the snapshot, later runs replay it instead of hitting the API
//! again (the original studies kept checkpoint files for the same reason).
//! Purely a decorator; the classifier is correct without it.

use std::path::{Path, PathBuf};

use super::EntitySource;
use crate::entity::Entity;

/// A source decorated with a JSON snapshot
pub struct CachedSource<S> {
    inner: S,
    path: PathBuf,
}

impl<S: EntitySource> CachedSource<S> {
    /// Cache `inner` under `dir/<domain>.json`
    pub fn new(inner: S, dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(format!("{}.json", inner.domain()));
        Self { inner, path }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.path
    }

    /// Drop the snapshot so the next collection refetches
    pub fn invalidate(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn load_snapshot(&self) -> anyhow::Result<Option<Vec<Entity>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let entities: Vec<Entity> = serde_json::from_str(&content)?;
        Ok(Some(entities))
    }

    fn store_snapshot(&self, entities: &[Entity]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entities)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S: EntitySource> EntitySource for CachedSource<S> {
    fn domain(&self) -> &'static str {
        self.inner.domain()
    }

    async fn collect(&self, limit: usize) -> anyhow::Result<Vec<Entity>> {
        if let Some(mut entities) = self.load_snapshot()? {
            tracing::info!(
                path = %self.path.display(),
                entities = entities.len(),
                "Replaying entity snapshot"
            );
            entities.truncate(limit);
            return Ok(entities);
        }

        let entities = self.inner.collect(limit).await?;
        self.store_snapshot(&entities)?;
        tracing::info!(
            path = %self.path.display(),
            entities = entities.len(),
            "Entity snapshot written"
        );
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ActivitySeries;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn entities() -> Vec<Entity> {
            let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            (0..3)
                .map(|i| {
                    let series = ActivitySeries::from_pairs(vec![
                        (base, 0),
                        (base + Duration::days(1), 10 * (i + 1)),
                    ]);
                    Entity::new(format!("entity-{i}"), series).with_outcome("total", i as f64)
                })
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl EntitySource for FakeSource {
        fn domain(&self) -> &'static str {
            "fake"
        }

        async fn collect(&self, _limit: usize) -> anyhow::Result<Vec<Entity>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::entities())
        }
    }

    #[tokio::test]
    async fn test_second_collect_replays_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedSource::new(FakeSource::new(), dir.path());

        let first = cached.collect(10).await.unwrap();
        let second = cached.collect(10).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
        assert!(cached.snapshot_path().exists());
    }

    #[tokio::test]
    async fn test_replay_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedSource::new(FakeSource::new(), dir.path());

        cached.collect(10).await.unwrap();
        let limited = cached.collect(2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedSource::new(FakeSource::new(), dir.path());

        cached.collect(10).await.unwrap();
        cached.invalidate().unwrap();
        cached.collect(10).await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_snapshot_path_uses_domain() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedSource::new(FakeSource::new(), dir.path());
        assert!(cached
            .snapshot_path()
            .to_string_lossy()
            .ends_with("fake.json"));
    }
}
