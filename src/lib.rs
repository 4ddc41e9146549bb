//! momentum-lab: early-momentum cohort analysis over public activity data
//!
//! This library provides the core components for:
//! - A canonical entity model for early-activity time series
//! - Early-velocity scoring (time-to-threshold and rate-in-window forms)
//! - Percentile and fixed-threshold cohort splitting
//! - Effect-size reporting (mean outcome ratio between cohorts)
//! - Data-source collaborators for GitHub, Hacker News, NPM and citations
//! - JSON snapshot caching of collected entities
//! - Structured logging

pub mod classifier;
pub mod cli;
pub mod config;
pub mod entity;
pub mod source;
pub mod telemetry;
