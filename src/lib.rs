//! rnup - React Native upgrade assistant library
//!
//! This library provides the core of the upgrade workflow:
//! - Parsing upstream release diffs of package.json into package changes
//! - Reconciling those changes against a project's manifest
//! - Applying an approved subset of edits without touching other sections
//! - Annotating dependencies with React Native Directory metadata

pub mod annotate;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod diff;
pub mod domain;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod progress;
pub mod reconcile;
pub mod registry;
pub mod state;
pub mod version;
pub mod watch;
pub mod workflow;
