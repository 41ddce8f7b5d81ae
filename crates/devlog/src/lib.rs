//! devlog library
//!
//! This module exports the configuration, the pipeline and the report
//! rendering used by the `devlog` binary, for use in integration tests and
//! as a library.

pub mod config;
pub mod pipeline;
pub mod report;
