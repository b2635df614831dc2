pub mod analyzer;
pub mod backup;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod patterns;
pub mod project;
pub mod rewrite;
pub mod ui;
pub mod version_source;
pub mod warning;

pub use error::{Result, StamperError};
