//! Core building blocks shared by every tool
//!
//! - **config**: release tables (release-mcp.toml) parsing and validation
//! - **context**: immutable context handed to each tool invocation
//! - **error**: error types with contextual help messages
//! - **vcs**: git and gh operations via the system binaries (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
