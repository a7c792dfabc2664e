//! Tool workflows
//!
//! ## Remote (clone, edit, push)
//! - **branches**: create-release-branches, cut `release-v{minor}.x` everywhere
//! - **hack**: configure-hack-repo, register the release in the hack repository
//! - **plans**: create-release-plans, generate and push release documents
//!
//! ## Local
//! - **offline**: render documents or edit branch sections in a local tree
//!
//! Every workflow takes `&ReleaseContext` and returns the text reported back to
//! the caller; the MCP server and the CLI share them.

pub mod branches;
pub mod hack;
pub mod offline;
pub mod plans;

pub use branches::run_create_release_branches;
pub use hack::{HackRequest, run_configure_hack_repo};
pub use offline::{run_render, run_update_branches};
pub use plans::{PlanRequest, run_create_release_plans};
