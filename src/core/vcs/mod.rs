pub mod pull_request;
pub mod system_git;
mod system_git_ops;

pub use pull_request::{PullRequest, create_pull_request};
pub use system_git::SystemGit;
pub use system_git_ops::PushOptions;
