//! Publishing: the summary document and the git commit.

pub mod git;
pub mod summary;

pub use {
    git::{CommitOutcome, GitPublisher},
    summary::write_summary,
};
