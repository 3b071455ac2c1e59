//! Repository discovery: paginated search aggregation and the candidate set.

pub mod candidates;
pub mod client;
pub mod error;
pub mod types;

pub use {
    client::{GithubSearch, RepoSearch},
    error::SearchError,
};
