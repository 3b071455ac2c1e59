//! Small helpers shared by every stage of the harvest pipeline.

pub mod digest;
pub mod time;

pub use {digest::url_digest, time::timestamp};
