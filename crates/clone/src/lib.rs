//! Bulk shallow cloning of candidate repositories.

pub mod cloner;

pub use cloner::{CloneOutcome, CloneReport, Cloner, clone_dir};
