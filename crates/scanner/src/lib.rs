//! Plugin detection, the deduplication ledger, and the tree scanner.
//!
//! A plugin module is a source file defining a class that derives from the
//! framework base class and implements the verification method. Matches are
//! recorded per `(repository url, filename)` in a JSON ledger and the file is
//! copied into the output directory the first time it is seen.

pub mod ledger;
pub mod pattern;
pub mod scan;

pub use {
    ledger::{Ledger, LedgerStore},
    pattern::PluginMatcher,
    scan::{ScanReport, ScanSummary, Scanner},
};
