//! `treesub` replaces one fixed byte pattern with another in every matching
//! file under a directory tree.
//!
//! It provides the core logic for the `treesub` command-line tool but can also
//! be used as a library. The pipeline is:
//!
//! - `discovery`: walks the root and yields files whose names end with one of
//!   the configured suffixes.
//! - `pool`: a bounded Rayon thread pool that runs one task per file and hands
//!   results back in completion order.
//! - `processor` and `staging`: read a file, count and replace the pattern,
//!   and write the result through a temporary sibling and an atomic rename.
//! - `summary` and `reporter`: fold per-file outcomes into totals and print
//!   them.
//!
//! `Substituter` ties the stages together.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod logging;
pub mod pool;
pub mod processor;
pub mod reporter;
pub mod staging;
pub mod substituter;
pub mod summary;

// Re-export main types for easier access by library users.
pub use config::SubstituteConfig;
pub use errors::{Error, Result};
pub use processor::{FileProcessor, Outcome, Substitution};
pub use reporter::{ConsoleReporter, Reporter};
pub use substituter::{RunReport, Substituter};
pub use summary::RunSummary;
