//! Output module for reporting on the job store
//!
//! Status counts are loaded once and then either printed for the CLI or
//! serialized by the HTTP API.

pub mod stats;

pub use stats::{load_statistics, print_statistics, Statistics};
