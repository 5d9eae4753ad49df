//! End-to-end tests for the zincc compiler.
//!
//! These drive the actual `zincc` binary end to end: CLI surface, the full
//! compilation pipeline against real `.zn` fixtures, and output snapshots.

mod compilation_tests;
mod cli_tests;
mod snapshot_tests;
