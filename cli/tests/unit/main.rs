//! Unit tests for the geneosctl CLI
//!
//! These tests use stubbed ports and run fast without external I/O.

mod expand_tests;
mod fanout_tests;
mod lifecycle_tests;
mod property_tests;
