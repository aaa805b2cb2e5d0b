//! Crate-level tests.

mod entry;
