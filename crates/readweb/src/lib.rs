//! Public facade crate for `readweb`.
//!
//! This crate contains no IO or extraction logic.
//! It re-exports the backend-agnostic types/traits from `readweb-core`.

pub use readweb_core::*;
