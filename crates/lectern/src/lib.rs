//! lectern: full-text search over statically published text collections.
//!
//! A collection is a directory (or web root) of pre-built JSON index shards plus one HTML
//! file per section. lectern looks terms up in the shards, narrows candidates to sections,
//! and verifies and highlights every candidate fragment against the section's current
//! markup. No search server is required, though one can be configured as a first resort.

#![warn(missing_docs)]

pub mod cli;
