//! Cross-module tests for the knowledge crate.

mod retrieval_properties;
