//! Fixtures for unit tests, integration tests, benchmarks and doc examples
pub mod transcripts;
