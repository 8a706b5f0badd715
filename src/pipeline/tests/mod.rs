//! Unit tests for the pipeline context.
