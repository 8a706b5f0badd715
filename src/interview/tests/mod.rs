//! Unit tests for the interview context.
