//! Unit tests for the notification context.

mod outbox_tests;
