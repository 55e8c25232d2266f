//! Unit tests for scheduled jobs.
