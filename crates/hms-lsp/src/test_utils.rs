//! Test utilities for handler and lifecycle tests.
