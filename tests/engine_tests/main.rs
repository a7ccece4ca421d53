//! Engine test suite

mod engine_tests;
