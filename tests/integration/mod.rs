//! Integration test modules.

mod analytics_integration_test;
