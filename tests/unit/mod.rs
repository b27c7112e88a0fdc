//! Unit test modules.

mod power_series_test;
mod training_load_test;
