//! Unit test harness for antenna-rotator.
//!
//! This module organizes the configuration tests into one test target.

mod config_parsing;
mod config_validation;
