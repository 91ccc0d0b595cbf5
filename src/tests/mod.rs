//! # Test Suite for the UKC Calculator
//!
//! End-to-end checks of the command actions against a mock NOAA server, plus
//! argument parsing for one-shot and session use.

mod command_tests;
