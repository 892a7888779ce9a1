//! Test Fixtures Module
//!
//! Audio fixtures for bridge testing.

// Not every test binary uses every fixture
#![allow(dead_code)]

pub mod audio_fixtures;

pub use audio_fixtures::*;
