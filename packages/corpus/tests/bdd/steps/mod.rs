//! Step definitions for Cucumber BDD tests

pub mod given;
pub mod then;
pub mod when;
