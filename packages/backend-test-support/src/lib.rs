//! Backend test support utilities
//!
//! Shared by the backend's unit and integration tests: one logging
//! bootstrap, Problem Details assertions, and unique id helpers so suites
//! sharing a store never collide.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
