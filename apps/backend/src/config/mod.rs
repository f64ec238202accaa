//! Environment-driven configuration.

pub mod app;
pub mod db;
