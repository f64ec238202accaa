//! Infrastructure layer - database, outside collaborators, state assembly.

pub mod analytics;
pub mod db;
pub mod db_errors;
pub mod name_filter;
pub mod remote_ops;
pub mod state;
