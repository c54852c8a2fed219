//! Public DBC model types.

pub mod attributes;
pub mod database;
pub mod env_var;
pub mod errors;
pub mod message;
pub mod node;
pub mod signal;
