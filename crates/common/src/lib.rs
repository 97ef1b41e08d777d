//! Shared helpers used by every crate in the workspace: logging setup,
//! environment loading and small response types.

pub mod env;
pub mod types;
pub mod utils;
