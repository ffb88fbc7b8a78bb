//! Catalog of sustainable actions users can log.

pub mod repo;
pub mod repo_types;

pub use repo_types::ActionType;
