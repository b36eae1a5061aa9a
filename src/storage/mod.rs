mod repository;

pub use repository::*;

/// SQL migration for registers and the sales/expense ledgers
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");
