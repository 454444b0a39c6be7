//! Severity categories and the health guidance attached to them.

pub mod categories;
