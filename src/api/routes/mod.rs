//! API Routes
//!
//! Route handlers organized by functionality.

pub mod aggregate;
pub mod categories;
pub mod health;
pub mod reports;
