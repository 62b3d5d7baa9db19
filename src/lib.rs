//! Session-aware client for the Tableside restaurant admin backend.
//!
//! The crate owns the authentication lifecycle (login, startup discovery,
//! silent renewal on 401, logout), role-based route decisions, typed access
//! to the admin collections, client-side reporting, and the live order feed.
//! Start from [`Console`].

pub mod config;
pub mod console;
pub mod error;
pub mod net;
pub mod reports;
pub mod resources;
pub mod services;

#[cfg(test)]
mod test_helpers;

pub use config::ConsoleConfig;
pub use console::Console;
pub use error::{ApiError, ErrorCode};
