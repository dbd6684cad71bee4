//! Shared types and logic for the Fuel Station Sales Register
//!
//! This crate holds the sales record model, the reconciliation engine and the
//! record store. The browser build (via WASM) and the command line tool both
//! sit on top of it.

pub mod error;
pub mod export;
pub mod models;
pub mod reconciliation;
pub mod store;
pub mod types;
pub mod validation;

pub use error::*;
pub use export::*;
pub use models::*;
pub use reconciliation::*;
pub use store::*;
pub use types::*;
pub use validation::*;
