//! Domain models for the Fuel Station Sales Register

mod sales;
mod serde_helpers;

pub use sales::*;
