//! Core business logic for renthub.

pub mod services;

pub use services::*;
