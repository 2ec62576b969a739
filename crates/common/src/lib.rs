//! Common utilities and shared types for renthub.
//!
//! This crate provides foundational components used across all renthub crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Tokens**: JWT access-token issue/verify via [`auth`]
//! - **Cache backend**: the [`CacheBackend`] abstraction with a Redis
//!   implementation and an in-memory fake for tests
//!
//! # Example
//!
//! ```no_run
//! use renthub_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod id;

pub use auth::{Claims, issue_token, verify_token};
pub use cache::{CacheBackend, CacheError, MemoryCache, RedisCache};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
