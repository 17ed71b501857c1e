//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the lending ports backed by PostgreSQL via
//! `diesel-async` and `bb8` pooling. Row structs (`models.rs`) and table
//! definitions (`schema.rs`) stay private to this module; adapters only
//! translate between rows and domain types.
//!
//! # Example
//!
//! ```ignore
//! use hippo_backend::outbound::persistence::{DbPool, DieselAssetRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/hippo")).await?;
//! let assets = DieselAssetRepository::new(pool);
//! ```

mod diesel_asset_repository;
mod diesel_basic_error_mapping;
mod diesel_borrow_request_repository;
mod diesel_user_directory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_asset_repository::DieselAssetRepository;
pub use diesel_borrow_request_repository::DieselBorrowRequestRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
