//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`UserDirectory`], [`UserRegistry`]) are
//! implemented by the persistence adapters. Driving ports (`*Command`,
//! `*Query`) are implemented by domain services and consumed by the HTTP
//! adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod asset_command;
mod asset_query;
mod asset_repository;
mod borrow_command;
mod borrow_query;
mod borrow_request_repository;
mod user_directory;
mod user_sync_command;

#[cfg(test)]
pub use asset_command::MockAssetCommand;
pub use asset_command::AssetCommand;
#[cfg(test)]
pub use asset_query::MockAssetQuery;
pub use asset_query::AssetQuery;
#[cfg(test)]
pub use asset_repository::MockAssetRepository;
pub use asset_repository::{AssetRepository, AssetRepositoryError};
#[cfg(test)]
pub use borrow_command::MockBorrowCommand;
pub use borrow_command::{
    BorrowCommand, CompleteBorrowRequest, CreateBorrowRequest, DecideBorrowRequest,
};
#[cfg(test)]
pub use borrow_query::MockBorrowQuery;
pub use borrow_query::BorrowQuery;
#[cfg(test)]
pub use borrow_request_repository::MockBorrowRequestRepository;
pub use borrow_request_repository::{BorrowRequestRepository, BorrowRequestRepositoryError};
#[cfg(test)]
pub use user_directory::{MockUserDirectory, MockUserRegistry};
pub use user_directory::{UserDirectory, UserDirectoryError, UserRegistry};
#[cfg(test)]
pub use user_sync_command::MockUserSyncCommand;
pub use user_sync_command::{UserEvent, UserSyncCommand};
