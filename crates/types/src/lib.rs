//! Shared data model for the botbid pipeline
//!
//! Modules:
//! - `bid`: raw and normalized bid-log events
//! - `roster`: labeled and unlabeled actor records
//! - `schema`: typed column declarations and text column configuration
//! - `matrix`: compressed sparse row matrix shared by features and trainer

pub mod bid;
pub mod matrix;
pub mod roster;
pub mod schema;

pub use bid::{BidEvent, RawBid};
pub use matrix::{CsrBuilder, CsrMatrix, MatrixError};
pub use roster::{Label, RawRosterRecord, RosterRecord};
pub use schema::{
    CategoricalColumn, DiffStatistic, NumericColumn, TextColumn, TextColumnConfig, TokenizerMode,
};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
