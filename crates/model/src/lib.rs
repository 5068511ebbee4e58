//! botbid tree ensemble model
//!
//! Provides the gradient boosted tree representation produced by
//! `botbid-trainer`, probability evaluation over sparse matrices, and
//! canonical JSON hashing used to check that seeded runs reproduce.

pub mod errors;
pub mod gbdt;
pub mod serialization;

pub use errors::ModelError;
pub use gbdt::{eval_tree, sigmoid, GbdtModel, ModelMetadata, Node, Tree};
pub use serialization::{canonical_json_bytes, canonical_json_string};
