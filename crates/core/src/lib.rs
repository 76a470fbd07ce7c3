//! Domain types and pure logic for Fetch Board.
//!
//! Nothing in this crate touches the network or the store: it holds the
//! wire models, the caller [`identity::Identity`], the error taxonomy and the
//! sandboxed [`transform`] engine used to reshape fetched responses.

pub mod error;
pub mod identity;
pub mod models;
pub mod transform;
pub mod types;
