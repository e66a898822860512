//! Domain core of the Procurement Plug admin backend.
//!
//! Holds everything that does not touch the database or HTTP: entity
//! descriptors and the schema registry, field validation and JSON column
//! encoding, list filters, lookup value rules and approval transitions.

pub mod catalog;
pub mod error;
pub mod fields;
pub mod filter;
pub mod lookup;
pub mod record;
pub mod schema;
pub mod transition;
pub mod types;
pub mod uploads;
