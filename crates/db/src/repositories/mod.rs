//! Repository layer.
//!
//! Repositories borrow a [`RecordStore`](crate::store::RecordStore) and the
//! [`SchemaRegistry`](plug_core::schema::SchemaRegistry) and are cheap to
//! build per request.

pub mod entity_repo;
pub mod lookup_repo;

pub use entity_repo::{EntityRepo, UpdateOutcome};
pub use lookup_repo::LookupRepo;
