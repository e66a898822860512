//! Request handlers, one module per resource.

pub mod auth;
pub mod entities;
pub mod lookups;
pub mod uploads;
