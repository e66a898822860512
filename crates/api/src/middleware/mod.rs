//! Request extractors guarding the admin API.

pub mod auth;
