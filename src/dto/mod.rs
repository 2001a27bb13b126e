//! Request validation helpers and JSON payloads exposed by the REST API.

/// Health payload.
pub mod health;
/// Image, palette and message payloads.
pub mod image;
pub mod validation;
