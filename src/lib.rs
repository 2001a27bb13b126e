//! Library crate for image-mesh, exposing modules for binaries and tests.

pub mod config;
/// Filename codec, ephemeral store and upstream image source.
pub mod dao;
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Pure image processing: parameters, pipeline, palette and synthesis.
pub mod imaging;
/// HTTP routers.
pub mod routes;
/// Request orchestration and background tasks.
pub mod services;
/// Shared application state.
pub mod state;

#[cfg(test)]
mod test_support;
