/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Fetch, transform, synthesize and persist generated images.
pub mod image_service;
/// Palette-only extraction.
pub mod palette_service;
/// Background eviction of stale generated files.
pub mod sweeper;
