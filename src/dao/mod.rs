/// Ephemeral store for generated files.
pub mod asset_store;
/// Self-describing filename codec.
pub mod filename;
/// Upstream image retrieval.
pub mod source;
/// Storage error types.
pub mod storage;
