use std::env;

use image_mesh::{config::DEFAULT_API_PREFIX, services::documentation::ApiDoc};

/// Print the OpenAPI document, optionally for a custom API prefix given as first argument.
fn main() -> anyhow::Result<()> {
    let prefix = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_API_PREFIX.to_owned());
    let doc = ApiDoc::for_prefix(&prefix);
    println!("{}", doc.to_pretty_json()?);
    Ok(())
}
