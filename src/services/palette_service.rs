use tracing::info;

use crate::{
    dto::{
        image::{PaletteFields, PaletteResponse},
        validation::validate_source_url,
    },
    error::ServiceError,
    imaging::{mosaic::GRADIENT_OFFSETS, quantize},
    state::SharedState,
};

/// Extract the dominant colors of the image behind `raw_url`, enough to build a gradient.
pub async fn extract(
    state: &SharedState,
    raw_url: Option<&str>,
) -> Result<PaletteResponse, ServiceError> {
    let url = validate_source_url(raw_url)?;
    let source = state.source().fetch(&url).await?;

    let required = GRADIENT_OFFSETS.len();
    let count = state.config().palette_size.max(required);
    let palette = tokio::task::spawn_blocking(move || {
        quantize::extract_palette(&source.to_rgba8(), count, required)
    })
    .await
    .map_err(|err| ServiceError::Internal(format!("palette worker failed: {err}")))??;

    info!(url = %url, colors = palette.len(), "palette extracted");
    Ok(PaletteResponse {
        url,
        fields: PaletteFields::from_palette(palette),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubSource, flat, quadrants, state_in};

    #[tokio::test]
    async fn palette_of_four_color_source() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path(), StubSource::image(quadrants()));

        let response = extract(&state, Some("http://img")).await.unwrap();

        assert!(response.fields.palette.len() >= 4);
        assert_eq!(
            response.fields.palette_styles.len(),
            response.fields.palette.len()
        );
        assert!(response.fields.gradient_style.is_some());
        // nothing is persisted for palette requests
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn flat_source_is_a_palette_failure() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path(), StubSource::image(flat()));

        let err = extract(&state, Some("http://img")).await.unwrap_err();
        assert!(matches!(err, ServiceError::PaletteExtraction(_)));
    }

    #[tokio::test]
    async fn timeout_is_reported_as_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path(), StubSource::slow());

        let err = extract(&state, Some("http://img")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Fetch(crate::dao::source::FetchError::Timeout { .. })
        ));
    }
}
