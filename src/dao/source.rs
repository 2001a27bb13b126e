//! Upstream image retrieval.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use image::DynamicImage;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

/// Failures while fetching or decoding a source image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or the connection broke.
    #[error("failed to fetch `{url}`")]
    Request {
        /// Requested URL.
        url: String,
        /// Transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// Upstream answered with a non-success status.
    #[error("unexpected status {status} fetching `{url}`")]
    Status {
        /// Requested URL.
        url: String,
        /// Status upstream answered with.
        status: StatusCode,
    },
    /// Upstream did not answer within the configured timeout.
    #[error("timed out fetching `{url}`")]
    Timeout {
        /// Requested URL.
        url: String,
    },
    /// The payload is not a decodable image.
    #[error("failed to decode image from `{url}`")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder failure.
        #[source]
        source: image::ImageError,
    },
    /// The blocking decode task did not complete.
    #[error("decode worker failed for `{url}`")]
    Worker {
        /// Requested URL.
        url: String,
        /// Join failure of the decode task.
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Anything able to turn a URL into a decoded image.
pub trait ImageSource: Send + Sync {
    /// Download and decode the image behind `url`.
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<DynamicImage, FetchError>>;
}

/// [`ImageSource`] backed by an HTTP client with a hard request timeout.
#[derive(Clone)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    /// Build a client whose whole request, body included, must finish within `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::ClientBuilder { source })?;
        Ok(Self { client })
    }

    /// Wrap the source for storage in shared state.
    pub fn shared(self) -> Arc<dyn ImageSource> {
        Arc::new(self)
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<DynamicImage, FetchError>> {
        let client = self.client.clone();
        let url = url.to_owned();
        Box::pin(async move {
            let classify = |url: &str, source: reqwest::Error| {
                if source.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_owned(),
                    }
                } else {
                    FetchError::Request {
                        url: url.to_owned(),
                        source,
                    }
                }
            };

            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|source| classify(&url, source))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status { url, status });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|source| classify(&url, source))?;
            debug!(url = %url, bytes = bytes.len(), "fetched source image");

            let decode_url = url.clone();
            tokio::task::spawn_blocking(move || {
                image::load_from_memory(&bytes).map_err(|source| FetchError::Decode {
                    url: decode_url,
                    source,
                })
            })
            .await
            .map_err(|source| FetchError::Worker { url, source })?
        })
    }
}
