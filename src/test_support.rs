//! Fixtures shared by service and router tests.

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::{
    config::AppConfig,
    dao::source::{FetchError, ImageSource},
    state::{AppState, SharedState},
};

/// In-memory [`ImageSource`] that never touches the network.
pub struct StubSource {
    image: Option<DynamicImage>,
    timeout: bool,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn image(image: DynamicImage) -> Arc<Self> {
        Arc::new(Self {
            image: Some(image),
            timeout: false,
            calls: AtomicUsize::new(0),
        })
    }

    /// Upstream answers 404.
    pub fn missing() -> Arc<Self> {
        Arc::new(Self {
            image: None,
            timeout: false,
            calls: AtomicUsize::new(0),
        })
    }

    /// Upstream never answers.
    pub fn slow() -> Arc<Self> {
        Arc::new(Self {
            image: None,
            timeout: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageSource for StubSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<DynamicImage, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = url.to_owned();
        let result = match (&self.image, self.timeout) {
            (Some(image), _) => Ok(image.clone()),
            (None, true) => Err(FetchError::Timeout { url }),
            (None, false) => Err(FetchError::Status {
                url,
                status: reqwest::StatusCode::NOT_FOUND,
            }),
        };
        Box::pin(async move { result })
    }
}

/// 400x300 image split into four solid quadrants.
pub fn quadrants() -> DynamicImage {
    let colors = [
        [200, 30, 30, 255],
        [30, 200, 30, 255],
        [30, 30, 200, 255],
        [220, 220, 40, 255],
    ];
    let image = RgbaImage::from_fn(400, 300, |x, y| {
        let index = usize::from(x >= 200) + 2 * usize::from(y >= 150);
        Rgba(colors[index])
    });
    DynamicImage::ImageRgba8(image)
}

/// Single-color image, too flat for a four color palette.
pub fn flat() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba([90, 90, 90, 255])))
}

/// Shared state serving from `dir` with the given upstream.
pub fn state_in(dir: &Path, source: Arc<dyn ImageSource>) -> SharedState {
    let config = AppConfig {
        public_dir: dir.to_path_buf(),
        write_grace: Duration::from_secs(5),
        ..AppConfig::default()
    };
    AppState::new(config, source)
}
