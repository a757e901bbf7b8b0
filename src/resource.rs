//! Image reference resolution with a per-engine cache.
//!
//! References are remote URLs (`http://`, `https://`, `ftp://`) fetched
//! through a [`ResourceFetcher`], or local filesystem paths. Decoded images
//! are cached by exact reference string for the lifetime of the resolver.
//! Every failure degrades to "no image": it is logged and `None` is returned.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::{EngineError, ErrorPhase};
use crate::options::ImageOptions;

const REMOTE_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];

/// Whether a reference is fetched over the network.
pub fn is_remote(reference: &str) -> bool {
    REMOTE_SCHEMES
        .iter()
        .any(|scheme| reference.starts_with(scheme))
}

/// Source of raw bytes for remote references.
pub trait ResourceFetcher {
    /// Fetch the full payload behind `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, EngineError>;
}

/// Fetcher that refuses every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineFetcher;

impl ResourceFetcher for OfflineFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, EngineError> {
        Err(EngineError::new(
            ErrorPhase::Resource,
            "RESOURCE_FETCH_ERROR",
            "network access disabled",
        )
        .with_reference(url))
    }
}

/// Blocking HTTP fetcher backed by `ureq`.
#[cfg(feature = "remote-images")]
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

#[cfg(feature = "remote-images")]
impl HttpFetcher {
    pub fn new(opts: &ImageOptions) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(opts.fetch_timeout)
            .user_agent(&opts.user_agent)
            .build();
        Self {
            agent,
            max_bytes: opts.max_image_bytes,
        }
    }
}

#[cfg(feature = "remote-images")]
impl ResourceFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, EngineError> {
        use std::io::Read;

        let fetch_error = |message: String| {
            EngineError::new(ErrorPhase::Resource, "RESOURCE_FETCH_ERROR", message)
                .with_reference(url)
        };
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| fetch_error(err.to_string()))?;
        let mut payload = Vec::with_capacity(8 * 1024);
        response
            .into_reader()
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut payload)
            .map_err(|err| fetch_error(err.to_string()))?;
        check_payload_size(url, payload.len(), self.max_bytes)?;
        Ok(payload)
    }
}

fn check_payload_size(reference: &str, len: usize, max_bytes: u64) -> Result<(), EngineError> {
    if len as u64 > max_bytes {
        return Err(EngineError::new(
            ErrorPhase::Resource,
            "RESOURCE_TOO_LARGE",
            format!("image exceeds max_image_bytes ({} > {})", len, max_bytes),
        )
        .with_reference(reference));
    }
    Ok(())
}

/// Resolves image references to decoded pixels, caching successes.
pub struct ImageResolver {
    fetcher: Box<dyn ResourceFetcher>,
    max_bytes: u64,
    cache: HashMap<String, Arc<DynamicImage>>,
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("max_bytes", &self.max_bytes)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl ImageResolver {
    /// Create a resolver using `fetcher` for remote references.
    pub fn new(fetcher: impl ResourceFetcher + 'static, opts: &ImageOptions) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            max_bytes: opts.max_image_bytes,
            cache: HashMap::new(),
        }
    }

    /// Resolver with the built-in HTTP fetcher, or offline when the
    /// `remote-images` feature is disabled.
    pub fn with_default_fetcher(opts: &ImageOptions) -> Self {
        #[cfg(feature = "remote-images")]
        {
            Self::new(HttpFetcher::new(opts), opts)
        }
        #[cfg(not(feature = "remote-images"))]
        {
            Self::new(OfflineFetcher, opts)
        }
    }

    /// Resolve `reference` at its natural size.
    pub fn resolve(&mut self, reference: &str) -> Option<Arc<DynamicImage>> {
        if let Some(hit) = self.cache.get(reference) {
            log::debug!("image cache hit for {}", reference);
            return Some(Arc::clone(hit));
        }
        match self.load(reference) {
            Ok(image) => {
                let image = Arc::new(image);
                self.cache.insert(reference.to_string(), Arc::clone(&image));
                Some(image)
            }
            Err(err) => {
                log::warn!("omitting image: {}", err);
                None
            }
        }
    }

    /// Resolve `reference`, resized when either dimension is given.
    ///
    /// A missing dimension keeps its natural value. The cache always holds
    /// the natural-size image.
    pub fn resolve_sized(
        &mut self,
        reference: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Option<Arc<DynamicImage>> {
        let image = self.resolve(reference)?;
        if width.is_none() && height.is_none() {
            return Some(image);
        }
        let target_w = width.unwrap_or(image.width());
        let target_h = height.unwrap_or(image.height());
        if target_w == 0 || target_h == 0 {
            log::debug!("ignoring zero resize {}x{} for {}", target_w, target_h, reference);
            return Some(image);
        }
        if target_w == image.width() && target_h == image.height() {
            return Some(image);
        }
        if !fits_decoded_budget(target_w, target_h, self.max_bytes) {
            log::warn!(
                "ignoring resize {}x{} for {}: exceeds max_image_bytes ({})",
                target_w,
                target_h,
                reference,
                self.max_bytes
            );
            return Some(image);
        }
        Some(Arc::new(image.resize_exact(
            target_w,
            target_h,
            FilterType::Lanczos3,
        )))
    }

    /// Read a cached image without resolving.
    ///
    /// Reading before any resolution has succeeded is a caller error.
    pub fn cached(&self, reference: &str) -> Result<Option<Arc<DynamicImage>>, EngineError> {
        if self.cache.is_empty() {
            return Err(EngineError::new(
                ErrorPhase::Resource,
                "RESOURCE_CACHE_EMPTY",
                "image cache read before any successful resolution",
            )
            .with_reference(reference));
        }
        Ok(self.cache.get(reference).cloned())
    }

    /// Number of cached images.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached image.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn load(&self, reference: &str) -> Result<DynamicImage, EngineError> {
        let bytes = if is_remote(reference) {
            self.fetcher.fetch(reference)?
        } else {
            read_local(reference, self.max_bytes)?
        };
        check_payload_size(reference, bytes.len(), self.max_bytes)?;
        image::load_from_memory(&bytes).map_err(|err| {
            EngineError::new(ErrorPhase::Resource, "RESOURCE_DECODE_ERROR", err.to_string())
                .with_reference(reference)
        })
    }
}

/// Whether an RGBA buffer of `width` x `height` stays within `max_bytes`.
fn fits_decoded_budget(width: u32, height: u32, max_bytes: u64) -> bool {
    u64::from(width)
        .saturating_mul(u64::from(height))
        .saturating_mul(4)
        <= max_bytes
}

fn read_local(reference: &str, max_bytes: u64) -> Result<Vec<u8>, EngineError> {
    let io_error = |err: std::io::Error| {
        EngineError::new(ErrorPhase::Resource, "RESOURCE_FETCH_ERROR", err.to_string())
            .with_reference(reference)
    };
    let path = Path::new(reference);
    let len = fs::metadata(path).map_err(io_error)?.len();
    if len > max_bytes {
        return Err(EngineError::new(
            ErrorPhase::Resource,
            "RESOURCE_TOO_LARGE",
            format!("image exceeds max_image_bytes ({} > {})", len, max_bytes),
        )
        .with_reference(reference));
    }
    fs::read(path).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_detection_uses_scheme_prefix() {
        assert!(is_remote("https://example.com/a.png"));
        assert!(is_remote("ftp://host/a.png"));
        assert!(!is_remote("images/a.png"));
        assert!(!is_remote("file:///tmp/a.png"));
    }

    #[test]
    fn missing_local_file_resolves_to_none() {
        let mut resolver = ImageResolver::new(OfflineFetcher, &ImageOptions::default());
        assert!(resolver.resolve("definitely/not/here.png").is_none());
        assert_eq!(resolver.cache_len(), 0);
    }

    #[test]
    fn offline_fetcher_failure_is_swallowed() {
        let mut resolver = ImageResolver::new(OfflineFetcher, &ImageOptions::default());
        assert!(resolver.resolve("https://example.com/logo.png").is_none());
    }

    #[test]
    fn cache_read_before_resolution_is_an_error() {
        let resolver = ImageResolver::new(OfflineFetcher, &ImageOptions::default());
        let err = resolver.cached("a.png").expect_err("empty cache");
        assert_eq!(err.code, "RESOURCE_CACHE_EMPTY");
        assert_eq!(err.reference(), Some("a.png"));
    }

    #[test]
    fn resize_targets_are_bounded_by_the_byte_cap() {
        assert!(fits_decoded_budget(2048, 2048, 16 * 1024 * 1024));
        assert!(!fits_decoded_budget(2049, 2048, 16 * 1024 * 1024));
        assert!(!fits_decoded_budget(99_999, 99_999, 16 * 1024 * 1024));
        assert!(!fits_decoded_budget(u32::MAX, u32::MAX, u64::MAX / 2));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let err = check_payload_size("a.png", 11, 10).expect_err("too large");
        assert_eq!(err.code, "RESOURCE_TOO_LARGE");
        assert!(check_payload_size("a.png", 10, 10).is_ok());
    }
}
