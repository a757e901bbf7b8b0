use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use html_runs::{
    ConvertOptions, Document, EngineError, HtmlConverter, ImageOptions, ImageResolver,
    OfflineFetcher, ResourceFetcher, StaticHost,
};
use image::{ImageFormat, Rgba, RgbaImage};

/// Encode a solid `width` x `height` PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .unwrap_or_else(|e| panic!("encode png: {}", e));
    out.into_inner()
}

/// Write a PNG fixture into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(width, height))
        .unwrap_or_else(|e| panic!("write {}: {}", path.display(), e));
    path
}

pub fn offline_converter(options: ConvertOptions) -> HtmlConverter {
    HtmlConverter::new(
        options,
        ImageResolver::new(OfflineFetcher, &ImageOptions::default()),
    )
}

/// Convert with default options, no network, and a host without fonts.
pub fn convert(html: &str) -> Document {
    offline_converter(ConvertOptions::default()).convert(html, &StaticHost::default())
}

/// Assert the runs cover `[0, char_len)` without gaps, overlaps, or empty runs.
pub fn assert_partition(doc: &Document) {
    let mut cursor = 0;
    for (idx, run) in doc.runs().iter().enumerate() {
        assert_eq!(run.start, cursor, "run {} leaves a gap or overlap", idx);
        assert!(run.end > run.start, "run {} is empty", idx);
        cursor = run.end;
    }
    assert_eq!(cursor, doc.char_len(), "runs do not reach end of stream");
}

/// In-memory fetcher that serves one payload and counts requests.
#[derive(Clone, Debug)]
pub struct CountingFetcher {
    payload: Arc<Vec<u8>>,
    calls: Arc<AtomicUsize>,
}

impl CountingFetcher {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload: Arc::new(payload),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle that keeps observing the count after the fetcher is moved.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl ResourceFetcher for CountingFetcher {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.as_ref().clone())
    }
}
