// Image handler tests
// Full request flow against a filesystem store

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tsubame::error::HandlerError;
use tsubame::handler::{DiagnosticSink, HandlerOptions, ImageHandler};
use tsubame::image_optimizer::OutputFormat;
use tsubame::storage::{FilesystemStore, InMemoryStore};

/// Sink that remembers every call
#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn log(&self, path: &str, error: &HandlerError) {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), error.to_string()));
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([200, 100, 50, 255]),
    ));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

fn filesystem_handler(files: &[(&str, Vec<u8>)]) -> (TempDir, Arc<RecordingSink>, ImageHandler) {
    let dir = TempDir::new().unwrap();
    for (name, data) in files {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, data).unwrap();
    }

    let sink = Arc::new(RecordingSink::default());
    let handler = ImageHandler::new(
        Arc::new(FilesystemStore::new(dir.path())),
        sink.clone(),
        HandlerOptions::default(),
    );
    (dir, sink, handler)
}

#[tokio::test]
async fn test_resizes_from_filesystem() {
    let (_dir, sink, handler) = filesystem_handler(&[("products/shoe.png", png(300, 200))]);

    let response = handler
        .handle("/files/width=90/height=60/products/shoe.png", None)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Type"), Some("image"));
    let decoded = image::load_from_memory(&response.body).unwrap();
    assert_eq!(decoded.dimensions(), (90, 60));
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn test_missing_file_is_404_and_silent() {
    let (_dir, sink, handler) = filesystem_handler(&[]);

    let response = handler.handle("/files/width=10/nope.png", None).await;

    assert_eq!(response.status, 404);
    assert_eq!(response.body, Bytes::from_static(b"File not found"));
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn test_path_traversal_is_500_and_logged() {
    let (_dir, sink, handler) = filesystem_handler(&[("a.png", png(4, 4))]);

    let response = handler.handle("/files/../secret.png", None).await;

    assert_eq!(response.status, 500);
    assert_eq!(response.body, Bytes::from_static(b"Error retrieving file"));
    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/files/../secret.png");
}

#[tokio::test]
async fn test_trailing_dimension_without_key_is_logged() {
    let (_dir, sink, handler) = filesystem_handler(&[("a.png", png(4, 4))]);

    let response = handler.handle("/files/width=100/height=50", None).await;

    assert_eq!(response.status, 500);
    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/files/width=100/height=50");

    // A bare prefix is still an ordinary miss
    assert_eq!(handler.handle("/files/", None).await.status, 404);
    assert_eq!(sink.calls().len(), 1);
}

#[tokio::test]
async fn test_thin_source_cover_fits_to_large_square() {
    let (_dir, sink, handler) = filesystem_handler(&[("strip.png", png(1, 3000))]);

    let response = handler
        .handle("/files/width=3000/height=3000/strip.png", None)
        .await;

    assert_eq!(response.status, 200);
    let decoded = image::load_from_memory(&response.body).unwrap();
    assert_eq!(decoded.dimensions(), (3000, 3000));
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn test_corrupt_image_logged_exactly_once() {
    let (_dir, sink, handler) = filesystem_handler(&[("bad.jpg", b"\xff\xd8garbage".to_vec())]);

    let response = handler.handle("/files/width=10/bad.jpg", None).await;

    assert_eq!(response.status, 500);
    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/files/width=10/bad.jpg");
}

#[tokio::test]
async fn test_webp_negotiation_is_per_request() {
    let (_dir, _sink, handler) = filesystem_handler(&[("a.png", png(20, 20))]);

    let webp = handler
        .handle("/files/width=10/a.png", Some("image/webp,image/*;q=0.8"))
        .await;
    let plain = handler.handle("/files/width=10/a.png", Some("image/png")).await;

    assert_eq!(image::guess_format(&webp.body).unwrap(), ImageFormat::WebP);
    assert_eq!(image::guess_format(&plain.body).unwrap(), ImageFormat::Png);
    assert_eq!(webp.header("Vary"), Some("Accept"));
}

#[tokio::test]
async fn test_custom_prefix_and_cache_control() {
    let store = InMemoryStore::new().with_object("logo.png", png(64, 32));
    let options = HandlerOptions {
        prefix: "/img/".to_string(),
        preferred_format: OutputFormat::Jpeg,
        cache_control: "public,max-age=86400,immutable".to_string(),
        ..HandlerOptions::default()
    };
    let handler = ImageHandler::new(
        Arc::new(store),
        Arc::new(RecordingSink::default()),
        options,
    );

    let response = handler.handle("/img/height=16/logo.png", Some("*/*")).await;
    assert_eq!(response.status, 200);
    assert_eq!(
        response.header("Cache-Control"),
        Some("public,max-age=86400,immutable")
    );
    assert_eq!(
        image::load_from_memory(&response.body).unwrap().dimensions(),
        (32, 16)
    );

    // The default prefix is no longer routed
    assert_eq!(handler.handle("/files/logo.png", None).await.status, 404);
}

#[test]
fn test_handler_runs_on_blocking_test_runtime() {
    let store = InMemoryStore::new().with_object("a.png", png(8, 8));
    let handler = ImageHandler::new(
        Arc::new(store),
        Arc::new(RecordingSink::default()),
        HandlerOptions::default(),
    );

    let response = tokio_test::block_on(handler.handle("/files/width=4/height=4/a.png", None));
    assert_eq!(response.status, 200);
}
