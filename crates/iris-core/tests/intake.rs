//! End-to-end batches through `VisionIntake` with a scripted vision model.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use iris_core::llm::{LlmProvider, LlmRequest, LlmResponse, ModelFactory};
use iris_core::pipeline::{ImageCodec, LocalStorage, Storage};
use iris_core::{
    Config, IntakeError, IntakeResult, LlmError, MemorySink, ModelConfig, SetupError, Severity,
    VisionIntake,
};

/// Answers "Description of <path>", or misbehaves for specially named paths.
struct ScriptedProvider {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-vision"
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.image.media_type, "image/jpeg");
        // Base64 of the JPEG SOI marker
        assert!(request.image.data.starts_with("/9j/"));

        let path = request
            .prompt
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("Image: "))
            .unwrap_or_default()
            .to_string();

        if path.starts_with("slow") {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        if path.starts_with("broken") {
            return Err(LlmError::with_status("Scripted HTTP 500: kaboom", 500));
        }
        let text = if path.starts_with("blank") {
            "   ".to_string()
        } else {
            format!("Description of {path}")
        };

        Ok(LlmResponse {
            text,
            model: "scripted-vision".to_string(),
            tokens_used: Some(12),
            latency_ms: 1,
        })
    }
}

#[derive(Default)]
struct ScriptedFactory {
    calls: Arc<AtomicUsize>,
    created: Mutex<Vec<ModelConfig>>,
    fail_with: Option<String>,
}

impl ScriptedFactory {
    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn model_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn created(&self) -> Vec<ModelConfig> {
        self.created.lock().unwrap().clone()
    }
}

impl ModelFactory for ScriptedFactory {
    fn create(&self, config: &ModelConfig) -> Result<Box<dyn LlmProvider>, SetupError> {
        self.created.lock().unwrap().push(config.clone());
        if let Some(message) = &self.fail_with {
            return Err(SetupError::ModelInit(message.clone()));
        }
        Ok(Box::new(ScriptedProvider {
            calls: self.calls.clone(),
        }))
    }
}

/// In-memory storage that logs every read and fails reads for chosen paths.
#[derive(Default)]
struct RecordingStorage {
    files: HashMap<String, Vec<u8>>,
    unreadable: HashSet<String>,
    reads: Mutex<Vec<String>>,
}

impl RecordingStorage {
    /// A file whose bytes start with a JPEG SOI marker and end with `tag`.
    fn with_file(mut self, path: &str, tag: u8) -> Self {
        self.files.insert(path.to_string(), vec![0xFF, 0xD8, 0xFF, tag]);
        self
    }

    fn with_unreadable(mut self, path: &str) -> Self {
        self.files.insert(path.to_string(), Vec::new());
        self.unreadable.insert(path.to_string());
        self
    }

    fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    async fn read_all_bytes(&self, path: &str) -> std::io::Result<Vec<u8>> {
        self.reads.lock().unwrap().push(path.to_string());
        if self.unreadable.contains(path) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }
}

/// Hands the bytes through untouched.
struct PassthroughCodec;

impl ImageCodec for PassthroughCodec {
    fn compress(&self, bytes: &[u8], _max_pixels: u32, _quality: u8) -> IntakeResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

struct Harness {
    dir: tempfile::TempDir,
    config: Config,
    factory: Arc<ScriptedFactory>,
    sink: Arc<MemorySink>,
}

impl Harness {
    fn new() -> Self {
        let mut config = Config::default();
        config.models.chat = Some(ModelConfig::new("scripted", "scripted-vision").with_vision(true));
        Self::with_config(config)
    }

    fn with_config(config: Config) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            config,
            factory: Arc::new(ScriptedFactory::default()),
            sink: Arc::new(MemorySink::new()),
        }
    }

    /// Write a small solid-color PNG. Different shades give different hashes.
    fn png(&self, name: &str, shade: u8) {
        write_png(&self.dir.path().join(name), shade);
    }

    fn file(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.dir.path().join(name), bytes).unwrap();
    }

    fn intake(&self) -> VisionIntake {
        VisionIntake::new(&self.config)
            .with_factory(self.factory.clone())
            .with_storage(Arc::new(LocalStorage::with_root(self.dir.path())))
            .with_sink(self.sink.clone())
    }

    fn events(&self, severity: Severity) -> Vec<String> {
        self.sink
            .events()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, message)| message)
            .collect()
    }
}

fn write_png(path: &Path, shade: u8) {
    let img = RgbImage::from_pixel(32, 24, Rgb([shade, 255 - shade, 64]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    std::fs::write(path, buf.into_inner()).unwrap();
}

fn paths(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn repeated_path_is_described_once() {
    let h = Harness::new();
    h.png("a.png", 10);
    h.png("b.png", 20);

    let report = h.intake().run(&paths(&["a.png", "b.png", "a.png"])).await;

    assert_eq!(report.descriptions.len(), 2);
    assert!(report.errors.is_empty());
    assert_eq!(report.summary(), "2 image(s) described");
    assert_eq!(
        report.content(),
        "## Image: a.png\nDescription of a.png\n\n## Image: b.png\nDescription of b.png"
    );
    assert_eq!(h.factory.model_calls(), 2);

    // The repeated path leaves no trace in the sink either.
    let infos = h.events(Severity::Info);
    assert_eq!(infos.len(), 2);
    assert!(infos[0].starts_with("Described: a.png ("));
    assert!(infos[1].starts_with("Described: b.png ("));
    assert!(h.events(Severity::Warning).is_empty());
}

#[tokio::test]
async fn missing_file_is_reported() {
    let h = Harness::new();

    let report = h.intake().run(&paths(&["missing.png"])).await;

    assert!(report.descriptions.is_empty());
    assert_eq!(report.error("missing.png"), Some(&IntakeError::NotFound));
    assert_eq!(report.summary(), "1 error(s)");
    assert_eq!(report.content(), "## Error (missing.png): File not found");
    assert_eq!(h.factory.model_calls(), 0);

    let warnings = h.events(Severity::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("missing.png"));
}

#[tokio::test]
async fn sixth_image_exceeds_capacity() {
    let h = Harness::new();
    let names: Vec<String> = (0..6).map(|i| format!("img{i}.png")).collect();
    for (i, name) in names.iter().enumerate() {
        h.png(name, (i as u8) * 30);
    }

    let report = h.intake().run(&names).await;

    assert_eq!(report.descriptions.len(), 5);
    assert_eq!(
        report.error("img5.png"),
        Some(&IntakeError::CapacityExceeded { max: 5 })
    );
    assert_eq!(report.summary(), "5 image(s) described, 1 error(s)");
    assert_eq!(h.factory.model_calls(), 5);
    assert!(h
        .events(Severity::Warning)
        .iter()
        .any(|m| m == "Max images limit (5) reached, skipping: img5.png"));
}

#[tokio::test]
async fn capped_paths_are_never_read_and_read_failures_are_per_path() {
    let mut h = Harness::new();
    h.config.intake.max_images = 2;
    let storage = Arc::new(
        RecordingStorage::default()
            .with_unreadable("ioerr.png")
            .with_file("a.png", 1)
            .with_file("b.png", 2)
            .with_file("c.png", 3)
            .with_file("d.png", 4),
    );

    let report = h
        .intake()
        .with_storage(storage.clone())
        .with_codec(Arc::new(PassthroughCodec))
        .run(&paths(&["ioerr.png", "a.png", "b.png", "c.png", "d.png", "c.png"]))
        .await;

    assert_eq!(storage.reads(), vec!["ioerr.png", "a.png", "b.png"]);
    assert!(matches!(
        report.error("ioerr.png"),
        Some(IntakeError::Storage(message)) if message.contains("permission denied")
    ));
    assert_eq!(report.description("a.png"), Some("Description of a.png"));
    assert_eq!(report.description("b.png"), Some("Description of b.png"));
    for capped in ["c.png", "d.png"] {
        assert_eq!(
            report.error(capped),
            Some(&IntakeError::CapacityExceeded { max: 2 })
        );
    }
    assert_eq!(report.errors.len(), 3);
    assert_eq!(report.summary(), "2 image(s) described, 3 error(s)");
    assert_eq!(h.factory.model_calls(), 2);
}

#[tokio::test]
async fn errors_do_not_consume_capacity() {
    let mut h = Harness::new();
    h.config.intake.max_images = 2;
    h.png("a.png", 1);
    h.png("b.png", 2);

    let report = h
        .intake()
        .run(&paths(&["missing.png", "notes.txt", "a.png", "b.png"]))
        .await;

    assert_eq!(report.descriptions.len(), 2);
    assert_eq!(report.errors.len(), 2);
    assert!(report.error("a.png").is_none());
    assert!(report.error("b.png").is_none());
}

#[tokio::test]
async fn identical_content_is_described_once() {
    let h = Harness::new();
    h.png("a.png", 42);
    std::fs::copy(h.dir.path().join("a.png"), h.dir.path().join("copy.png")).unwrap();

    let report = h.intake().run(&paths(&["a.png", "copy.png"])).await;

    assert_eq!(report.descriptions.len(), 1);
    assert_eq!(report.description("a.png"), Some("Description of a.png"));
    assert!(report.description("copy.png").is_none());
    assert!(report.error("copy.png").is_none());
    assert_eq!(h.factory.model_calls(), 1);

    let infos = h.events(Severity::Info);
    assert!(infos
        .iter()
        .any(|m| m.starts_with("Skipping duplicate image: copy.png (hash: ")));
}

#[tokio::test]
async fn timeout_does_not_block_later_paths() {
    let mut h = Harness::new();
    h.config.intake.vision_timeout_ms = 100;
    h.png("slow.png", 5);
    h.png("b.png", 6);

    let started = Instant::now();
    let report = h.intake().run(&paths(&["slow.png", "b.png"])).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(
        report.error("slow.png"),
        Some(&IntakeError::ModelTimeout {
            timeout: Duration::from_millis(100)
        })
    );
    assert_eq!(report.description("b.png"), Some("Description of b.png"));
    assert!(h
        .events(Severity::Warning)
        .iter()
        .any(|m| m.contains("timed out") && m.ends_with("for: slow.png")));
}

#[tokio::test]
async fn model_failures_are_per_path() {
    let h = Harness::new();
    h.png("broken.png", 1);
    h.png("blank.png", 2);
    h.png("fine.png", 3);

    let report = h
        .intake()
        .run(&paths(&["broken.png", "blank.png", "fine.png"]))
        .await;

    assert_eq!(
        report.error("broken.png"),
        Some(&IntakeError::ModelError("Scripted HTTP 500: kaboom".into()))
    );
    assert_eq!(report.error("blank.png"), Some(&IntakeError::EmptyResult));
    assert_eq!(report.description("fine.png"), Some("Description of fine.png"));
}

#[tokio::test]
async fn non_image_and_corrupt_files() {
    let h = Harness::new();
    h.file("notes.txt", b"hello");
    h.file("corrupt.png", b"this is not a png");

    let report = h.intake().run(&paths(&["notes.txt", "corrupt.png"])).await;

    assert_eq!(
        report.error("notes.txt"),
        Some(&IntakeError::UnsupportedType {
            mime: Some("text/plain".into())
        })
    );
    assert!(matches!(
        report.error("corrupt.png"),
        Some(IntakeError::CompressionFailure(_))
    ));
    assert_eq!(h.factory.model_calls(), 0);
}

#[tokio::test]
async fn no_vision_model_aborts_before_any_path() {
    let mut config = Config::default();
    config.models.chat = Some(ModelConfig::new("scripted", "text-only"));
    config.models.browser = Some(ModelConfig::new("scripted", "also-text").with_vision(false));
    let h = Harness::with_config(config);
    h.png("a.png", 1);

    let report = h.intake().run(&paths(&["a.png"])).await;

    assert!(report.is_aborted());
    assert!(report.descriptions.is_empty());
    assert!(report.errors.is_empty());
    assert_eq!(report.content(), SetupError::NoVisionModel.to_string());
    assert_eq!(report.setup_error.as_ref().map(|s| s.key), Some("_config"));
    assert!(h.factory.created().is_empty());
    assert_eq!(h.events(Severity::Warning).len(), 1);
}

#[tokio::test]
async fn browser_model_is_the_fallback() {
    let mut config = Config::default();
    config.models.chat = Some(ModelConfig::new("scripted", "text-only"));
    config.models.browser = Some(ModelConfig::new("scripted", "eyes").with_vision(true));
    let h = Harness::with_config(config);
    h.png("a.png", 1);

    let report = h.intake().run(&paths(&["a.png"])).await;

    assert_eq!(report.descriptions.len(), 1);
    let created = h.factory.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "eyes");
}

#[tokio::test]
async fn provider_construction_failure_aborts() {
    let mut h = Harness::new();
    h.factory = Arc::new(ScriptedFactory::failing("missing API key"));
    h.png("a.png", 1);

    let report = h.intake().run(&paths(&["a.png"])).await;

    assert!(report.is_aborted());
    assert_eq!(
        report.summary(),
        "Failed to initialize vision model: missing API key"
    );
    assert_eq!(h.factory.model_calls(), 0);
}

#[tokio::test]
async fn empty_batch() {
    let h = Harness::new();
    let report = h.intake().run(&[]).await;
    assert_eq!(report.content(), "No images processed");
    assert_eq!(report.summary(), "No images processed");
}

#[tokio::test]
async fn underscore_paths_are_ordinary_paths() {
    let h = Harness::new();
    h.png("_config.png", 9);

    let report = h.intake().run(&paths(&["_config.png"])).await;

    assert_eq!(
        report.description("_config.png"),
        Some("Description of _config.png")
    );
    assert!(!report.is_aborted());
}

#[tokio::test]
async fn instance_is_reusable_across_batches() {
    let h = Harness::new();
    h.png("a.png", 1);
    let intake = h.intake();

    let first = intake.run(&paths(&["a.png"])).await;
    let second = intake.run(&paths(&["a.png"])).await;

    assert_eq!(first.descriptions.len(), 1);
    assert_eq!(second.descriptions.len(), 1);
    assert_eq!(h.factory.model_calls(), 2);
}
