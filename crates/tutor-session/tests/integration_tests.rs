//! Integration tests for the tutoring session controller.
//!
//! Wires the controller to the real classifier, generator and recognizer
//! capture with mock backends, plus a few instrumented stand-ins where a test
//! needs to observe concurrency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use image::{Rgb, RgbImage};

use tutor_core::config::{GeneratorConfig, SessionConfig};
use tutor_core::types::EngagementLabel;
use tutor_engagement::{EngagementClassifier, EngagementSource, FaceRegion, MockFaceDetector};
use tutor_generator::{GeneratorError, MockTextModel, ResponseGenerator, TutorGenerator};
use tutor_session::{SessionController, SessionPhase, VoiceStart, STRUGGLING_TIPS};
use tutor_voice::{
    CancelFlag, CaptureSettings, ListenLimits, MockRecognizer, MockUtterance, RecognizerCapture,
    VoiceCapture, VoiceError,
};

// =============================================================================
// Helpers
// =============================================================================

const WAIT: Duration = Duration::from_secs(5);

/// Generator that tracks how many calls are inside `generate` at once.
#[derive(Default)]
struct InstrumentedGenerator {
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    delay: Duration,
}

impl InstrumentedGenerator {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

impl ResponseGenerator for InstrumentedGenerator {
    fn generate(&self, question: &str) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("An answer about {}.", question))
    }

    fn clear_memory(&self) {}
}

/// Voice capture whose driver crashes mid-capture.
struct PanickingMic;

impl VoiceCapture for PanickingMic {
    fn capture(&self, _cancel: &CancelFlag) -> Result<Option<String>, VoiceError> {
        panic!("driver crashed");
    }
}

/// Classifier whose every frame shows a face covering `area` of 10,000 pixels.
fn classifier_with_face_area(area: u32) -> Arc<EngagementClassifier<MockFaceDetector>> {
    let detector = MockFaceDetector::single(FaceRegion::new(0, 0, area, 1));
    let classifier = Arc::new(EngagementClassifier::new(detector).unwrap());
    classifier.analyze(&RgbImage::from_pixel(100, 100, Rgb([90, 90, 90])));
    classifier
}

fn fast_settings() -> CaptureSettings {
    CaptureSettings {
        max_attempts: 3,
        limits: ListenLimits {
            timeout: Duration::from_millis(50),
            phrase_time_limit: Duration::from_millis(50),
        },
        ambient_calibration: Duration::ZERO,
        min_transcript_chars: 3,
    }
}

fn voice(recognizer: MockRecognizer) -> Arc<dyn VoiceCapture> {
    Arc::new(RecognizerCapture::new(recognizer, fast_settings()))
}

fn controller_with(
    generator: Arc<dyn ResponseGenerator>,
    engagement: Arc<dyn EngagementSource>,
    voice: Arc<dyn VoiceCapture>,
) -> SessionController {
    SessionController::new(generator, engagement, voice, SessionConfig::default())
}

// =============================================================================
// process_query
// =============================================================================

#[test]
fn test_short_questions_never_reach_generator() {
    let generator = Arc::new(InstrumentedGenerator::default());
    let controller = controller_with(
        generator.clone(),
        classifier_with_face_area(2000),
        voice(MockRecognizer::default()),
    );

    for question in ["", " ", "a", "  b  ", "\n\t"] {
        let response = controller.process_query(question);
        assert!(!response.success, "question {:?}", question);
        assert_eq!(response.text, "Please ask a complete question");
        assert_eq!(response.tips, None);
    }
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_struggling_answer_gets_three_tips() {
    // 400 / 10,000 = 0.04 -> Struggling
    let classifier = classifier_with_face_area(400);
    let generator = Arc::new(TutorGenerator::new(
        MockTextModel::new(),
        &GeneratorConfig::default(),
    ));
    let controller = controller_with(generator, classifier, voice(MockRecognizer::default()));

    let response = controller.process_query("How do fractions work?");
    assert!(response.success);
    assert_eq!(response.engagement, EngagementLabel::Struggling);
    let tips = response.tips.unwrap();
    assert_eq!(tips.len(), 3);
    assert_eq!(tips, STRUGGLING_TIPS.map(String::from).to_vec());
}

#[test]
fn test_non_struggling_labels_get_no_tips() {
    // Engaged (> 0.15), Thinking (0.08..0.15), Neutral (no face).
    let sources: Vec<Arc<dyn EngagementSource>> = vec![
        classifier_with_face_area(2000),
        classifier_with_face_area(1000),
        Arc::new(EngagementClassifier::new(MockFaceDetector::no_face()).unwrap()),
    ];
    for source in sources {
        let controller = controller_with(
            Arc::new(InstrumentedGenerator::default()),
            source,
            voice(MockRecognizer::default()),
        );
        let response = controller.process_query("What is inertia?");
        assert!(response.success);
        assert_ne!(response.engagement, EngagementLabel::Struggling);
        assert_eq!(response.tips, None);
    }
}

#[test]
fn test_unloaded_model_yields_apology() {
    let generator = Arc::new(TutorGenerator::new(
        MockTextModel::unloaded(),
        &GeneratorConfig::default(),
    ));
    let controller = controller_with(
        generator,
        classifier_with_face_area(400),
        voice(MockRecognizer::default()),
    );

    let response = controller.process_query("What is a cell?");
    assert!(!response.success);
    assert_eq!(
        response.text,
        "I'm having technical difficulties. Please try again later."
    );
    assert_eq!(response.tips, None);
}

#[test]
fn test_concurrent_queries_never_overlap_in_generator() {
    let generator = Arc::new(InstrumentedGenerator::with_delay(Duration::from_millis(30)));
    let controller = Arc::new(controller_with(
        generator.clone(),
        classifier_with_face_area(1000),
        voice(MockRecognizer::default()),
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let controller = Arc::clone(&controller);
            std::thread::spawn(move || controller.process_query(&format!("question number {}", i)))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().success);
    }

    assert_eq!(generator.calls.load(Ordering::SeqCst), 4);
    assert_eq!(generator.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(controller.status().phase, SessionPhase::Idle);
}

// =============================================================================
// Voice input
// =============================================================================

#[test]
fn test_second_voice_request_dropped_while_busy() {
    let recognizer = MockRecognizer::speaking("what is photosynthesis")
        .with_listen_delay(Duration::from_millis(150));
    let controller = controller_with(
        Arc::new(InstrumentedGenerator::default()),
        classifier_with_face_area(1000),
        voice(recognizer),
    );

    let (first_tx, first_rx) = mpsc::channel();
    let (second_tx, second_rx) = mpsc::channel::<Option<String>>();

    let first = controller
        .start_voice_input(move |text| first_tx.send(text).unwrap())
        .unwrap();
    let second = controller
        .start_voice_input(move |text| second_tx.send(text).unwrap())
        .unwrap();

    assert_eq!(first, VoiceStart::Started);
    assert_eq!(second, VoiceStart::Busy);
    assert!(controller.status().listening);

    assert_eq!(
        first_rx.recv_timeout(WAIT).unwrap().as_deref(),
        Some("what is photosynthesis")
    );
    // The dropped callback was never invoked, so its sender is gone.
    assert!(matches!(
        second_rx.recv_timeout(Duration::from_millis(200)),
        Err(mpsc::RecvTimeoutError::Disconnected)
    ));
}

#[test]
fn test_interrupt_during_capture_yields_none() {
    let recognizer = MockRecognizer::scripted(vec![
        MockUtterance::Silence,
        MockUtterance::Speech("what is gravity".into()),
    ])
    .with_listen_delay(Duration::from_millis(150));
    let listens = recognizer.listen_counter();
    let controller = controller_with(
        Arc::new(InstrumentedGenerator::default()),
        classifier_with_face_area(1000),
        voice(recognizer),
    );

    let (tx, rx) = mpsc::channel();
    controller
        .start_voice_input(move |text| tx.send(text).unwrap())
        .unwrap();
    std::thread::sleep(Duration::from_millis(50));
    controller.interrupt();

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), None);
    assert_eq!(listens.load(Ordering::SeqCst), 1);
}

#[test]
fn test_panicking_capture_still_calls_back_once() {
    let controller = controller_with(
        Arc::new(InstrumentedGenerator::default()),
        classifier_with_face_area(1000),
        Arc::new(PanickingMic),
    );

    let (tx, rx) = mpsc::channel();
    let started = controller
        .start_voice_input(move |text| tx.send(text).unwrap())
        .unwrap();
    assert_eq!(started, VoiceStart::Started);

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), None);
    // Exactly once: the sender is dropped after the single callback.
    assert!(matches!(
        rx.recv_timeout(Duration::from_millis(200)),
        Err(mpsc::RecvTimeoutError::Disconnected)
    ));

    // The slot comes back, so a later capture can start.
    let deadline = std::time::Instant::now() + WAIT;
    while controller.status().listening {
        assert!(std::time::Instant::now() < deadline, "slot never released");
        std::thread::sleep(Duration::from_millis(5));
    }
    let (tx, rx) = mpsc::channel();
    assert_eq!(
        controller
            .start_voice_input(move |text| tx.send(text).unwrap())
            .unwrap(),
        VoiceStart::Started
    );
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), None);
}

#[test]
fn test_voice_then_query_round_trip() {
    let generator = Arc::new(TutorGenerator::new(
        MockTextModel::new(),
        &GeneratorConfig::default(),
    ));
    let controller = Arc::new(controller_with(
        generator,
        classifier_with_face_area(2000),
        voice(MockRecognizer::scripted(vec![
            MockUtterance::Timeout,
            MockUtterance::Speech("  why do leaves change color  ".into()),
        ])),
    ));

    let (tx, rx) = mpsc::channel();
    let worker_controller = Arc::clone(&controller);
    controller
        .start_voice_input(move |text| {
            let response = text.map(|q| worker_controller.process_query(&q));
            tx.send(response).unwrap();
        })
        .unwrap();

    let response = rx.recv_timeout(WAIT).unwrap().unwrap();
    assert!(response.success);
    assert!(response.text.contains("why do leaves change color"));
    assert_eq!(response.engagement, EngagementLabel::Engaged);
}

// =============================================================================
// clear_conversation
// =============================================================================

#[test]
fn test_clear_conversation_keeps_engagement_state() {
    let classifier = classifier_with_face_area(400);
    let generator = Arc::new(TutorGenerator::new(
        MockTextModel::new(),
        &GeneratorConfig::default(),
    ));
    let controller = controller_with(
        generator.clone(),
        classifier.clone(),
        voice(MockRecognizer::default()),
    );

    controller.process_query("What is an ecosystem?");
    controller.process_query("What is a food chain?");
    assert_eq!(generator.memory_len(), 2);
    let history_before = classifier.history();

    controller.clear_conversation();

    assert_eq!(generator.memory_len(), 0);
    assert_eq!(classifier.last_status(), EngagementLabel::Struggling);
    assert_eq!(classifier.history(), history_before);
    assert_eq!(controller.status().last_engagement, None);
}
