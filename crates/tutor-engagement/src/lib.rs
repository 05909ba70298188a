//! Tutor Engagement crate - webcam engagement classification.
//!
//! Provides the `FaceDetector` and `FrameSource` traits with mock
//! implementations for testing, the `EngagementClassifier` that turns face
//! geometry into an `EngagementLabel`, a bounded rolling history, and the
//! polling loop that feeds frames to the classifier.

pub mod classifier;
pub mod error;
pub mod history;
pub mod monitor;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{GrayImage, Rgb, RgbImage};

use tutor_core::types::EngagementLabel;

pub use classifier::{classify_ratio, EngagementClassifier};
pub use error::EngagementError;
pub use history::EngagementHistory;
pub use monitor::EngagementMonitor;

// =============================================================================
// Types
// =============================================================================

/// Axis-aligned bounding box of a detected face, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area of the region in square pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Face-region detector run on grayscale frames.
///
/// Implementations wrap a concrete detection model. The model is loaded when
/// the detector is built; `ensure_ready` reports whether that succeeded.
pub trait FaceDetector: Send + Sync {
    /// Confirm the underlying model is loaded and usable.
    fn ensure_ready(&self) -> Result<(), EngagementError> {
        Ok(())
    }

    /// Detect face regions in a grayscale frame, in detector order.
    fn detect(&self, frame: &GrayImage) -> Result<Vec<FaceRegion>, EngagementError>;
}

/// Source of webcam frames.
pub trait FrameSource: Send + Sync {
    /// Grab the next frame from the device.
    fn next_frame(&self) -> impl Future<Output = Result<RgbImage, EngagementError>> + Send;
}

/// Anything that can report the most recently observed engagement label.
///
/// The read is a loose snapshot: callers get whatever was last observed, with
/// no synchronization against the producer.
pub trait EngagementSource: Send + Sync {
    fn last_status(&self) -> EngagementLabel;
}

/// Engagement source used when tracking is off or the detector failed to
/// load. Always reports `Neutral`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEngagement;

impl EngagementSource for DisabledEngagement {
    fn last_status(&self) -> EngagementLabel {
        EngagementLabel::Neutral
    }
}

// =============================================================================
// Mock implementations
// =============================================================================

/// Mock face detector for testing.
///
/// Replays a script of per-frame detections, cycling when it runs out. An
/// empty script means "no face" on every frame.
#[derive(Debug, Default)]
pub struct MockFaceDetector {
    script: Vec<Vec<FaceRegion>>,
    cursor: AtomicUsize,
    fail_detect: bool,
    fail_load: bool,
}

impl MockFaceDetector {
    /// A detector that never finds a face.
    pub fn no_face() -> Self {
        Self::default()
    }

    /// A detector that finds the same single face on every frame.
    pub fn single(region: FaceRegion) -> Self {
        Self::scripted(vec![vec![region]])
    }

    /// A detector that finds several faces on every frame, in the given order.
    pub fn multiple(regions: Vec<FaceRegion>) -> Self {
        Self::scripted(vec![regions])
    }

    /// A detector that returns `script[n % len]` for the n-th frame.
    pub fn scripted(script: Vec<Vec<FaceRegion>>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// A detector whose every `detect` call fails.
    pub fn failing() -> Self {
        Self {
            fail_detect: true,
            ..Self::default()
        }
    }

    /// A detector whose model never loaded.
    pub fn unloadable() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }
}

impl FaceDetector for MockFaceDetector {
    fn ensure_ready(&self) -> Result<(), EngagementError> {
        if self.fail_load {
            return Err(EngagementError::DetectorInit(
                "mock detector model missing".to_string(),
            ));
        }
        Ok(())
    }

    fn detect(&self, _frame: &GrayImage) -> Result<Vec<FaceRegion>, EngagementError> {
        if self.fail_detect {
            return Err(EngagementError::Detection(
                "mock detector failure".to_string(),
            ));
        }
        if self.script.is_empty() {
            return Ok(Vec::new());
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.script.len();
        Ok(self.script[index].clone())
    }
}

/// Mock frame source producing solid grey frames of a fixed size.
#[derive(Debug, Clone)]
pub struct MockFrameSource {
    width: u32,
    height: u32,
    fail: bool,
}

impl MockFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fail: false,
        }
    }

    /// A source whose device is unavailable.
    pub fn failing() -> Self {
        Self {
            width: 0,
            height: 0,
            fail: true,
        }
    }
}

impl Default for MockFrameSource {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl FrameSource for MockFrameSource {
    async fn next_frame(&self) -> Result<RgbImage, EngagementError> {
        if self.fail {
            return Err(EngagementError::FrameSource(
                "mock webcam unavailable".to_string(),
            ));
        }
        Ok(RgbImage::from_pixel(
            self.width,
            self.height,
            Rgb([128, 128, 128]),
        ))
    }
}
