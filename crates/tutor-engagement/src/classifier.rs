//! Engagement classifier: face geometry to engagement label.
//!
//! The classifier keeps the first face the detector reports and compares its
//! share of the frame against fixed thresholds. A large face reads as leaning
//! in, a small one as drifting away. These cut-offs are product policy.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

use image::RgbImage;

use tutor_core::types::{EngagementLabel, EngagementReading, EngagementRecord};

use crate::error::EngagementError;
use crate::history::{EngagementHistory, DEFAULT_HISTORY_CAPACITY};
use crate::{EngagementSource, FaceDetector};

/// Face-area ratio above which the student reads as `Engaged`.
pub const ENGAGED_RATIO: f64 = 0.15;

/// Face-area ratio above which (up to `ENGAGED_RATIO`) the student reads as `Thinking`.
pub const THINKING_RATIO: f64 = 0.08;

/// Map a detected face's area ratio to a label. First match wins.
pub fn classify_ratio(ratio: f64) -> EngagementLabel {
    if ratio > ENGAGED_RATIO {
        EngagementLabel::Engaged
    } else if ratio > THINKING_RATIO {
        EngagementLabel::Thinking
    } else {
        EngagementLabel::Struggling
    }
}

/// Turns webcam frames into engagement readings.
///
/// `analyze` is the single writer of both the last status and the history.
/// `last_status` is a lock-free load, so readers on other threads never
/// contend with the analysis path.
pub struct EngagementClassifier<D> {
    detector: D,
    last_status: AtomicU8,
    history: Mutex<EngagementHistory>,
}

impl<D: FaceDetector> std::fmt::Debug for EngagementClassifier<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementClassifier")
            .field("last_status", &self.last_status())
            .finish_non_exhaustive()
    }
}

impl<D: FaceDetector> EngagementClassifier<D> {
    /// Build a classifier with the default history window.
    ///
    /// Fails with `EngagementError::DetectorInit` if the detector model is not
    /// usable. There is no degraded mode at this level; the caller decides
    /// whether to run without engagement tracking.
    pub fn new(detector: D) -> Result<Self, EngagementError> {
        Self::with_history_capacity(detector, DEFAULT_HISTORY_CAPACITY)
    }

    /// Build a classifier retaining at most `capacity` history records.
    pub fn with_history_capacity(detector: D, capacity: usize) -> Result<Self, EngagementError> {
        if let Err(e) = detector.ensure_ready() {
            tracing::error!(error = %e, "Face detector failed to load");
            return Err(match e {
                EngagementError::DetectorInit(msg) => EngagementError::DetectorInit(msg),
                other => EngagementError::DetectorInit(other.to_string()),
            });
        }
        tracing::info!(history_capacity = capacity, "Engagement classifier ready");
        Ok(Self {
            detector,
            last_status: AtomicU8::new(EngagementLabel::Neutral.as_u8()),
            history: Mutex::new(EngagementHistory::with_capacity(capacity)),
        })
    }

    /// Analyze one frame. Never fails: detector errors degrade to `Neutral`.
    pub fn analyze(&self, frame: &RgbImage) -> EngagementReading {
        match self.detect_label(frame) {
            Ok(label) => {
                self.last_status.store(label.as_u8(), Ordering::Release);
                if label != EngagementLabel::Neutral {
                    self.history
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .record(label);
                }
                EngagementReading::now(label)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Engagement analysis failed");
                EngagementReading::now(EngagementLabel::Neutral)
            }
        }
    }

    /// The label produced by the most recent successful analysis.
    pub fn last_status(&self) -> EngagementLabel {
        EngagementLabel::from_u8(self.last_status.load(Ordering::Acquire))
    }

    /// Copy of the rolling history, oldest first.
    pub fn history(&self) -> Vec<EngagementRecord> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    fn detect_label(&self, frame: &RgbImage) -> Result<EngagementLabel, EngagementError> {
        let (width, height) = frame.dimensions();
        let frame_area = u64::from(width) * u64::from(height);
        if frame_area == 0 {
            return Err(EngagementError::InvalidFrame(format!(
                "frame has zero area ({}x{})",
                width, height
            )));
        }

        let gray = image::imageops::grayscale(frame);
        let faces = self.detector.detect(&gray)?;

        // Only the first region counts; extra faces are ignored.
        let Some(face) = faces.first() else {
            return Ok(EngagementLabel::Neutral);
        };

        let ratio = face.area() as f64 / frame_area as f64;
        let label = classify_ratio(ratio);
        tracing::trace!(ratio, label = %label, faces = faces.len(), "Frame classified");
        Ok(label)
    }
}

impl<D: FaceDetector> EngagementSource for EngagementClassifier<D> {
    fn last_status(&self) -> EngagementLabel {
        EngagementClassifier::last_status(self)
    }
}
