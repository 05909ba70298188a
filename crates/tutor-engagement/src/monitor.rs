//! Polling loop feeding webcam frames to the classifier.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use tutor_core::types::{EngagementLabel, EngagementReading};

use crate::classifier::EngagementClassifier;
use crate::{FaceDetector, FrameSource};

/// Drives `FrameSource -> EngagementClassifier` on a fixed interval and
/// publishes each reading on a watch channel for the overlay.
pub struct EngagementMonitor<D, S> {
    classifier: Arc<EngagementClassifier<D>>,
    source: S,
    interval: Duration,
    readings: watch::Sender<EngagementReading>,
}

impl<D, S> EngagementMonitor<D, S>
where
    D: FaceDetector + 'static,
    S: FrameSource,
{
    /// Create a monitor and the receiver the presentation layer watches.
    pub fn new(
        classifier: Arc<EngagementClassifier<D>>,
        source: S,
        interval: Duration,
    ) -> (Self, watch::Receiver<EngagementReading>) {
        let (readings, rx) = watch::channel(EngagementReading::now(EngagementLabel::Neutral));
        let monitor = Self {
            classifier,
            source,
            interval,
            readings,
        };
        (monitor, rx)
    }

    /// Run until `cancel` fires. Returns the number of frames analyzed.
    ///
    /// A failed frame grab skips the tick. Analysis runs on the blocking pool
    /// since real detectors are CPU-bound.
    pub async fn run(self, cancel: CancellationToken) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut analyzed = 0u64;

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            "Engagement monitor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(frames = analyzed, "Engagement monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let frame = match self.source.next_frame().await {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::debug!(error = %e, "Frame grab skipped");
                            continue;
                        }
                    };

                    let classifier = Arc::clone(&self.classifier);
                    let reading = match tokio::task::spawn_blocking(move || classifier.analyze(&frame)).await {
                        Ok(reading) => reading,
                        Err(e) => {
                            tracing::warn!(error = %e, "Engagement analysis worker failed");
                            continue;
                        }
                    };

                    analyzed += 1;
                    // No receivers left is fine; the classifier state still updates.
                    let _ = self.readings.send(reading);
                }
            }
        }

        analyzed
    }
}
