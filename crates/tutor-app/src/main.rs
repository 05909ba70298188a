//! Tutor application binary - composition root.
//!
//! Ties together the tutor crates into a single executable:
//! 1. Load configuration from TOML and apply CLI overrides
//! 2. Build the engagement classifier and start the webcam polling loop
//! 3. Build the response generator and voice capture
//! 4. Hand them to the session controller
//! 5. Run the console front end until `/quit` or Ctrl-C
//!
//! Model-backed services (face detection, text generation, speech
//! recognition, webcam) are wired with their mock implementations here.

mod cli;
mod console;
mod narrator;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use tutor_core::TutorConfig;
use tutor_engagement::{
    DisabledEngagement, EngagementClassifier, EngagementMonitor, EngagementSource, FaceRegion,
    MockFaceDetector, MockFrameSource,
};
use tutor_generator::{MockTextModel, TutorGenerator};
use tutor_session::{SessionController, VoiceStart};
use tutor_voice::{CaptureSettings, MockRecognizer, MockUtterance, RecognizerCapture};

use cli::CliArgs;
use console::Command;
use narrator::{LogNarrator, Narrator};

/// Build the engagement source and, when tracking is on, the polling loop
/// feeding it.
///
/// A detector that fails to load disables tracking instead of aborting:
/// answers then carry `Neutral`.
fn start_engagement(
    config: &TutorConfig,
    shutdown: &CancellationToken,
) -> (Arc<dyn EngagementSource>, Option<JoinHandle<u64>>) {
    if !config.engagement.enabled {
        tracing::info!("Engagement tracking disabled");
        return (Arc::new(DisabledEngagement), None);
    }

    // A 240x240 face in a 640x480 frame reads as engaged.
    let detector = MockFaceDetector::single(FaceRegion::new(200, 120, 240, 240));
    let classifier = match EngagementClassifier::with_history_capacity(
        detector,
        config.engagement.history_capacity,
    ) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            tracing::error!(error = %e, "Engagement tracking unavailable, continuing without it");
            return (Arc::new(DisabledEngagement), None);
        }
    };

    let (monitor, mut readings) = EngagementMonitor::new(
        Arc::clone(&classifier),
        MockFrameSource::default(),
        Duration::from_millis(config.engagement.poll_interval_ms),
    );
    let handle = tokio::spawn(monitor.run(shutdown.clone()));

    // Overlay stand-in: log label changes.
    tokio::spawn(async move {
        let mut shown = None;
        while readings.changed().await.is_ok() {
            let reading = readings.borrow_and_update().clone();
            if shown != Some(reading.label) {
                tracing::debug!(label = %reading.label, icon = %reading.icon, "Engagement changed");
                shown = Some(reading.label);
            }
        }
    });

    (classifier, Some(handle))
}

/// Answer a question off the async runtime, since the controller blocks.
async fn answer(
    controller: &Arc<SessionController>,
    narrator: &Arc<dyn Narrator>,
    question: String,
    json: bool,
) {
    let worker = Arc::clone(controller);
    let response = match tokio::task::spawn_blocking(move || worker.process_query(&question)).await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Question worker failed");
            return;
        }
    };

    if json {
        match serde_json::to_string(&response) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!(error = %e, "Failed to serialize response"),
        }
    } else {
        println!("{}", console::render_response(&response));
    }
    if response.success {
        narrator.speak(&response.text);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = TutorConfig::load_or_default(&config_file);
    args.apply_overrides(&mut config);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Tutor v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    let shutdown = CancellationToken::new();

    // === Services ===

    let (engagement, monitor) = start_engagement(&config, &shutdown);

    let generator = Arc::new(TutorGenerator::new(MockTextModel::new(), &config.generator));
    tracing::info!(max_history = config.generator.max_history, "Response generator ready");

    let recognizer = MockRecognizer::scripted(vec![
        MockUtterance::Timeout,
        MockUtterance::Speech("How does photosynthesis work?".to_string()),
    ])
    .with_listen_delay(Duration::from_secs(1));
    let voice = Arc::new(RecognizerCapture::new(
        recognizer,
        CaptureSettings::from(&config.voice),
    ));

    let controller = Arc::new(SessionController::new(
        generator,
        engagement,
        voice,
        config.session.clone(),
    ));
    let narrator: Arc<dyn Narrator> = Arc::new(LogNarrator);

    // === Console ===

    println!("{}", console::HELP);

    let (transcript_tx, mut transcripts) = mpsc::unbounded_channel::<Option<String>>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            Some(transcript) = transcripts.recv() => {
                match transcript {
                    Some(question) => {
                        println!("You said: {}", question);
                        answer(&controller, &narrator, question, args.json).await;
                    }
                    None => println!("Sorry, I didn't catch that."),
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read console input");
                        break;
                    }
                };
                match Command::parse(&line) {
                    Command::Ask(question) => {
                        answer(&controller, &narrator, question, args.json).await;
                    }
                    Command::Voice => {
                        let tx = transcript_tx.clone();
                        match controller.start_voice_input(move |text| {
                            // The receiver only closes on shutdown.
                            let _ = tx.send(text);
                        }) {
                            Ok(VoiceStart::Started) => println!("Listening..."),
                            Ok(VoiceStart::Busy) => println!("Already listening."),
                            Err(e) => tracing::warn!(error = %e, "Could not start voice input"),
                        }
                    }
                    Command::Interrupt => controller.interrupt(),
                    Command::Clear => {
                        controller.clear_conversation();
                        println!("Conversation cleared.");
                    }
                    Command::Status => println!("{}", console::render_status(&controller.status())),
                    Command::Help => println!("{}", console::HELP),
                    Command::Quit => break,
                }
            }
        }
    }

    // === Shutdown ===

    controller.interrupt();
    shutdown.cancel();
    if let Some(handle) = monitor {
        match handle.await {
            Ok(frames) => tracing::info!(frames, "Engagement monitor stopped"),
            Err(e) => tracing::warn!(error = %e, "Engagement monitor task failed"),
        }
    }
    tracing::info!("Goodbye");

    Ok(())
}
