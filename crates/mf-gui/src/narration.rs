//! Fire-and-forget voice narration.
//!
//! Every request runs on its own detached thread. Starting a new request
//! flags the previous one as cancelled; the worker checks the flag between
//! words and stops early. Nothing flows back to the frame loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Something that can voice text.
pub trait SpeechBackend: Send + Sync {
    /// Voice one word. May block.
    fn say(&self, word: &str);
    /// The request finished without being cancelled.
    fn finish(&self, _text: &str) {}
}

/// Backend that writes each narrated line to the log.
#[derive(Debug, Default)]
pub struct LogSpeech;

impl SpeechBackend for LogSpeech {
    fn say(&self, _word: &str) {}

    fn finish(&self, text: &str) {
        tracing::info!(target: "narration", "{text}");
    }
}

/// Launches and cancels narration requests.
pub struct Narrator {
    backend: Arc<dyn SpeechBackend>,
    cancel: Option<Arc<AtomicBool>>,
    enabled: bool,
}

impl Narrator {
    /// Narrator over `backend`, enabled.
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self {
            backend,
            cancel: None,
            enabled: true,
        }
    }

    /// Follow the voice narration setting. Disabling cancels anything in
    /// flight.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            self.cancel_current();
        }
        self.enabled = enabled;
    }

    /// Whether requests are being voiced.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cancel the request in flight, if any.
    pub fn cancel_current(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
    }

    /// Voice `text` on a fresh thread, cancelling the previous request.
    ///
    /// Returns the worker handle; dropping it detaches the thread. `None`
    /// when narration is disabled, the text is blank, or the thread could
    /// not be started.
    pub fn speak(&mut self, text: &str) -> Option<JoinHandle<()>> {
        if !self.enabled || text.trim().is_empty() {
            return None;
        }
        self.cancel_current();

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(cancel.clone());
        let backend = Arc::clone(&self.backend);
        let text = text.to_string();

        let spawned = thread::Builder::new()
            .name("narration".into())
            .spawn(move || {
                for word in text.split_whitespace() {
                    if cancel.load(Ordering::Relaxed) {
                        return;
                    }
                    backend.say(word);
                }
                if !cancel.load(Ordering::Relaxed) {
                    backend.finish(&text);
                }
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("narration thread failed to start: {e}");
                None
            }
        }
    }
}
