//! Search progress reporting.

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::{SearchError, merge::SectionBucket, search::SearchOutcome};

/// Progress through the section scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchProgress {
    /// The section about to be scanned.
    #[serde(rename = "sectionid")]
    pub section_id: String,
    /// Zero-based position of the section in the scan.
    pub index: usize,
    /// Number of sections to scan.
    pub total: usize,
}

/// Receives events from a search run.
pub trait SearchReporter {
    /// Called once the candidate sections are known, before any section is loaded.
    fn on_index_ready(&mut self, buckets: &[SectionBucket]);

    /// Called before each section is scanned.
    fn on_progress(&mut self, progress: &SearchProgress);

    /// Called when the run completes. Not called for canceled or failed runs.
    fn on_complete(&mut self, outcome: &SearchOutcome);

    /// Called when a run started with `TextSearch::start` fails.
    fn on_failed(&mut self, error: &SearchError);
}

/// A reporter that ignores every event.
pub struct SilentReporter;

impl SearchReporter for SilentReporter {
    fn on_index_ready(&mut self, _buckets: &[SectionBucket]) {}
    fn on_progress(&mut self, _progress: &SearchProgress) {}
    fn on_complete(&mut self, _outcome: &SearchOutcome) {}
    fn on_failed(&mut self, _error: &SearchError) {}
}

/// An event forwarded by [`ChannelReporter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    /// Candidate sections are known.
    IndexReady {
        /// Candidate sections in scan order.
        buckets: Vec<SectionBucket>,
    },
    /// A section is about to be scanned.
    Progress(SearchProgress),
    /// The run completed.
    Complete(SearchOutcome),
    /// The run failed.
    Failed {
        /// Error message.
        message: String,
    },
}

/// Forwards events over an unbounded channel. Events sent after the receiver is dropped
/// are discarded.
pub struct ChannelReporter {
    /// Event sink.
    sender: UnboundedSender<SearchEvent>,
}

impl ChannelReporter {
    /// Creates a reporter and the receiver its events arrive on.
    pub fn new() -> (Self, UnboundedReceiver<SearchEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Sends an event, ignoring a closed channel.
    fn send(&self, event: SearchEvent) {
        if self.sender.send(event).is_err() {
            trace!("search event receiver dropped");
        }
    }
}

impl SearchReporter for ChannelReporter {
    fn on_index_ready(&mut self, buckets: &[SectionBucket]) {
        self.send(SearchEvent::IndexReady {
            buckets: buckets.to_vec(),
        });
    }

    fn on_progress(&mut self, progress: &SearchProgress) {
        self.send(SearchEvent::Progress(progress.clone()));
    }

    fn on_complete(&mut self, outcome: &SearchOutcome) {
        self.send(SearchEvent::Complete(outcome.clone()));
    }

    fn on_failed(&mut self, error: &SearchError) {
        self.send(SearchEvent::Failed {
            message: error.to_string(),
        });
    }
}
