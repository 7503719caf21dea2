//! Messages streamed to visualization clients.

use serde::{Deserialize, Serialize};
use sortviz_engine::{AudioSink, Frame, RenderSink, Step, TimelineStatus, Tone};
use tokio::sync::{broadcast, watch};

/// One update pushed over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    /// Bars changed; `step` is absent for redraws outside a run
    Frame { step: Option<Step>, frame: Frame },

    /// Play a tone
    Tone { frequency: f32, duration_ms: u64 },

    /// Blocking notification for the user
    Alert { message: String },

    /// A recorded timeline advanced during playback
    Replay {
        step: Option<Step>,
        status: TimelineStatus,
        frame: Frame,
    },
}

impl From<Tone> for Update {
    fn from(tone: Tone) -> Self {
        Update::Tone {
            frequency: tone.frequency,
            duration_ms: tone.duration.as_millis() as u64,
        }
    }
}

/// Render and audio sink fanning updates out to every connected client.
///
/// The latest frame is also kept for clients that connect mid-run.
#[derive(Clone)]
pub struct BroadcastSink {
    updates: broadcast::Sender<Update>,
    latest: watch::Sender<Frame>,
}

impl BroadcastSink {
    pub fn new(updates: broadcast::Sender<Update>, latest: watch::Sender<Frame>) -> Self {
        Self { updates, latest }
    }

    fn publish(&self, update: Update) {
        // No subscribers is fine; nobody is watching.
        let _ = self.updates.send(update);
    }
}

impl RenderSink for BroadcastSink {
    fn render(&mut self, step: &Step, frame: &Frame) {
        self.latest.send_replace(frame.clone());
        self.publish(Update::Frame {
            step: Some(step.clone()),
            frame: frame.clone(),
        });
    }

    fn refresh(&mut self, frame: &Frame) {
        self.latest.send_replace(frame.clone());
        self.publish(Update::Frame {
            step: None,
            frame: frame.clone(),
        });
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!("{}", message);
        self.publish(Update::Alert {
            message: message.to_string(),
        });
    }
}

impl AudioSink for BroadcastSink {
    fn play(&mut self, tone: Tone) {
        self.publish(tone.into());
    }
}
