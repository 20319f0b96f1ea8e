//! Background trail worker
//!
//! Consumes fire-and-forget action entries from the service channel and
//! records them through the recorder (primary path with fallback). Exits
//! when the channel closes. A failed entry is logged and the worker keeps
//! draining; the callers' flows finished long ago.

use super::recorder::{NewAction, TrailRecorder};

/// Drains the fire-and-forget action channel
pub struct TrailWorker {
    recorder: TrailRecorder,
}

impl TrailWorker {
    pub fn new(recorder: TrailRecorder) -> Self {
        Self { recorder }
    }

    /// Run the worker (blocks until the channel closes)
    pub async fn run(self, mut rx: tokio::sync::mpsc::Receiver<NewAction>) {
        tracing::info!("Trail worker started");

        while let Some(action) = rx.recv().await {
            let order_id = action.order_id.clone();
            match self.recorder.record_action(action).await {
                Ok((event, path)) => {
                    tracing::debug!(
                        order_id = %event.order_id,
                        sequence = event.sequence,
                        kind = %event.kind,
                        path = ?path,
                        "Trail entry recorded"
                    );
                }
                Err(e) => {
                    tracing::error!(order_id = %order_id, "Failed to record trail entry: {:?}", e);
                }
            }
        }

        tracing::info!("Trail action channel closed, worker stopping");
    }
}
