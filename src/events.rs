use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::ErrorKind;
use crate::models::{ChatTurn, JobHandle, ModStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Success,
    Failure,
}

/// Progress events streamed from a generation run to the frontend.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum PipelineEvent {
    TurnAppended(ChatTurn),
    #[serde(rename_all = "camelCase")]
    JobCreated { handle: JobHandle, id: String, name: String },
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        handle: JobHandle,
        id: String,
        status: ModStatus,
    },
    #[serde(rename_all = "camelCase")]
    Notify {
        level: NotifyLevel,
        title: String,
        description: String,
    },
    #[serde(rename_all = "camelCase")]
    Failed { handle: JobHandle, kind: ErrorKind, message: String },
    Finished,
}

/// Receiver side of pipeline progress. Delivery is best-effort: a closed
/// sink never fails the run.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Discards every event.
impl EventSink for () {
    fn emit(&self, _event: PipelineEvent) {}
}

impl EventSink for mpsc::UnboundedSender<PipelineEvent> {
    fn emit(&self, event: PipelineEvent) {
        let _ = self.send(event);
    }
}

#[cfg(feature = "desktop")]
impl EventSink for tauri::ipc::Channel<PipelineEvent> {
    fn emit(&self, event: PipelineEvent) {
        if let Err(e) = self.send(event) {
            tracing::debug!(error = %e, "frontend channel closed");
        }
    }
}
