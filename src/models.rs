//! Data models shared by the conversation log, the job tracker and the IPC layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ErrorKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat turn. Never edited once appended.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Stable local handle for a job. Unlike the display id it never changes,
/// so lookups keep working after the server assigns its own id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(pub u64);

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModStatus {
    Generating,
    TexturesGenerating,
    CodeGenerated,
    Compiling,
    Ready,
    Error,
}

impl ModStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ModStatus::Ready | ModStatus::Error)
    }

    /// Position in the happy path. `Error` has none.
    fn stage(self) -> Option<u8> {
        match self {
            ModStatus::Generating => Some(0),
            ModStatus::TexturesGenerating => Some(1),
            ModStatus::CodeGenerated => Some(2),
            ModStatus::Compiling => Some(3),
            ModStatus::Ready => Some(4),
            ModStatus::Error => None,
        }
    }

    /// Whether a job may move from `self` to `next`. Terminal states are
    /// absorbing, `Error` is reachable from any in-progress state, and the
    /// happy path only moves forward (stages may be skipped).
    pub fn can_transition_to(self, next: ModStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(cur), Some(nxt)) => nxt > cur,
            (None, Some(_)) => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModStatus::Generating => "generating",
            ModStatus::TexturesGenerating => "textures_generating",
            ModStatus::CodeGenerated => "code_generated",
            ModStatus::Compiling => "compiling",
            ModStatus::Ready => "ready",
            ModStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<ModStatus> {
        Some(match s {
            "generating" => ModStatus::Generating,
            "textures_generating" => ModStatus::TexturesGenerating,
            "code_generated" => ModStatus::CodeGenerated,
            "compiling" => ModStatus::Compiling,
            "ready" => ModStatus::Ready,
            "error" => ModStatus::Error,
            _ => return None,
        })
    }
}

impl fmt::Display for ModStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a finished jar lives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum JobPayload {
    /// Base64-encoded jar returned by the compile endpoint.
    Inline { data: String },
    /// `fileUrl` of a job loaded from the listing.
    Url { url: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFailure {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMod {
    pub handle: JobHandle,
    /// Client-temporary id until the server issues one, then the server id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub name: String,
    pub description: String,
    pub version: String,
    pub minecraft_version: String,
    pub timestamp: DateTime<Utc>,
    pub status: ModStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<JobFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<JobPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_url: Option<String>,
}

impl GeneratedMod {
    /// A job can be downloaded once it is ready and has something to save.
    pub fn is_downloadable(&self) -> bool {
        self.status == ModStatus::Ready && self.payload.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(ModStatus::Generating.can_transition_to(ModStatus::TexturesGenerating));
        assert!(ModStatus::TexturesGenerating.can_transition_to(ModStatus::CodeGenerated));
        // texture stage may be skipped
        assert!(ModStatus::Generating.can_transition_to(ModStatus::CodeGenerated));
        assert!(ModStatus::Compiling.can_transition_to(ModStatus::Ready));
    }

    #[test]
    fn test_no_regression_or_escape_from_terminal() {
        assert!(!ModStatus::Compiling.can_transition_to(ModStatus::Generating));
        assert!(!ModStatus::Compiling.can_transition_to(ModStatus::Compiling));
        assert!(!ModStatus::Ready.can_transition_to(ModStatus::Generating));
        assert!(!ModStatus::Ready.can_transition_to(ModStatus::Error));
        assert!(!ModStatus::Error.can_transition_to(ModStatus::Ready));
    }

    #[test]
    fn test_error_reachable_from_any_in_progress_state() {
        for s in [
            ModStatus::Generating,
            ModStatus::TexturesGenerating,
            ModStatus::CodeGenerated,
            ModStatus::Compiling,
        ] {
            assert!(s.can_transition_to(ModStatus::Error), "{s}");
        }
    }

    #[test]
    fn test_status_string_forms() {
        let json = serde_json::to_string(&ModStatus::TexturesGenerating).unwrap();
        assert_eq!(json, "\"textures_generating\"");
        assert_eq!(ModStatus::parse("code_generated"), Some(ModStatus::CodeGenerated));
        assert_eq!(ModStatus::parse("queued"), None);
    }
}
