use std::sync::Arc;

use crate::pipeline::Session;

pub mod chat;
pub mod config;
pub mod mods;

/// Managed Tauri state wrapping the one chat session of the window.
pub struct SessionState(pub Arc<Session>);
