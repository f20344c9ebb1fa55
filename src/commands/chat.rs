use tauri::ipc::Channel;

use crate::commands::SessionState;
use crate::error::Result;
use crate::events::PipelineEvent;
use crate::models::ChatTurn;
use crate::pipeline::Outcome;

/// Generate a mod from a chat prompt, streaming turns and status changes
/// through `on_event` while the run progresses.
#[tauri::command]
pub async fn send_message(
    prompt: String,
    on_event: Channel<PipelineEvent>,
    state: tauri::State<'_, SessionState>,
) -> Result<Outcome> {
    let session = state.0.clone();
    session.submit(&prompt, &on_event).await
}

#[tauri::command]
pub fn get_conversation(state: tauri::State<'_, SessionState>) -> Vec<ChatTurn> {
    state.0.conversation()
}

/// The frontend disables the input while this is true.
#[tauri::command]
pub fn is_generating(state: tauri::State<'_, SessionState>) -> bool {
    state.0.is_generating()
}
