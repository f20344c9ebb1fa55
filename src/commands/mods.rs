use std::path::PathBuf;
use tauri::ipc::Channel;
use tauri::AppHandle;
use tauri_plugin_dialog::DialogExt;

use crate::commands::SessionState;
use crate::download::SavedJar;
use crate::error::{ModcraftError, Result};
use crate::events::PipelineEvent;
use crate::models::{GeneratedMod, JobHandle};
use crate::pipeline::Outcome;

#[tauri::command]
pub fn list_mods(state: tauri::State<'_, SessionState>) -> Vec<GeneratedMod> {
    state.0.jobs()
}

/// Load the job history from the listing service, replacing the local list.
/// Called by the frontend on first display.
#[tauri::command]
pub async fn refresh_mods(state: tauri::State<'_, SessionState>) -> Result<Vec<GeneratedMod>> {
    let session = state.0.clone();
    session.refresh().await?;
    Ok(session.jobs())
}

#[tauri::command]
pub async fn resume_compile(
    handle: JobHandle,
    on_event: Channel<PipelineEvent>,
    state: tauri::State<'_, SessionState>,
) -> Result<Outcome> {
    let session = state.0.clone();
    session.resume_compile(handle, &on_event).await
}

/// Save a ready mod as a jar. With `choose_folder` the user picks the
/// destination; otherwise the configured download directory is used.
/// Returns `None` when the job has nothing to download or the picker was
/// dismissed.
#[tauri::command]
pub async fn download_mod(
    app: AppHandle,
    handle: JobHandle,
    choose_folder: Option<bool>,
    on_event: Channel<PipelineEvent>,
    state: tauri::State<'_, SessionState>,
) -> Result<Option<SavedJar>> {
    let session = state.0.clone();

    let dir = if choose_folder.unwrap_or(false) {
        match pick_folder(&app).await? {
            Some(dir) => dir,
            None => return Ok(None),
        }
    } else {
        session.config().resolve_download_dir()
    };

    session.download(handle, &dir, &on_event).await
}

async fn pick_folder(app: &AppHandle) -> Result<Option<PathBuf>> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    app.dialog().file().pick_folder(move |folder| {
        let _ = tx.send(folder);
    });

    let folder = rx
        .await
        .map_err(|e| ModcraftError::Custom(e.to_string()))?;
    match folder {
        Some(path) => path
            .into_path()
            .map(Some)
            .map_err(|e| ModcraftError::Custom(e.to_string())),
        None => Ok(None),
    }
}
