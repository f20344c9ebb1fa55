//! One chat session: the conversation log, the job list and the generation
//! routine that drives a prompt through textures, code and compile.

use parking_lot::Mutex;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::{CodeRequest, CompileRequest, ModService, TextureOutcome, TextureRequest};
use crate::config::ModcraftConfig;
use crate::conversation::Conversation;
use crate::download::{self, SavedJar};
use crate::error::{ModcraftError, Result};
use crate::events::{EventSink, NotifyLevel, PipelineEvent};
use crate::history::to_generated_mod;
use crate::models::{ChatTurn, GeneratedMod, JobFailure, JobHandle, JobPayload, ModStatus};
use crate::tracker::JobTracker;

pub const MSG_STARTING: &str = "Отлично! Начинаю генерацию мода. Это займёт несколько минут...\n\nСоздаю структуру мода, генерирую текстуры, пишу код логики, компилирую в JAR.";
pub const MSG_TEXTURES_DONE: &str = "🎨 Текстуры готовы! Перехожу к генерации кода...";
pub const MSG_CODE_DONE: &str = "💻 Код мода сгенерирован! Компилирую в JAR...";
pub const MSG_COMPLETE: &str = "✅ Мод готов! Можешь скачать его во вкладке \"История\".";

/// How a generation run ended.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "data")]
pub enum Outcome {
    Ready(JobHandle),
    /// The compiler accepted the job but has not finished; the job stays at
    /// `compiling` until [`Session::resume_compile`] sees it ready.
    Pending(JobHandle),
    Failed(JobHandle, JobFailure),
}

/// Clears the generating flag on every exit path.
struct GeneratingGuard<'a>(&'a AtomicBool);

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Session {
    config: ModcraftConfig,
    service: Arc<dyn ModService>,
    http: reqwest::Client,
    conversation: Mutex<Conversation>,
    jobs: Mutex<JobTracker>,
    generating: AtomicBool,
}

impl Session {
    pub fn new(config: ModcraftConfig, service: Arc<dyn ModService>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::api::USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;
        let jobs = JobTracker::new(&config);
        Ok(Self {
            config,
            service,
            http,
            conversation: Mutex::new(Conversation::new()),
            jobs: Mutex::new(jobs),
            generating: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ModcraftConfig {
        &self.config
    }

    pub fn conversation(&self) -> Vec<ChatTurn> {
        self.conversation.lock().turns().to_vec()
    }

    pub fn jobs(&self) -> Vec<GeneratedMod> {
        self.jobs.lock().list().to_vec()
    }

    pub fn job(&self, handle: JobHandle) -> Option<GeneratedMod> {
        self.jobs.lock().get(handle).cloned()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Take the single-flight slot, or fail with `Busy` if a run holds it.
    fn begin(&self) -> Result<GeneratingGuard<'_>> {
        self.generating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ModcraftError::Busy)?;
        Ok(GeneratingGuard(&self.generating))
    }

    /// Replace the job list with the listing service's records.
    pub async fn refresh(&self) -> Result<usize> {
        let _guard = self.begin()?;
        let remote = self.service.list_mods().await?;
        let mods: Vec<GeneratedMod> = remote
            .into_iter()
            .map(|r| to_generated_mod(r, &self.config))
            .collect();
        let count = mods.len();
        self.jobs.lock().replace_all(mods);
        info!(count, "loaded mod history");
        Ok(count)
    }

    /// Run one prompt through the whole pipeline.
    ///
    /// The user turn records `input` as typed; the job and the services see
    /// it trimmed. Empty input and a concurrent run are rejected without
    /// touching any state. Once the job exists, every failure is folded into the job's
    /// `error` status and reported as [`Outcome::Failed`].
    pub async fn submit(&self, input: &str, sink: &dyn EventSink) -> Result<Outcome> {
        let prompt = input.trim();
        if prompt.is_empty() {
            return Err(ModcraftError::Validation("Describe the mod first".into()));
        }
        let _guard = self.begin()?;

        let (handle, temp_id, name) = {
            let mut conversation = self.conversation.lock();
            sink.emit(PipelineEvent::TurnAppended(conversation.push_user(input)));
            sink.emit(PipelineEvent::TurnAppended(
                conversation.push_assistant(MSG_STARTING),
            ));

            let mut jobs = self.jobs.lock();
            let handle = jobs.create(prompt);
            let job = jobs.get(handle).ok_or(ModcraftError::JobNotFound(handle.0))?;
            (handle, job.id.clone(), job.name.clone())
        };
        info!(%handle, %name, "generation started");
        sink.emit(PipelineEvent::JobCreated {
            handle,
            id: temp_id.clone(),
            name: name.clone(),
        });

        let outcome = match self.run_stages(handle, &temp_id, prompt, &name, sink).await {
            Ok(outcome) => outcome,
            Err(e) => self.record_failure(handle, &e, sink),
        };
        sink.emit(PipelineEvent::Finished);
        Ok(outcome)
    }

    async fn run_stages(
        &self,
        handle: JobHandle,
        temp_id: &str,
        prompt: &str,
        name: &str,
        sink: &dyn EventSink,
    ) -> Result<Outcome> {
        self.set_status(handle, ModStatus::TexturesGenerating, sink)?;
        let texture = self
            .service
            .generate_textures(TextureRequest {
                mod_id: temp_id,
                description: prompt,
            })
            .await?;
        let texture_url = match texture {
            TextureOutcome::Generated(resp) => {
                info!(%handle, texture_url = ?resp.texture_url, "textures generated");
                self.say(MSG_TEXTURES_DONE, sink);
                resp.texture_url
            }
            TextureOutcome::Rejected { status, message } => {
                warn!(%handle, status, %message, "texture generation rejected, continuing without preview");
                None
            }
        };

        let minecraft_version = self
            .job(handle)
            .map(|j| j.minecraft_version)
            .unwrap_or_else(|| self.config.minecraft_version.clone());
        let code = self
            .service
            .generate_code(CodeRequest {
                prompt,
                minecraft_version: &minecraft_version,
                mod_name: name,
            })
            .await?;
        let remote_id = code
            .mod_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ModcraftError::MissingField {
                stage: "Code generation",
                field: "mod_id",
            })?;

        {
            let mut jobs = self.jobs.lock();
            jobs.assign_remote_id(handle, &remote_id)?;
            if let Some(url) = &texture_url {
                jobs.attach_preview(handle, url)?;
            }
        }
        self.set_status(handle, ModStatus::CodeGenerated, sink)?;
        info!(%handle, %remote_id, "code generated");
        self.say(MSG_CODE_DONE, sink);

        self.set_status(handle, ModStatus::Compiling, sink)?;
        self.poll_compile(handle, &remote_id, sink).await
    }

    /// One compile request for a job already at `compiling`.
    async fn poll_compile(
        &self,
        handle: JobHandle,
        remote_id: &str,
        sink: &dyn EventSink,
    ) -> Result<Outcome> {
        let compiled = self
            .service
            .compile(CompileRequest { mod_id: remote_id })
            .await?;

        match compiled.status.as_str() {
            "ready" => {
                let data = compiled
                    .jar_data
                    .filter(|d| !d.trim().is_empty())
                    .ok_or(ModcraftError::MissingField {
                        stage: "Compile",
                        field: "jar_data",
                    })?;
                let size = download::decode_payload(&data)?.len();

                self.jobs
                    .lock()
                    .attach_result(handle, JobPayload::Inline { data })?;
                self.set_status(handle, ModStatus::Ready, sink)?;
                info!(%handle, %remote_id, size, "mod ready");
                self.say(MSG_COMPLETE, sink);
                sink.emit(PipelineEvent::Notify {
                    level: NotifyLevel::Success,
                    title: "Мод готов!".into(),
                    description: "Твой мод успешно создан и готов к скачиванию.".into(),
                });
                Ok(Outcome::Ready(handle))
            }
            "error" | "failed" => Err(ModcraftError::Remote {
                stage: "Compile",
                status: 200,
                message: format!("compiler reported `{}`", compiled.status),
            }),
            other => {
                info!(%handle, %remote_id, status = other, "compile not finished yet");
                Ok(Outcome::Pending(handle))
            }
        }
    }

    /// Ask the compiler again about a job left at `compiling`.
    pub async fn resume_compile(&self, handle: JobHandle, sink: &dyn EventSink) -> Result<Outcome> {
        let job = self.job(handle).ok_or(ModcraftError::JobNotFound(handle.0))?;
        let remote_id = match (job.status, job.remote_id) {
            (ModStatus::Compiling, Some(id)) => id,
            (status, _) => {
                return Err(ModcraftError::Validation(format!(
                    "Job {handle} is {status}, not waiting on the compiler"
                )))
            }
        };
        let _guard = self.begin()?;

        let outcome = match self.poll_compile(handle, &remote_id, sink).await {
            Ok(outcome) => outcome,
            Err(e) => self.record_failure(handle, &e, sink),
        };
        sink.emit(PipelineEvent::Finished);
        Ok(outcome)
    }

    /// Save a ready job's jar into `dir`. `Ok(None)` when the job has nothing
    /// to download yet.
    pub async fn download(
        &self,
        handle: JobHandle,
        dir: &Path,
        sink: &dyn EventSink,
    ) -> Result<Option<SavedJar>> {
        let job = self.job(handle).ok_or(ModcraftError::JobNotFound(handle.0))?;
        let Some(saved) = download::save_job(&job, dir, &self.http).await? else {
            return Ok(None);
        };
        sink.emit(PipelineEvent::Notify {
            level: NotifyLevel::Info,
            title: "Скачивание началось".into(),
            description: format!("{} загружается...", saved.file_name),
        });
        Ok(Some(saved))
    }

    fn set_status(&self, handle: JobHandle, status: ModStatus, sink: &dyn EventSink) -> Result<()> {
        let id = {
            let mut jobs = self.jobs.lock();
            jobs.update_status(handle, status)?;
            jobs.get(handle).map(|j| j.id.clone()).unwrap_or_default()
        };
        sink.emit(PipelineEvent::StatusChanged { handle, id, status });
        Ok(())
    }

    fn say(&self, text: &str, sink: &dyn EventSink) {
        let turn = self.conversation.lock().push_assistant(text);
        sink.emit(PipelineEvent::TurnAppended(turn));
    }

    fn record_failure(&self, handle: JobHandle, err: &ModcraftError, sink: &dyn EventSink) -> Outcome {
        error!(%handle, kind = ?err.kind(), error = %err, "generation failed");
        let failure = JobFailure {
            kind: err.kind(),
            message: err.to_string(),
        };

        self.say(&format!("❌ Ошибка при генерации мода: {err}"), sink);
        if let Err(e) = self.jobs.lock().fail(handle, failure.clone()) {
            warn!(%handle, error = %e, "could not mark job as failed");
        }
        sink.emit(PipelineEvent::StatusChanged {
            handle,
            id: self.job(handle).map(|j| j.id).unwrap_or_default(),
            status: ModStatus::Error,
        });
        sink.emit(PipelineEvent::Failed {
            handle,
            kind: failure.kind,
            message: failure.message.clone(),
        });
        sink.emit(PipelineEvent::Notify {
            level: NotifyLevel::Failure,
            title: "Ошибка".into(),
            description: "Не удалось создать мод. Попробуй ещё раз.".into(),
        });
        Outcome::Failed(handle, failure)
    }
}
