//! Typed client for the four remote mod-generation services.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{Endpoints, ModcraftConfig};
use crate::error::{ModcraftError, Result};

pub const USER_AGENT: &str = concat!("ModCraft/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMod {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub minecraft_version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListModsResponse {
    #[serde(default)]
    pub mods: Vec<RemoteMod>,
}

#[derive(Debug, Serialize)]
pub struct TextureRequest<'a> {
    pub mod_id: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextureResponse {
    #[serde(default)]
    pub texture_url: Option<String>,
}

/// Outcome of the texture stage. A rejected request is not an error for the
/// pipeline; it just means there's no preview.
#[derive(Debug)]
pub enum TextureOutcome {
    Generated(TextureResponse),
    Rejected { status: u16, message: String },
}

#[derive(Debug, Serialize)]
pub struct CodeRequest<'a> {
    pub prompt: &'a str,
    pub minecraft_version: &'a str,
    pub mod_name: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct CodeResponse {
    #[serde(default)]
    pub mod_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompileRequest<'a> {
    pub mod_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompileResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub jar_data: Option<String>,
}

/// Body the services send with a non-2xx status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// The remote collaborators, behind a trait so the orchestration can run
/// against an in-process fake.
#[async_trait]
pub trait ModService: Send + Sync {
    async fn list_mods(&self) -> Result<Vec<RemoteMod>>;
    async fn generate_textures(&self, req: TextureRequest<'_>) -> Result<TextureOutcome>;
    async fn generate_code(&self, req: CodeRequest<'_>) -> Result<CodeResponse>;
    async fn compile(&self, req: CompileRequest<'_>) -> Result<CompileResponse>;
}

/// `ModService` over HTTP with `reqwest`.
pub struct HttpModService {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpModService {
    pub fn new(config: &ModcraftConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            endpoints: config.endpoints.clone(),
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<reqwest::Response> {
        let response = self.client.post(url).json(body).send().await?;
        Ok(response)
    }
}

/// Extract the service's `{ "error": ... }` message, falling back to the raw body.
async fn error_message(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.error,
        Err(_) if text.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => text,
    };
    (status, message)
}

/// Decode a 2xx body. A malformed body is a `Json` error, not a transport one.
async fn decode_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn expect_success(stage: &'static str, response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let (status, message) = error_message(response).await;
    Err(ModcraftError::Remote {
        stage,
        status,
        message,
    })
}

#[async_trait]
impl ModService for HttpModService {
    async fn list_mods(&self) -> Result<Vec<RemoteMod>> {
        let response = self.client.get(&self.endpoints.list_mods).send().await?;
        let response = expect_success("Listing", response).await?;
        let body: ListModsResponse = decode_body(response).await?;
        Ok(body.mods)
    }

    async fn generate_textures(&self, req: TextureRequest<'_>) -> Result<TextureOutcome> {
        let response = self.post(&self.endpoints.generate_textures, &req).await?;
        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Ok(TextureOutcome::Rejected { status, message });
        }
        Ok(TextureOutcome::Generated(decode_body(response).await?))
    }

    async fn generate_code(&self, req: CodeRequest<'_>) -> Result<CodeResponse> {
        let response = self.post(&self.endpoints.generate_code, &req).await?;
        let response = expect_success("Code generation", response).await?;
        decode_body(response).await
    }

    async fn compile(&self, req: CompileRequest<'_>) -> Result<CompileResponse> {
        let response = self.post(&self.endpoints.compile, &req).await?;
        let response = expect_success("Compile", response).await?;
        decode_body(response).await
    }
}
