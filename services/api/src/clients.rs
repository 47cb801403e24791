//! Outbound HTTP clients for the document parser and the language model.

use async_trait::async_trait;
use creditlens::config::{DocumentParserConfig, LanguageModelConfig};
use creditlens::pipeline::{CollaboratorError, DocumentParser, LanguageModel, ParsedDocument};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::{debug, info};

const CHAT_SERVICE: &str = "language model";
const PARSE_SERVICE: &str = "document parser";

const SYSTEM_PROMPT: &str = "You are a financial analyst expert. Analyze the provided financial data and return structured JSON responses with detailed insights and numerical scores.";
const TEMPERATURE: f64 = 0.2;

/// OpenAI-style chat completion endpoint.
#[derive(Clone)]
pub(crate) struct ChatCompletionClient {
    client: reqwest::Client,
    config: LanguageModelConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionClient {
    pub(crate) fn new(config: LanguageModelConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| CollaboratorError::new(CHAT_SERVICE, "LLAMA_API_KEY is not configured"))?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: json!({ "type": "json_object" }),
        };

        debug!(model = %self.config.model, chars = prompt.len(), "sending chat completion");
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| CollaboratorError::new(CHAT_SERVICE, err.to_string()))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::new(
                CHAT_SERVICE,
                format!("status {}", response.status()),
            ));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| CollaboratorError::new(CHAT_SERVICE, err.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CollaboratorError::new(CHAT_SERVICE, "response had no message content"))
    }
}

/// LlamaParse job API: upload, poll until the job settles, fetch markdown.
#[derive(Clone)]
pub(crate) struct LlamaParseClient {
    client: reqwest::Client,
    config: DocumentParserConfig,
}

#[derive(Debug, Deserialize)]
struct JobHandle {
    id: String,
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct MarkdownResult {
    #[serde(default)]
    markdown: String,
}

impl LlamaParseClient {
    pub(crate) fn new(config: DocumentParserConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
    ) -> Result<T, CollaboratorError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(parse_error)?;
        if !response.status().is_success() {
            return Err(CollaboratorError::new(
                PARSE_SERVICE,
                format!("{path} returned status {}", response.status()),
            ));
        }
        response.json().await.map_err(parse_error)
    }

    async fn upload(&self, api_key: &str, path: &Path) -> Result<String, CollaboratorError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| CollaboratorError::new(PARSE_SERVICE, err.to_string()))?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("statement.pdf")
            .to_string();
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime.essence_str())
            .map_err(parse_error)?;
        let form = Form::new()
            .part("file", part)
            .text("result_type", "markdown")
            .text("language", "en");

        let response = self
            .client
            .post(self.endpoint("upload"))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(parse_error)?;
        if !response.status().is_success() {
            return Err(CollaboratorError::new(
                PARSE_SERVICE,
                format!("upload returned status {}", response.status()),
            ));
        }
        let handle: JobHandle = response.json().await.map_err(parse_error)?;
        Ok(handle.id)
    }

    async fn wait_for_job(&self, api_key: &str, job_id: &str) -> Result<(), CollaboratorError> {
        for attempt in 1..=self.config.poll_attempts {
            let job: JobStatus = self.get_json(api_key, &format!("job/{job_id}")).await?;
            match job.status.as_str() {
                "SUCCESS" => return Ok(()),
                "ERROR" => {
                    return Err(CollaboratorError::new(
                        PARSE_SERVICE,
                        format!("job {job_id} ended with ERROR"),
                    ))
                }
                other => debug!(job_id, attempt, status = other, "parse job pending"),
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
        Err(CollaboratorError::new(
            PARSE_SERVICE,
            format!(
                "job {job_id} did not finish after {} attempts",
                self.config.poll_attempts
            ),
        ))
    }
}

#[async_trait]
impl DocumentParser for LlamaParseClient {
    async fn parse(&self, path: &Path) -> Result<ParsedDocument, CollaboratorError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            CollaboratorError::new(PARSE_SERVICE, "LLAMA_CLOUD_API_KEY is not configured")
        })?;

        let job_id = self.upload(api_key, path).await?;
        info!(%job_id, "statement uploaded for parsing");
        self.wait_for_job(api_key, &job_id).await?;

        let result: MarkdownResult = self
            .get_json(api_key, &format!("job/{job_id}/result/markdown"))
            .await?;

        let mut metadata = Map::new();
        metadata.insert("job_id".to_string(), Value::String(job_id));
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            metadata.insert("source".to_string(), Value::String(name.to_string()));
        }
        Ok(ParsedDocument::from_markdown(result.markdown, metadata))
    }
}

fn parse_error(err: reqwest::Error) -> CollaboratorError {
    CollaboratorError::new(PARSE_SERVICE, err.to_string())
}
