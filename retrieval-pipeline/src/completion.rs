use std::time::Duration;

use async_openai::{
    config::AzureConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;
use common::{error::AppError, utils::config::AppConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("completion request timed out after {0:?}")]
    Timeout(Duration),
    #[error("completion request failed: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },
    #[error("completion service returned an error: {0}")]
    Api(String),
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<OpenAIError> for UpstreamError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::Reqwest(e) => Self::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            OpenAIError::ApiError(api) => Self::Api(api.message),
            OpenAIError::JSONDeserialize(e) => Self::Malformed(e.to_string()),
            other => Self::Transport {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

/// Chat-completion capability used to answer questions.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, transcript: &[ChatTurn]) -> Result<Completion, UpstreamError>;
}

/// Connection settings for the Azure OpenAI deployment.
#[derive(Clone)]
pub struct CompletionSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl std::fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CompletionSettings {
    /// Settings from config; endpoint, key and deployment must all be present.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        fn required(value: Option<&String>, name: &str) -> Result<String, AppError> {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    AppError::Configuration(format!("{name} is not configured"))
                })
        }

        Ok(Self {
            endpoint: required(config.azure_openai_endpoint.as_ref(), "AZURE_OPENAI_ENDPOINT")?
                .trim_end_matches('/')
                .to_string(),
            api_key: required(config.azure_openai_api_key.as_ref(), "AZURE_OPENAI_API_KEY")?,
            deployment: required(
                config.azure_openai_chat_deployment.as_ref(),
                "AZURE_OPENAI_CHAT_DEPLOYMENT",
            )?,
            api_version: config.azure_openai_api_version.clone(),
            timeout: Duration::from_secs(config.completion_timeout_secs),
            temperature: config.completion_temperature,
            max_tokens: config.completion_max_tokens,
        })
    }
}

pub struct AzureCompletionService {
    client: Client<AzureConfig>,
    settings: CompletionSettings,
}

impl AzureCompletionService {
    pub fn new(settings: CompletionSettings) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {e}")))?;

        let config = AzureConfig::new()
            .with_api_base(&settings.endpoint)
            .with_api_key(&settings.api_key)
            .with_deployment_id(&settings.deployment)
            .with_api_version(&settings.api_version);

        Ok(Self {
            client: Client::with_config(config).with_http_client(http_client),
            settings,
        })
    }

    fn build_request(
        &self,
        transcript: &[ChatTurn],
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let messages = transcript
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.settings.deployment)
            .messages(messages)
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .build()
    }
}

#[async_trait]
impl CompletionService for AzureCompletionService {
    #[instrument(skip_all, fields(deployment = %self.settings.deployment, turns = transcript.len()))]
    async fn complete(&self, transcript: &[ChatTurn]) -> Result<Completion, UpstreamError> {
        let request = self.build_request(transcript)?;

        let response = tokio::time::timeout(self.settings.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| UpstreamError::Timeout(self.settings.timeout))??;

        let completion = process_completion_response(response)?;
        debug!(usage = ?completion.usage, "Completion received");
        Ok(completion)
    }
}

fn to_request_message(turn: &ChatTurn) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    Ok(match turn.role {
        ChatRole::System => ChatCompletionRequestSystemMessage::from(turn.content.clone()).into(),
        ChatRole::User => ChatCompletionRequestUserMessage::from(turn.content.clone()).into(),
        ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(turn.content.clone())
            .build()?
            .into(),
    })
}

pub fn process_completion_response(
    response: CreateChatCompletionResponse,
) -> Result<Completion, UpstreamError> {
    let usage = response.usage.as_ref().map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    let text = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| UpstreamError::Malformed("No content found in completion response".into()))?;

    Ok(Completion {
        text: text.to_string(),
        usage,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AppConfig {
        AppConfig {
            azure_openai_endpoint: Some("https://example.openai.azure.com/".into()),
            azure_openai_api_key: Some("secret".into()),
            azure_openai_chat_deployment: Some("gpt-4o".into()),
            ..Default::default()
        }
    }

    fn response(content: Option<&str>) -> CreateChatCompletionResponse {
        serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }))
        .expect("valid response fixture")
    }

    #[test]
    fn settings_require_endpoint_key_and_deployment() {
        let settings = CompletionSettings::from_config(&configured()).expect("settings");
        assert_eq!(settings.endpoint, "https://example.openai.azure.com");
        assert_eq!(settings.timeout, Duration::from_secs(30));

        let missing_key = AppConfig {
            azure_openai_api_key: None,
            ..configured()
        };
        assert!(matches!(
            CompletionSettings::from_config(&missing_key),
            Err(AppError::Configuration(msg)) if msg.contains("AZURE_OPENAI_API_KEY")
        ));

        let blank_deployment = AppConfig {
            azure_openai_chat_deployment: Some(" ".into()),
            ..configured()
        };
        assert!(CompletionSettings::from_config(&blank_deployment).is_err());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let settings = CompletionSettings::from_config(&configured()).expect("settings");
        assert!(!format!("{settings:?}").contains("secret"));
    }

    #[test]
    fn request_carries_every_turn() {
        let service =
            AzureCompletionService::new(CompletionSettings::from_config(&configured()).expect("settings"))
                .expect("service");
        let request = service
            .build_request(&[
                ChatTurn::new(ChatRole::System, "persona"),
                ChatTurn::new(ChatRole::Assistant, "earlier answer"),
                ChatTurn::new(ChatRole::User, "question"),
            ])
            .expect("request");

        assert_eq!(request.messages.len(), 3);
        assert!(matches!(
            request.messages.get(1),
            Some(ChatCompletionRequestMessage::Assistant(_))
        ));
    }

    #[tokio::test]
    async fn unresponsive_endpoint_is_cut_off_by_the_timeout() {
        let service = testing::unresponsive_service(Duration::from_secs(1)).await;

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            service.complete(&[ChatTurn::new(ChatRole::User, "hello")]),
        )
        .await
        .expect("completion call is bounded");

        assert!(matches!(
            result,
            Err(UpstreamError::Timeout(_) | UpstreamError::Transport { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn response_text_is_trimmed_and_usage_kept() {
        let completion = process_completion_response(response(Some("  The answer.  ")))
            .expect("completion");
        assert_eq!(completion.text, "The answer.");
        assert_eq!(
            completion.usage,
            Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15
            })
        );
    }

    #[test]
    fn empty_response_is_malformed() {
        assert!(matches!(
            process_completion_response(response(None)),
            Err(UpstreamError::Malformed(_))
        ));
        assert!(matches!(
            process_completion_response(response(Some("   "))),
            Err(UpstreamError::Malformed(_))
        ));
    }
}
