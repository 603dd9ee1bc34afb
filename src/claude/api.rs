//! Claude API client

use super::{CompletionRequest, OutputSchema, TextGenerator};
use crate::config::LlmConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude API request
#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    name: &'a str,
}

/// Claude API client
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ClaudeClient {
    /// Create a new Claude client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("llm.api_key is required".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_request<'a>(
        &'a self,
        request: &'a CompletionRequest,
        schema: Option<&'a OutputSchema>,
    ) -> ClaudeRequest<'a> {
        let (tools, tool_choice) = match schema {
            Some(schema) => (
                vec![Tool {
                    name: &schema.name,
                    description: &schema.description,
                    input_schema: &schema.schema,
                }],
                Some(ToolChoice {
                    kind: "tool",
                    name: &schema.name,
                }),
            ),
            None => (Vec::new(), None),
        };

        ClaudeRequest {
            model: &self.model,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.user,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tools,
            tool_choice,
        }
    }

    /// Make a single API request
    async fn make_request(&self, request: &ClaudeRequest<'_>) -> Result<ApiResponse> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| Error::External(format!("API request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => {
                let api_response: ApiResponse = response.json().await.map_err(|e| {
                    Error::MalformedResponse(format!("Failed to parse response: {}", e))
                })?;
                debug!(
                    model = %api_response.model,
                    input_tokens = api_response.usage.input_tokens,
                    output_tokens = api_response.usage.output_tokens,
                    stop_reason = ?api_response.stop_reason,
                    "Claude call completed"
                );
                Ok(api_response)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                Err(Error::External("Rate limit exceeded".to_string()))
            }
            StatusCode::UNAUTHORIZED => Err(Error::Auth("Invalid API key".to_string())),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(Error::HttpStatus(format!(
                    "API error {}: {}",
                    status, error_text
                )))
            }
        }
    }
}

#[async_trait]
impl TextGenerator for ClaudeClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_request = self.build_request(request, None);
        let response = self.make_request(&api_request).await?;
        Ok(response.text())
    }

    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        schema: &OutputSchema,
    ) -> Result<Value> {
        let api_request = self.build_request(request, Some(schema));
        let response = self.make_request(&api_request).await?;
        response.tool_input(&schema.name)
    }
}

// Internal API response structures
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: usize,
    output_tokens: usize,
}

impl ApiResponse {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    fn tool_input(self, tool_name: &str) -> Result<Value> {
        self.content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { name, input } if name == tool_name => Some(input),
                _ => None,
            })
            .ok_or_else(|| {
                Error::MalformedResponse(format!("Response did not call tool '{}'", tool_name))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ClaudeClient {
        let config = LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        ClaudeClient::new(&config).unwrap()
    }

    fn parse(value: Value) -> ApiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_free_text_request_has_no_tools() {
        let client = client();
        let request = CompletionRequest::new("system text", "user text");
        let body = serde_json::to_value(client.build_request(&request, None)).unwrap();

        assert_eq!(body["model"], crate::config::DEFAULT_MODEL);
        assert_eq!(body["system"], "system text");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "user text");
        assert_eq!(body["temperature"], 0.0);
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_structured_request_forces_tool() {
        let client = client();
        let request = CompletionRequest::new("s", "u");
        let schema = OutputSchema {
            name: "record_takes".to_string(),
            description: "Record takes".to_string(),
            schema: json!({"type": "object"}),
        };
        let body = serde_json::to_value(client.build_request(&request, Some(&schema))).unwrap();

        assert_eq!(body["tools"][0]["name"], "record_takes");
        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");
        assert_eq!(body["tool_choice"]["type"], "tool");
        assert_eq!(body["tool_choice"]["name"], "record_takes");
    }

    #[test]
    fn test_text_joins_text_blocks() {
        let response = parse(json!({
            "content": [
                {"type": "text", "text": "1. Hey @X: "},
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "Player A is out."}
            ],
            "model": "claude",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }));
        assert_eq!(response.text(), "1. Hey @X: Player A is out.");
    }

    #[test]
    fn test_tool_input_extraction() {
        let response = parse(json!({
            "content": [
                {"type": "text", "text": "Recording."},
                {"type": "tool_use", "id": "toolu_1", "name": "record_takes", "input": {"takes": []}}
            ],
            "model": "claude",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }));
        assert_eq!(response.tool_input("record_takes").unwrap(), json!({"takes": []}));
    }

    #[test]
    fn test_missing_tool_call_is_malformed() {
        let response = parse(json!({
            "content": [{"type": "text", "text": "No takes."}],
            "model": "claude",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 1}
        }));
        let err = response.tool_input("record_takes").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
