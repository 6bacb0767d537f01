use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SummarizerConfig;
use crate::error::ExpsheetError;
use crate::extraction::truncate_content;
use crate::summarize::prompt::{build_messages, ChatMessage};
use crate::summarize::Summarizer;

/// Summarizer backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiSummarizer {
    config: SummarizerConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiSummarizer {
    pub fn new(config: SummarizerConfig) -> Result<Self, ExpsheetError> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(OpenAiSummarizer { config, client })
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, document_text: &str) -> Result<String, ExpsheetError> {
        let text = truncate_content(document_text, self.config.max_content_length);
        let messages = build_messages(&text);
        let request = ChatRequest {
            model: &self.config.model,
            messages: &messages,
            temperature: self.config.temperature,
        };

        let url = self.config.chat_completions_url();
        info!(
            model = self.config.model.as_str(),
            chars = text.chars().count(),
            "requesting datasheet"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        debug!(%status, bytes = body.len(), "chat completion response");

        if !status.is_success() {
            return Err(ExpsheetError::Transport(format!(
                "API returned {status}: {}",
                api_error_message(&body)
            )));
        }

        extract_content(&body)
    }

    fn backend_name(&self) -> &str {
        "openai"
    }
}

/// Pull the first choice's message text out of a chat completion body.
fn extract_content(body: &str) -> Result<String, ExpsheetError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ExpsheetError::Transport(format!("unexpected response body: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ExpsheetError::Transport("response contained no message content".into()))
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.chars().take(500).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve one HTTP response on a local port; the handle yields the raw request.
    fn one_shot_server(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|l| {
                let (name, value) = l.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn config(base_url: String) -> SummarizerConfig {
        SummarizerConfig {
            api_key: "sk-test".into(),
            base_url,
            max_content_length: 10,
            timeout_secs: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"| A |\n|---|\n| 1 |"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "| A |\n|---|\n| 1 |");
    }

    #[test]
    fn test_extract_content_empty_choices() {
        let err = extract_content(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ExpsheetError::Transport(_)));
        let err = extract_content(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap_err();
        assert!(matches!(err, ExpsheetError::Transport(_)));
        let err = extract_content("<html>gateway</html>").unwrap_err();
        assert!(matches!(err, ExpsheetError::Transport(_)));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Incorrect API key provided");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_request_body_shape() {
        let messages = build_messages("x");
        let request = ChatRequest {
            model: "gpt-4o-2024-08-06",
            messages: &messages,
            temperature: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-2024-08-06");
        assert_eq!(value["messages"].as_array().unwrap().len(), 6);
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_new_rejects_missing_key() {
        let err = OpenAiSummarizer::new(SummarizerConfig::default()).err().unwrap();
        assert!(matches!(err, ExpsheetError::Config(_)));
    }

    #[test]
    fn test_summarize_round_trip() {
        let (base_url, server) = one_shot_server(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"| 사용자 |\n|---|\n| 과장 |\n"}}]}"#,
        );
        let summarizer = OpenAiSummarizer::new(config(base_url)).unwrap();

        let reply = summarizer.summarize("0123456789abcdef").unwrap();
        assert_eq!(reply, "| 사용자 |\n|---|\n| 과장 |\n");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains("0123456789..."));
        assert!(!request.contains("abcdef"));
    }

    #[test]
    fn test_summarize_http_error() {
        let (base_url, server) = one_shot_server(
            "401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        );
        let summarizer = OpenAiSummarizer::new(config(base_url)).unwrap();

        let err = summarizer.summarize("text").unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, ExpsheetError::Transport(_)));
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("Incorrect API key provided"));
    }

    #[test]
    fn test_summarize_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        drop(listener);

        let summarizer = OpenAiSummarizer::new(config(base_url)).unwrap();
        let err = summarizer.summarize("text").unwrap_err();
        assert!(matches!(err, ExpsheetError::Transport(_)));
    }
}
