use color_eyre::{Result, eyre::Context};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionFuture, Llm, Request, Role};

mod error;
pub use error::GeminiApiError;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct Gemini {
    client: Client,
    api_key: String,
    model: String,
}

impl Gemini {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        }
    }
}

impl Llm for Gemini {
    fn complete<'a>(&'a self, req: Request) -> CompletionFuture<'a> {
        Box::pin(async move {
            let body = build_request(req);
            let url = format!(
                "{BASE_URL}/{}:generateContent?key={}",
                self.model, self.api_key
            );

            let res = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .context("sending Gemini request")?;

            let status = res.status();
            let text = res.text().await.context("reading Gemini response")?;
            if !status.is_success() {
                return Err(GeminiApiError::from_status(status.as_u16(), text).into());
            }
            debug!("Gemini response:\n{text}");

            let response: GenerateContentResponse =
                serde_json::from_str(&text).context("parsing Gemini response")?;
            Ok(response.into_text())
        })
    }
}

fn build_request(req: Request) -> GenerateContentRequest {
    let contents = req
        .messages
        .into_iter()
        .map(|msg| Content {
            role: match msg.role {
                Role::User => "user",
                Role::Model => "model",
            },
            parts: vec![Part { text: msg.content }],
        })
        .collect();

    GenerateContentRequest {
        contents,
        system_instruction: SystemInstruction {
            parts: vec![Part { text: req.system }],
        },
        tools: vec![Tool {
            google_search: GoogleSearch {},
        }],
        generation_config: GenerationConfig {
            thinking_config: ThinkingConfig {
                thinking_budget: -1,
            },
            response_mime_type: "text/plain",
        },
    }
}

//
// ===== Gemini wire types =====
//

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: SystemInstruction,
    tools: Vec<Tool>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "thinkingConfig")]
    thinking_config: ThinkingConfig,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Serialize)]
struct ThinkingConfig {
    #[serde(rename = "thinkingBudget")]
    thinking_budget: i32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate; empty when the model
    /// produced no output. Blocked candidates carry only a finish reason and
    /// no content at all, which counts as no output too.
    fn into_text(self) -> String {
        let Some(candidate) = self.candidates.into_iter().flatten().next() else {
            return String::new();
        };
        let Some(content) = candidate.content else {
            return String::new();
        };

        content.parts.into_iter().filter_map(|p| p.text).collect()
    }
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod test {
    use expect_test::expect;

    use crate::llm::InputMessage;

    use super::*;

    #[test]
    fn request_serialization() {
        let body = build_request(Request {
            system: "Answer in JSON".into(),
            messages: vec![
                InputMessage::user("example idea"),
                InputMessage::model("{\"positive\": []}"),
                InputMessage::user("a cat wizard"),
            ],
        });

        let expect = expect![[
            r#"{"contents":[{"role":"user","parts":[{"text":"example idea"}]},{"role":"model","parts":[{"text":"{\"positive\": []}"}]},{"role":"user","parts":[{"text":"a cat wizard"}]}],"systemInstruction":{"parts":[{"text":"Answer in JSON"}]},"tools":[{"googleSearch":{}}],"generationConfig":{"thinkingConfig":{"thinkingBudget":-1},"responseMimeType":"text/plain"}}"#
        ]];
        expect.assert_eq(&serde_json::to_string(&body).unwrap());
    }

    #[test]
    fn response_text_extraction() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "hello "}, {"text": "world"}]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text(), "hello world");
    }

    #[test]
    fn empty_response_yields_empty_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.into_text(), "");
    }

    #[test]
    fn blocked_candidate_yields_empty_text() {
        // safety blocks deliver a candidate without content
        let raw = r#"{"candidates": [{"finishReason": "SAFETY", "index": 0}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text(), "");
    }
}
