//! AI photo analysis via the Gemini REST API.
//!
//! The analyzer never returns an error to its callers. Every failure
//! mode (download, transport, malformed model output) becomes a
//! [`ModerationAnalysis::failure`] so the orchestrator can record it on
//! the queue entry and leave the photo for manual review.

use async_trait::async_trait;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use domain::models::{ModerationAnalysis, ModerationDecision};

use crate::config::ModerationConfig;
use crate::services::credentials::CredentialsResolver;

/// Instruction sent with every image. The model is asked for strict
/// JSON; the parser below still tolerates markdown fences and chatter.
const ANALYSIS_PROMPT: &str = "You are a content moderator for an event photo-sharing app. \
Approve benign event photography, including social drinking in context. \
Reject explicit nudity or sexual content, gore or graphic violence, weapons in a \
threatening context, drugs or drug paraphernalia, hate symbols, and exposed \
personal information such as documents or card numbers. \
Respond with ONLY a JSON object in this exact format: \
{\"decision\": \"approve\" or \"reject\", \"confidence\": 0.0 to 1.0, \"reason\": \"short explanation\"}";

lazy_static! {
    /// Grabs the outermost JSON object from model output that may be
    /// wrapped in markdown fences or prose.
    static ref JSON_OBJECT_RE: Regex = Regex::new(r"\{[\s\S]*\}").unwrap();
}

/// Something that can analyze a photo by URL.
#[async_trait]
pub trait PhotoAnalyzer: Send + Sync {
    async fn analyze(&self, photo_url: &str) -> ModerationAnalysis;
}

/// Gemini-backed photo analyzer.
///
/// The API key resolves per analysis through the
/// [`CredentialsResolver`], so a key saved in the admin panel takes
/// effect without a restart.
pub struct GeminiClient {
    http: Client,
    credentials: CredentialsResolver,
    config: ModerationConfig,
}

impl GeminiClient {
    /// Creates a client, or `None` when the HTTP client cannot be built.
    pub fn new(credentials: CredentialsResolver, config: ModerationConfig) -> Option<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            http,
            credentials,
            config,
        })
    }

    async fn download_photo(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| format!("photo download failed: {}", e))?;
        if !response.status().is_success() {
            return Err(format!("photo download failed: HTTP {}", response.status()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("photo download failed: {}", e))?;
        Ok(bytes.to_vec())
    }

    async fn call_gemini(&self, api_key: &str, image: &[u8]) -> Result<String, String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.gemini_api_url, self.config.model, api_key
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let body = json!({
            "contents": [{
                "parts": [
                    {"text": ANALYSIS_PROMPT},
                    {"inline_data": {"mime_type": "image/jpeg", "data": encoded}}
                ]
            }],
            "generationConfig": {"temperature": 0.1}
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("gemini request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("gemini request failed: HTTP {}", response.status()));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| format!("gemini response not readable: {}", e))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| "gemini response had no candidates".to_string())
    }
}

#[async_trait]
impl PhotoAnalyzer for GeminiClient {
    async fn analyze(&self, photo_url: &str) -> ModerationAnalysis {
        // Key resolution comes first so an unconfigured deployment
        // fails soft without fetching the photo.
        let api_key = self.credentials.gemini_api_key().await;
        if api_key.is_empty() {
            return ModerationAnalysis::failure("Gemini API key not configured");
        }

        let image = match self.download_photo(photo_url).await {
            Ok(image) => image,
            Err(e) => {
                warn!(photo_url = %photo_url, error = %e, "Photo download failed");
                return ModerationAnalysis::failure(e);
            }
        };

        match self.call_gemini(&api_key, &image).await {
            Ok(text) => {
                debug!(output_len = text.len(), "Gemini analysis returned");
                parse_verdict(&text)
            }
            Err(e) => {
                warn!(error = %e, "Gemini analysis failed");
                ModerationAnalysis::failure(e)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    decision: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    reason: String,
}

/// Parse the model's free-text output into an analysis result.
///
/// Model output is untrusted: it may fence the JSON in markdown, prefix
/// it with prose, or return garbage. Anything unparseable becomes a
/// failure result rather than a verdict.
pub fn parse_verdict(text: &str) -> ModerationAnalysis {
    let Some(raw_json) = JSON_OBJECT_RE.find(text) else {
        return ModerationAnalysis::failure(format!(
            "no JSON object in model output: {}",
            truncate(text, 200)
        ));
    };

    let raw: RawVerdict = match serde_json::from_str(raw_json.as_str()) {
        Ok(raw) => raw,
        Err(e) => {
            return ModerationAnalysis::failure(format!("malformed model output: {}", e));
        }
    };

    let Some(decision) = ModerationDecision::parse(raw.decision.trim()) else {
        return ModerationAnalysis::failure(format!("unknown decision: {}", raw.decision));
    };

    let reason = if raw.reason.is_empty() {
        "no reason given".to_string()
    } else {
        raw.reason
    };

    ModerationAnalysis::verdict(decision, raw.confidence, reason)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubric_names_the_moderation_baselines() {
        for clause in [
            "social drinking",
            "weapons in a threatening context",
            "personal information",
            "nudity",
            "hate symbols",
        ] {
            assert!(
                ANALYSIS_PROMPT.contains(clause),
                "rubric is missing: {clause}"
            );
        }
    }

    #[test]
    fn test_parse_plain_json() {
        let analysis =
            parse_verdict(r#"{"decision": "approve", "confidence": 0.95, "reason": "clean"}"#);
        assert_eq!(analysis.suggestion, Some(ModerationDecision::Approve));
        assert_eq!(analysis.confidence, 0.95);
        assert_eq!(analysis.reason, "clean");
        assert!(!analysis.is_failure());
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"decision\": \"reject\", \"confidence\": 0.6, \"reason\": \"nudity\"}\n```";
        let analysis = parse_verdict(text);
        assert_eq!(analysis.suggestion, Some(ModerationDecision::Reject));
        assert_eq!(analysis.confidence, 0.6);
    }

    #[test]
    fn test_parse_json_with_surrounding_prose() {
        let text = "Here is my assessment:\n{\"decision\": \"approve\", \"confidence\": 0.8, \"reason\": \"party photo\"} Hope this helps!";
        let analysis = parse_verdict(text);
        assert_eq!(analysis.suggestion, Some(ModerationDecision::Approve));
    }

    #[test]
    fn test_parse_no_json_is_failure() {
        let analysis = parse_verdict("I cannot analyze this image.");
        assert!(analysis.is_failure());
        assert_eq!(analysis.suggestion, None);
    }

    #[test]
    fn test_parse_unknown_decision_is_failure() {
        let analysis = parse_verdict(r#"{"decision": "maybe", "confidence": 0.5, "reason": "x"}"#);
        assert!(analysis.is_failure());
    }

    #[test]
    fn test_parse_confidence_clamped() {
        let analysis =
            parse_verdict(r#"{"decision": "approve", "confidence": 3.0, "reason": "x"}"#);
        assert_eq!(analysis.confidence, 1.0);
    }

    #[test]
    fn test_parse_missing_reason_placeholder() {
        let analysis = parse_verdict(r#"{"decision": "approve", "confidence": 0.9}"#);
        assert_eq!(analysis.reason, "no reason given");
    }
}
