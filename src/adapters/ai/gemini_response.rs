//! Text extraction from `generateContent` response bodies.
//!
//! Bodies are parsed once into a `serde_json::Value`, then matched against a
//! short list of known shapes in order. Only when none of them yields text
//! does the generic scan walk the whole document looking for a `text` key.

use serde::Deserialize;
use serde_json::Value;

use crate::ports::{FinishReason, TokenUsage};

/// Text pulled out of a response, with whatever metadata came with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub shape: ResponseShape,
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
}

/// Which shape the text was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `candidates[].content.parts[].text`
    CandidateParts,
    /// `candidates[].output`
    CandidateOutput,
    /// Top-level `text`
    TopLevelText,
    /// First non-empty string under any `text` key
    DeepScan,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    output: Option<String>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopLevelText {
    text: String,
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn map_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        None | Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
            FinishReason::ContentFilter
        }
        Some(_) => FinishReason::Other,
    }
}

/// Reason the prompt was blocked, if the provider says so.
pub fn block_reason(body: &Value) -> Option<String> {
    GenerateContentBody::deserialize(body)
        .ok()
        .and_then(|b| b.prompt_feedback)
        .and_then(|f| f.block_reason)
}

/// Extracts the first non-empty text from a response body.
pub fn extract_text(body: &Value) -> Option<ExtractedText> {
    if let Ok(parsed) = GenerateContentBody::deserialize(body) {
        let usage = parsed
            .usage_metadata
            .as_ref()
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        for candidate in &parsed.candidates {
            let finish_reason = map_finish_reason(candidate.finish_reason.as_deref());
            let parts_text = candidate
                .content
                .iter()
                .flat_map(|c| c.parts.iter())
                .filter_map(|p| p.text.as_deref())
                .find_map(non_empty);

            if let Some(text) = parts_text {
                return Some(ExtractedText {
                    text,
                    shape: ResponseShape::CandidateParts,
                    finish_reason,
                    usage,
                });
            }
        }

        for candidate in &parsed.candidates {
            if let Some(text) = candidate.output.as_deref().and_then(non_empty) {
                return Some(ExtractedText {
                    text,
                    shape: ResponseShape::CandidateOutput,
                    finish_reason: map_finish_reason(candidate.finish_reason.as_deref()),
                    usage,
                });
            }
        }
    }

    if let Some(text) = TopLevelText::deserialize(body)
        .ok()
        .and_then(|t| non_empty(&t.text))
    {
        return Some(ExtractedText {
            text,
            shape: ResponseShape::TopLevelText,
            finish_reason: FinishReason::Stop,
            usage: TokenUsage::default(),
        });
    }

    deep_scan(body).map(|text| ExtractedText {
        text,
        shape: ResponseShape::DeepScan,
        finish_reason: FinishReason::Other,
        usage: TokenUsage::default(),
    })
}

/// Depth-first search for the first non-empty string under a `text` key.
fn deep_scan(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(text) = map.get("text").and_then(Value::as_str).and_then(non_empty) {
                return Some(text);
            }
            map.values().find_map(deep_scan)
        }
        Value::Array(items) => items.iter().find_map(deep_scan),
        _ => None,
    }
}
