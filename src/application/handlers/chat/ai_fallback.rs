//! AIFallbackClient - free-form replies from the generative provider.
//!
//! Used when a message matches no structured command. Attempts run strictly
//! one after another down a fixed ladder: a moderate budget, a larger
//! budget, then a small deterministic request over a short history. The
//! first attempt that yields non-empty text wins; if none does, the user
//! gets a fixed apology.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AiConfig;
use crate::domain::conversation::{replies, ChatMessage};
use crate::domain::foundation::{TopicId, UserId};
use crate::ports::{AIProvider, CompletionRequest, RequestMetadata};

/// Parameters of one rung of the attempt ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptPlan {
    pub max_tokens: u32,
    /// Prior messages included in the prompt.
    pub history: usize,
    pub temperature: f32,
}

/// Ladder and timing for [`AIFallbackClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSettings {
    pub attempts: Vec<AttemptPlan>,
    /// Applied to each attempt separately.
    pub attempt_timeout: Duration,
}

impl FallbackSettings {
    pub fn from_config(config: &AiConfig) -> Self {
        let history = config.effective_history_limit();
        Self {
            attempts: vec![
                AttemptPlan {
                    max_tokens: config.first_attempt_max_tokens,
                    history,
                    temperature: config.temperature,
                },
                AttemptPlan {
                    max_tokens: config.second_attempt_max_tokens,
                    history,
                    temperature: config.temperature,
                },
                AttemptPlan {
                    max_tokens: config.final_attempt_max_tokens,
                    history: config.final_attempt_history.min(history),
                    temperature: 0.0,
                },
            ],
            attempt_timeout: config.timeout(),
        }
    }

    /// The largest history any attempt asks for.
    pub fn history_window(&self) -> usize {
        self.attempts.iter().map(|a| a.history).max().unwrap_or(0)
    }
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self::from_config(&AiConfig::default())
    }
}

/// Renders history as `ROLE: content` blocks followed by the new user line.
pub fn render_prompt(history: &[ChatMessage], new_message: &str) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role().as_str().to_uppercase(), m.content()))
        .chain(std::iter::once(format!("USER: {}", new_message)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Asks the provider for a reply, walking the attempt ladder.
#[derive(Clone)]
pub struct AIFallbackClient {
    provider: Arc<dyn AIProvider>,
    settings: FallbackSettings,
}

impl AIFallbackClient {
    pub fn new(provider: Arc<dyn AIProvider>, settings: FallbackSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &FallbackSettings {
        &self.settings
    }

    pub fn provider(&self) -> Arc<dyn AIProvider> {
        Arc::clone(&self.provider)
    }

    /// Returns the provider's text, or the fixed apology if every attempt
    /// fails.
    ///
    /// `history` holds the messages preceding `new_message`, oldest first.
    pub async fn ask(
        &self,
        user_id: &UserId,
        topic_id: &TopicId,
        history: &[ChatMessage],
        new_message: &str,
    ) -> String {
        let info = self.provider.provider_info();

        for (index, plan) in self.settings.attempts.iter().enumerate() {
            let attempt = index as u32 + 1;
            let window = &history[history.len().saturating_sub(plan.history)..];
            let request = CompletionRequest::new(
                render_prompt(window, new_message),
                RequestMetadata::new(user_id.clone(), *topic_id, attempt),
            )
            .with_max_tokens(plan.max_tokens)
            .with_temperature(plan.temperature);

            let outcome =
                tokio::time::timeout(self.settings.attempt_timeout, self.provider.complete(request))
                    .await;

            match outcome {
                Ok(Ok(response)) => {
                    let text = response.content.trim();
                    if !text.is_empty() {
                        tracing::info!(
                            topic_id = %topic_id,
                            attempt,
                            provider = %info.name,
                            model = %response.model,
                            total_tokens = response.usage.total_tokens,
                            "AI fallback answered"
                        );
                        return text.to_string();
                    }
                    tracing::warn!(topic_id = %topic_id, attempt, "AI attempt returned empty text");
                }
                Ok(Err(err)) => {
                    tracing::warn!(
                        topic_id = %topic_id,
                        attempt,
                        error = %err,
                        retryable = err.is_retryable(),
                        "AI attempt failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        topic_id = %topic_id,
                        attempt,
                        timeout_secs = self.settings.attempt_timeout.as_secs(),
                        "AI attempt timed out"
                    );
                }
            }
        }

        tracing::warn!(topic_id = %topic_id, "All AI attempts failed");
        replies::AI_UNAVAILABLE.to_string()
    }
}
