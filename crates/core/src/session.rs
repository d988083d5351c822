//! Chat session — the per-session conversation state machine.
//!
//! A `ChatSession` is created when an interactive session starts and
//! dropped when it ends. It is owned by the interaction layer and handed to
//! each UI handler; nothing is shared between sessions.
//!
//! ```text
//! Empty --reset--> Active --append_user / regenerate_last / reset--> Active
//! ```
//!
//! Every handler reports whether the visible state changed so the caller
//! can decide to re-render.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::completion::{CompletionProvider, CompletionRequest, SamplingConfig};
use crate::error::{Result, SessionError};
use crate::feedback::{FeedbackClass, FeedbackLog, FeedbackRecord};
use crate::message::{Conversation, Message};
use crate::persona::Persona;
use crate::prompt::build_prompt;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No greeting yet.
    Empty,
    /// Greeting present; accepts input.
    Active,
}

/// What a handler did to the visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The conversation or settings changed; re-render.
    Changed,
    /// Nothing visible changed.
    Unchanged,
}

impl Outcome {
    pub fn needs_render(self) -> bool {
        matches!(self, Self::Changed)
    }
}

pub struct ChatSession {
    id: SessionId,
    persona: Persona,
    model: String,
    sampling: SamplingConfig,
    conversation: Conversation,
    state: SessionState,
    provider: Arc<dyn CompletionProvider>,
    log: Arc<dyn FeedbackLog>,
}

impl ChatSession {
    /// Create a session in the `Empty` state.
    pub fn new(
        persona: Persona,
        model: impl Into<String>,
        sampling: SamplingConfig,
        provider: Arc<dyn CompletionProvider>,
        log: Arc<dyn FeedbackLog>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            persona,
            model: model.into(),
            sampling,
            conversation: Conversation::new(),
            state: SessionState::Empty,
            provider,
            log,
        }
    }

    /// Create a session and greet: `new` followed by `reset`.
    pub fn start(
        persona: Persona,
        model: impl Into<String>,
        sampling: SamplingConfig,
        provider: Arc<dyn CompletionProvider>,
        log: Arc<dyn FeedbackLog>,
    ) -> Self {
        let mut session = Self::new(persona, model, sampling, provider, log);
        let _ = session.reset();
        info!(
            session = %session.id,
            bot = %session.persona.bot_name,
            model = %session.model,
            provider = session.provider.name(),
            "Chat session started"
        );
        session
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Text of message `index`, if it exists.
    pub fn message_text(&self, index: usize) -> Option<&str> {
        self.conversation.get(index).map(|m| m.text.as_str())
    }

    /// Start over with only the greeting. Always succeeds.
    pub fn reset(&mut self) -> Outcome {
        self.conversation.clear();
        self.conversation
            .push(Message::new(&self.persona.bot_name, &self.persona.greeting));
        self.state = SessionState::Active;
        debug!(session = %self.id, "Conversation reset");
        Outcome::Changed
    }

    /// Append the user's turn and generate the bot's answer.
    ///
    /// On completion failure the user turn is withdrawn again, so the
    /// conversation is exactly as it was before the call.
    pub async fn append_user(&mut self, text: impl Into<String>) -> Result<Outcome> {
        if self.state != SessionState::Active {
            return Err(SessionError::NotInitialized.into());
        }

        self.conversation
            .push(Message::new(&self.persona.user_name, text));

        if let Err(e) = self.generate_reply().await {
            self.conversation.pop();
            return Err(e);
        }
        Ok(Outcome::Changed)
    }

    /// Ask the completion service for the bot's next turn and append it.
    ///
    /// Requires the `Active` state, so index 0 always stays the greeting.
    pub async fn generate_reply(&mut self) -> Result<Outcome> {
        if self.state != SessionState::Active {
            return Err(SessionError::NotInitialized.into());
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: build_prompt(&self.persona, &self.conversation),
            config: self.sampling.clone(),
        };

        debug!(
            session = %self.id,
            model = %request.model,
            prompt_len = request.prompt.len(),
            "Requesting bot reply"
        );

        let response = self.provider.complete(request).await.map_err(|e| {
            warn!(session = %self.id, error = %e, "Completion failed");
            e
        })?;

        self.conversation
            .push(Message::new(&self.persona.bot_name, response.text.trim()));
        Ok(Outcome::Changed)
    }

    /// Whether the conversation ends in a bot turn that is not the greeting.
    pub fn has_reply(&self) -> bool {
        self.conversation.len() >= 2
            && self
                .conversation
                .last()
                .is_some_and(|m| m.is_from(&self.persona.bot_name))
    }

    /// Replace the last bot reply with a freshly generated one.
    ///
    /// Requires a bot turn after the greeting at the end of the
    /// conversation. On completion failure the previous reply is restored.
    pub async fn regenerate_last(&mut self) -> Result<Outcome> {
        if !self.has_reply() {
            return Err(SessionError::NothingToRegenerate.into());
        }

        let previous = self.conversation.pop();
        if let Err(e) = self.generate_reply().await {
            if let Some(previous) = previous {
                self.conversation.push(previous);
            }
            return Err(e);
        }
        Ok(Outcome::Changed)
    }

    /// Switch the model used for subsequent replies.
    pub fn set_model(&mut self, model: impl Into<String>) -> Outcome {
        let model = model.into();
        if model == self.model {
            return Outcome::Unchanged;
        }
        info!(session = %self.id, from = %self.model, to = %model, "Model changed");
        self.model = model;
        Outcome::Changed
    }

    /// Snapshot of the current chat for the feedback log.
    pub fn log_chat(&self, class: FeedbackClass) -> Vec<FeedbackRecord> {
        vec![FeedbackRecord {
            examples: self.persona.examples.clone(),
            background: self.persona.background.clone(),
            chat: self.conversation.to_transcript(),
            class,
            model: Some(self.model.clone()),
            recorded_at: Utc::now(),
        }]
    }

    /// Append a snapshot with the given rating to the feedback log.
    ///
    /// Ratings need a bot reply after the greeting; saving the conversation
    /// (`FeedbackClass::Conversation`) is always allowed.
    pub async fn record_feedback(&self, class: FeedbackClass) -> Result<Outcome> {
        if class != FeedbackClass::Conversation && !self.has_reply() {
            return Err(SessionError::NothingToRate.into());
        }
        self.log.add_completion(self.log_chat(class)).await?;
        debug!(session = %self.id, class = %class, log = self.log.name(), "Feedback recorded");
        Ok(Outcome::Unchanged)
    }

    /// The feedback log this session writes to.
    pub fn feedback_log(&self) -> &Arc<dyn FeedbackLog> {
        &self.log
    }
}
