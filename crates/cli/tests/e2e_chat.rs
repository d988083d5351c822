//! End-to-end tests for the Parley chat pipeline.
//!
//! These tests drive a `ChatSession` the way the terminal UI does, from the
//! demo lookup through prompt assembly to the feedback log, with a scripted
//! completion service in place of the network.

use std::sync::{Arc, Mutex};

use parley_config::AppConfig;
use parley_core::completion::{
    CompletionProvider, CompletionRequest, CompletionResponse, SamplingConfig,
};
use parley_core::error::{CompletionError, SessionError};
use parley_core::persona::SHOE_LA_LA;
use parley_core::{ChatSession, Error, FeedbackClass, FeedbackLog, Persona, ProfileTable};
use parley_feedback::{InMemoryLog, JsonlLog};

// ── Mock Provider ────────────────────────────────────────────────────────

/// Returns scripted replies in sequence and remembers every request.
struct ScriptedProvider {
    replies: Mutex<Vec<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<String, CompletionError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn texts(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .expect("ScriptedProvider exhausted");
        next.map(|text| CompletionResponse {
            text,
            model: request.model,
            finish_reason: None,
        })
    }
}

fn start(
    persona: Persona,
    provider: Arc<ScriptedProvider>,
    log: Arc<dyn FeedbackLog>,
) -> ChatSession {
    let sampling = SamplingConfig::for_persona(&persona);
    ChatSession::start(persona, "j1-jumbo", sampling, provider, log)
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn generic_persona_first_exchange() {
    let provider = ScriptedProvider::texts(&[" We have sneakers and boots. "]);
    let mut session = start(
        ProfileTable::builtin().persona("no_such_demo"),
        provider.clone(),
        Arc::new(InMemoryLog::new()),
    );

    session.append_user("What shoes do you have?").await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].prompt,
        "Bot is a helpful friendly chatbot\
         Bot: Hi, I'm Bot\nUser: What shoes do you have?\nBot:"
    );
    assert_eq!(requests[0].config.stop_sequences, vec!["Bot:", "User:", "##"]);
    assert_eq!(requests[0].config.max_tokens, 50);

    assert_eq!(
        session.conversation().to_transcript(),
        "Bot: Hi, I'm Bot\nUser: What shoes do you have?\nBot: We have sneakers and boots."
    );
}

#[tokio::test]
async fn shoe_demo_prompt_starts_with_examples_and_background() {
    let config = AppConfig::default();
    let persona = config.profile_table().persona(SHOE_LA_LA);
    let provider = ScriptedProvider::texts(&["Boots start at $79."]);
    let mut session = ChatSession::start(
        persona.clone(),
        config.default_model.clone(),
        config.sampling_for(&persona),
        provider.clone(),
        Arc::new(InMemoryLog::new()),
    );

    session.append_user("How much are boots?").await.unwrap();

    let request = &provider.requests()[0];
    let expected_head = format!("{}{}", persona.examples, persona.background);
    assert!(request.prompt.starts_with(&expected_head));
    assert!(request.prompt.ends_with("\nCustomer: How much are boots?\nLala:"));
    assert_eq!(request.model, "j1-jumbo");
    assert_eq!(
        request.config.stop_sequences,
        vec!["Lala:", "Customer:", "##"]
    );
    assert_eq!(session.message_text(2), Some("Boots start at $79."));
}

#[tokio::test]
async fn regenerate_and_reset_cycle() {
    let provider = ScriptedProvider::texts(&["first", "second", "third"]);
    let mut session = start(Persona::generic(), provider.clone(), Arc::new(InMemoryLog::new()));

    session.append_user("hello").await.unwrap();
    session.regenerate_last().await.unwrap();
    assert_eq!(session.conversation().len(), 3);
    assert_eq!(session.message_text(2), Some("second"));

    // The regenerated prompt is the one that produced the replaced reply.
    let requests = provider.requests();
    assert_eq!(requests[0].prompt, requests[1].prompt);

    session.reset();
    assert_eq!(session.conversation().len(), 1);
    assert_eq!(session.message_text(0), Some("Hi, I'm Bot"));

    session.append_user("again").await.unwrap();
    assert_eq!(session.conversation().len(), 3);
    assert_eq!(session.message_text(2), Some("third"));
}

#[tokio::test]
async fn greeting_only_conversation_cannot_be_regenerated() {
    let provider = ScriptedProvider::texts(&[]);
    let mut session = start(Persona::generic(), provider.clone(), Arc::new(InMemoryLog::new()));

    let err = session.regenerate_last().await.unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::NothingToRegenerate)));
    assert_eq!(session.conversation().len(), 1);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn failed_completion_leaves_conversation_untouched() {
    let provider = ScriptedProvider::new(vec![
        Ok("fine".into()),
        Err(CompletionError::RateLimited),
        Err(CompletionError::Network("connection reset".into())),
    ]);
    let mut session = start(Persona::generic(), provider, Arc::new(InMemoryLog::new()));

    session.append_user("one").await.unwrap();
    let before = session.conversation().to_transcript();

    let err = session.append_user("two").await.unwrap_err();
    assert!(matches!(err, Error::Completion(CompletionError::RateLimited)));
    assert_eq!(session.conversation().to_transcript(), before);

    let err = session.regenerate_last().await.unwrap_err();
    assert!(matches!(err, Error::Completion(CompletionError::Network(_))));
    assert_eq!(session.conversation().to_transcript(), before);
}

#[tokio::test]
async fn feedback_lands_in_jsonl_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feedback.jsonl");

    let provider = ScriptedProvider::texts(&["We have sneakers and boots."]);
    let persona = ProfileTable::builtin().persona(SHOE_LA_LA);
    let mut session = start(persona.clone(), provider, Arc::new(JsonlLog::new(path.clone())));

    session.append_user("What shoes do you have?").await.unwrap();
    session.record_feedback(FeedbackClass::Happy).await.unwrap();
    session.record_feedback(FeedbackClass::Conversation).await.unwrap();

    let reopened = JsonlLog::new(path);
    let records = reopened.records().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].class, FeedbackClass::Happy);
    assert_eq!(records[1].class, FeedbackClass::Conversation);
    assert_eq!(records[0].examples, persona.examples);
    assert_eq!(records[0].background, persona.background);
    assert!(records[0].chat.ends_with("Lala: We have sneakers and boots."));
    assert_eq!(records[0].model.as_deref(), Some("j1-jumbo"));

    let table = reopened.display().await.unwrap();
    assert!(table.contains("happy"));
    assert!(table.contains("conversation"));
}

#[tokio::test]
async fn rating_requires_a_reply_but_saving_does_not() {
    let log = Arc::new(InMemoryLog::new());
    let mut session = start(Persona::generic(), ScriptedProvider::texts(&[]), log.clone());

    let err = session.record_feedback(FeedbackClass::Sad).await.unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::NothingToRate)));

    session.record_feedback(FeedbackClass::Conversation).await.unwrap();
    let records = log.records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].chat, "Bot: Hi, I'm Bot");

    // A model switch applies to the next request and shows up in new records.
    session.set_model("j1-large");
    session.record_feedback(FeedbackClass::Conversation).await.unwrap();
    let records = log.records().await.unwrap();
    assert_eq!(records[1].model.as_deref(), Some("j1-large"));
}
