//! # Parley Core
//!
//! Domain types, traits, and error definitions for the Parley chat demo.
//! This crate has **no I/O** — it defines the conversation model, the
//! prompt contract and the session state machine that the other crates
//! plug into.
//!
//! ## Design Philosophy
//!
//! The two external collaborators (the completion service and the feedback
//! log) are traits here. Implementations live in their own crates, which
//! keeps the session logic testable with scripted stand-ins.

pub mod completion;
pub mod error;
pub mod feedback;
pub mod message;
pub mod persona;
pub mod prompt;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use completion::{
    CompletionProvider, CompletionRequest, CompletionResponse, SamplingConfig, SUPPORTED_MODELS,
};
pub use error::{Error, Result};
pub use feedback::{FeedbackClass, FeedbackLog, FeedbackRecord};
pub use message::{Conversation, Message, messages_to_string, parse_transcript};
pub use persona::{DemoProfile, Persona, ProfileTable};
pub use prompt::build_prompt;
pub use session::{ChatSession, Outcome, SessionId, SessionState};
