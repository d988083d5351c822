//! Terminal input → UI events.
//!
//! Plain text is a chat message and is sent as typed; a leading `/` selects
//! one of the chat controls (feedback, regenerate, reset, save, model
//! selector). A leading `\` sends the rest of the line literally, so
//! `\exit` or `\/reset` reach the bot as text.

use parley_core::FeedbackClass;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Submit(String),
    Feedback(FeedbackClass),
    Regenerate,
    Reset,
    /// `None` lists the models, `Some` selects one.
    Model(Option<String>),
    ShowLog,
    Help,
    Quit,
    Unknown(String),
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<UiEvent> {
    let raw = line.trim_end_matches(['\r', '\n']);
    if raw.trim().is_empty() {
        return None;
    }

    if let Some(literal) = raw.strip_prefix('\\') {
        return Some(UiEvent::Submit(literal.to_string()));
    }

    let line = raw.trim();
    if matches!(line, "exit" | "quit" | ":q") {
        return Some(UiEvent::Quit);
    }

    let Some(command) = line.strip_prefix('/') else {
        return Some(UiEvent::Submit(raw.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim().to_string())),
        None => (command, None),
    };

    let event = match name.to_ascii_lowercase().as_str() {
        "sad" => UiEvent::Feedback(FeedbackClass::Sad),
        "okay" | "ok" => UiEvent::Feedback(FeedbackClass::Okay),
        "happy" => UiEvent::Feedback(FeedbackClass::Happy),
        "save" => UiEvent::Feedback(FeedbackClass::Conversation),
        "regen" | "regenerate" => UiEvent::Regenerate,
        "reset" => UiEvent::Reset,
        "model" => UiEvent::Model(arg.filter(|a| !a.is_empty())),
        "log" => UiEvent::ShowLog,
        "help" | "?" => UiEvent::Help,
        "quit" | "exit" => UiEvent::Quit,
        _ => UiEvent::Unknown(line.to_string()),
    };
    Some(event)
}

pub const HELP: &str = "\
  /sad /okay /happy   rate the latest reply
  /regen              regenerate the latest reply
  /reset              start the conversation over
  /save               save the whole conversation to the feedback log
  /model [ID]         list models, or switch to ID
  /log                show the feedback log
  /quit               leave (also: exit, quit, :q, Ctrl+D)
  \\TEXT               send TEXT as typed, e.g. \\exit or \\/reset";
