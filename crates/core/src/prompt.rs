//! Prompt assembly.
//!
//! The prompt is plain concatenation with no separators added:
//! few-shot examples, background, transcript, then the bot label so the
//! model continues as the bot.

use crate::message::Conversation;
use crate::persona::Persona;

/// Build the completion prompt for the bot's next turn.
pub fn build_prompt(persona: &Persona, conversation: &Conversation) -> String {
    let transcript = conversation.to_transcript();
    let mut prompt = String::with_capacity(
        persona.examples.len()
            + persona.background.len()
            + transcript.len()
            + persona.bot_name.len()
            + 2,
    );
    prompt.push_str(&persona.examples);
    prompt.push_str(&persona.background);
    prompt.push_str(&transcript);
    prompt.push('\n');
    prompt.push_str(&persona.bot_name);
    prompt.push(':');
    prompt
}
