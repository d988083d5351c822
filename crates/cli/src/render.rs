//! Chat bubble rendering.
//!
//! Bot turns hang on the left, user turns are indented to the right. The
//! rating/regenerate hint only appears under the latest exchange.

use parley_core::{Conversation, Message};

const WRAP_WIDTH: usize = 56;
const BOT_INDENT: &str = "  ";
const USER_INDENT: &str = "                ";
const CONTROLS_HINT: &str = "/sad  /okay  /happy  ·  /regen";

/// Render the whole conversation as chat bubbles.
pub fn render_transcript(bot_name: &str, conversation: &Conversation) -> String {
    let mut out = String::new();
    for message in conversation {
        push_bubble(&mut out, message, bot_name);
    }

    let has_exchange = conversation.len() >= 3
        && conversation.last().is_some_and(|m| m.is_from(bot_name));
    if has_exchange {
        out.push_str(BOT_INDENT);
        out.push_str("   ");
        out.push_str(CONTROLS_HINT);
        out.push('\n');
    }
    out
}

fn push_bubble(out: &mut String, message: &Message, bot_name: &str) {
    let indent = if message.is_from(bot_name) { BOT_INDENT } else { USER_INDENT };

    out.push_str(&format!("{indent}╭─ {}\n", message.speaker));
    for line in wrap(&message.text, WRAP_WIDTH) {
        out.push_str(&format!("{indent}│ {line}\n"));
    }
    out.push_str(&format!("{indent}╰─\n"));
}

/// Greedy word wrap on whitespace. Words longer than `width` get their own line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
