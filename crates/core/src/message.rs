//! Message and Conversation domain types.
//!
//! A message maps exactly one speaker label to that speaker's utterance.
//! The textual transcript form produced here (`"{speaker}: {text}"` lines
//! joined with `\n`) is what the completion model sees, so it is a fixed
//! wire format rather than a display choice.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between speaker label and text in the transcript form.
pub const SPEAKER_SEPARATOR: &str = ": ";

/// A single turn: one speaker, one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub speaker: String,
    pub text: String,
}

impl Message {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    /// Whether this message was spoken by `speaker`.
    pub fn is_from(&self, speaker: &str) -> bool {
        self.speaker == speaker
    }

    /// Parse one transcript line back into a message.
    ///
    /// Splits on the first `": "`; lines without it yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        line.split_once(SPEAKER_SEPARATOR)
            .map(|(speaker, text)| Self::new(speaker, text))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SPEAKER_SEPARATOR}{}", self.speaker, self.text)
    }
}

// Serialized as a one-entry map: {"<speaker>": "<text>"}.
impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.speaker, &self.text)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct MessageVisitor;

        impl<'de> Visitor<'de> for MessageVisitor {
            type Value = Message;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with exactly one speaker entry")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Message, A::Error> {
                let (speaker, text): (String, String) = access
                    .next_entry()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;

                if access.next_key::<String>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }

                Ok(Message { speaker, text })
            }
        }

        deserializer.deserialize_map(MessageVisitor)
    }
}

/// Render a sequence of messages as the prompt transcript.
pub fn messages_to_string(messages: &[Message]) -> String {
    messages
        .iter()
        .map(Message::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inverse of [`messages_to_string`]. Lines that carry no speaker are skipped.
pub fn parse_transcript(transcript: &str) -> Vec<Message> {
    transcript.lines().filter_map(Message::parse_line).collect()
}

/// An ordered sequence of messages in turn order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn pop(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// The transcript as sent to the completion model.
    pub fn to_transcript(&self) -> String {
        messages_to_string(&self.messages)
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
