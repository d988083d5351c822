//! Feedback records and the feedback log trait.
//!
//! Each thumbs-up/okay/down click (and "save conversation") produces a
//! snapshot of the persona text and the full chat. The session only ever
//! appends to the log; it never reads records back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FeedbackError;

/// Rating attached to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackClass {
    Sad,
    Okay,
    Happy,
    /// Saved without a rating.
    Conversation,
}

impl FeedbackClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sad => "sad",
            Self::Okay => "okay",
            Self::Happy => "happy",
            Self::Conversation => "conversation",
        }
    }
}

impl fmt::Display for FeedbackClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sad" => Ok(Self::Sad),
            "okay" => Ok(Self::Okay),
            "happy" => Ok(Self::Happy),
            "conversation" => Ok(Self::Conversation),
            other => Err(format!("unknown feedback class: {other}")),
        }
    }
}

/// A snapshot of one chat at the moment feedback was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub examples: String,
    pub background: String,
    /// The full transcript, in prompt form.
    pub chat: String,
    pub class: FeedbackClass,

    /// Model that produced the bot turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub recorded_at: DateTime<Utc>,
}

/// Append-only sink for feedback records.
///
/// Implementations: in-memory (tests, ephemeral sessions), JSON-lines file.
#[async_trait]
pub trait FeedbackLog: Send + Sync {
    /// The backend name (e.g. "memory", "file").
    fn name(&self) -> &str;

    /// Append records in order.
    async fn add_completion(&self, records: Vec<FeedbackRecord>) -> Result<(), FeedbackError>;

    /// All records logged so far, oldest first.
    async fn records(&self) -> Result<Vec<FeedbackRecord>, FeedbackError>;

    /// Render the log as a text table.
    async fn display(&self) -> Result<String, FeedbackError> {
        Ok(render_table(&self.records().await?))
    }
}

const HEADERS: [&str; 4] = ["examples", "background", "chat", "class"];
const WIDTHS: [usize; 4] = [20, 24, 48, 12];

/// Render records as a fixed-width table, one row per record.
pub fn render_table(records: &[FeedbackRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADERS.map(String::from));
    out.push_str(
        &WIDTHS
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');

    if records.is_empty() {
        out.push_str("(no feedback logged)\n");
        return out;
    }

    for record in records {
        push_row(
            &mut out,
            [
                record.examples.clone(),
                record.background.clone(),
                record.chat.clone(),
                record.class.to_string(),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, cells: [String; 4]) {
    let row: Vec<String> = cells
        .iter()
        .zip(WIDTHS)
        .map(|(cell, width)| fit_cell(cell, width))
        .collect();
    out.push_str(row.join(" | ").trim_end());
    out.push('\n');
}

fn fit_cell(cell: &str, width: usize) -> String {
    let flat = cell.replace('\n', "⏎");
    let count = flat.chars().count();
    if count > width {
        let mut truncated: String = flat.chars().take(width - 1).collect();
        truncated.push('…');
        truncated
    } else {
        format!("{flat}{}", " ".repeat(width - count))
    }
}
