//! Personas and the demo profile table.
//!
//! A persona fixes who is talking (bot and user names) and the static text
//! that steers the completion model (background and few-shot examples). It
//! is chosen once per session from a demo profile and never changes while
//! the session lives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the built-in shoe-store support demo.
pub const SHOE_LA_LA: &str = "shoe_la_la";

pub const DEFAULT_BOT_NAME: &str = "Bot";
pub const DEFAULT_USER_NAME: &str = "User";
pub const DEFAULT_BACKGROUND: &str = "Bot is a helpful friendly chatbot";

/// The session-scoped chat persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub bot_name: String,
    pub user_name: String,
    pub greeting: String,
    pub background: String,
    pub examples: String,
}

impl Persona {
    /// Generic persona used when a demo key is unknown.
    pub fn generic() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.into(),
            user_name: DEFAULT_USER_NAME.into(),
            greeting: format!("Hi, I'm {DEFAULT_BOT_NAME}"),
            background: DEFAULT_BACKGROUND.into(),
            examples: String::new(),
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::generic()
    }
}

impl From<&DemoProfile> for Persona {
    fn from(profile: &DemoProfile) -> Self {
        let [bot_name, user_name] = profile.participants.clone();
        Self {
            bot_name,
            user_name,
            greeting: profile.greeting.clone(),
            background: profile.background.clone(),
            examples: profile.examples.clone(),
        }
    }
}

/// One entry of the demo table, as written in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoProfile {
    /// `[bot_name, user_name]`
    pub participants: [String; 2],
    pub greeting: String,
    pub background: String,
    #[serde(default)]
    pub examples: String,
}

/// Demo profiles keyed by demo name.
#[derive(Debug, Clone, Default)]
pub struct ProfileTable {
    profiles: BTreeMap<String, DemoProfile>,
}

impl ProfileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped with the binary.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(SHOE_LA_LA, shoe_la_la());
        table
    }

    pub fn insert(&mut self, key: impl Into<String>, profile: DemoProfile) {
        self.profiles.insert(key.into(), profile);
    }

    /// Merge `other` into this table; entries in `other` win.
    pub fn merge(&mut self, other: impl IntoIterator<Item = (String, DemoProfile)>) {
        self.profiles.extend(other);
    }

    pub fn get(&self, key: &str) -> Option<&DemoProfile> {
        self.profiles.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.profiles.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DemoProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve a demo key into a persona, falling back to the generic one.
    pub fn persona(&self, key: &str) -> Persona {
        match self.get(key) {
            Some(profile) => {
                tracing::debug!(demo = key, bot = %profile.participants[0], "Loaded demo persona");
                Persona::from(profile)
            }
            None => {
                tracing::warn!(demo = key, "Unknown demo, using the generic persona");
                Persona::generic()
            }
        }
    }
}

fn shoe_la_la() -> DemoProfile {
    DemoProfile {
        participants: ["Lala".into(), "Customer".into()],
        greeting: "Hi, I'm Lala from Shoe La La! How can I help you find your next pair?".into(),
        background: "\
The following is a conversation between Lala, the support chatbot of the Shoe La La online \
shoe store, and a customer. Shoe La La sells sneakers, boots, sandals and dress shoes for \
women, men and kids. Shipping is free on orders over $50 and returns are accepted within \
30 days. Lala is friendly, upbeat and answers in one or two sentences.\n\n"
            .into(),
        examples: "\
Customer: Do you have running shoes?
Lala: We sure do! Our running line starts at $59 and comes in sizes 5 to 14.
Customer: How long does delivery take?
Lala: Standard delivery takes 3-5 business days, and express gets to you in 1-2.
##
Customer: Can I return boots I already wore outside?
Lala: I'm sorry, we can only accept returns of unworn shoes in their original box.
Customer: Okay, thanks anyway.
Lala: Happy to help! Anything else I can do for you?
##
"
        .into(),
    }
}
