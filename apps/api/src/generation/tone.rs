//! Tone catalog — the built-in blog tones plus custom tones each user adds.
//!
//! Custom tones live for the lifetime of the process and are keyed by user name,
//! so they survive logout but not a restart.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;

/// Form value the select page sends when the user typed a free-text tone.
pub const CUSTOM_TONE_SENTINEL: &str = "custom";

const BUILT_IN_TONES: &[(&str, &str)] = &[
    (
        "Professional",
        "Formal and business-like tone suitable for corporate audiences",
    ),
    (
        "Conversational",
        "Casual and engaging tone that feels like a friendly discussion",
    ),
    (
        "Authoritative",
        "Strong and confident tone that establishes expertise",
    ),
    (
        "Friendly",
        "Warm and approachable tone that builds rapport with readers",
    ),
    (
        "Technical",
        "Detailed and precise tone focused on accuracy and technical details",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToneOption {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct ToneCatalog {
    custom: RwLock<HashMap<String, Vec<ToneOption>>>,
}

impl ToneCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in tones followed by the user's custom tones, in insertion order.
    pub async fn options_for(&self, username: &str) -> Vec<ToneOption> {
        let mut options: Vec<ToneOption> = BUILT_IN_TONES
            .iter()
            .map(|(name, description)| ToneOption {
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect();

        if let Some(custom) = self.custom.read().await.get(username) {
            options.extend(custom.iter().cloned());
        }
        options
    }

    /// Adds a custom tone for `username`. Returns false when either field is
    /// blank or the name is already taken (built-in or custom).
    pub async fn add_custom(&self, username: &str, name: &str, description: &str) -> bool {
        let name = name.trim();
        let description = description.trim();
        if name.is_empty() || description.is_empty() {
            return false;
        }
        if BUILT_IN_TONES.iter().any(|(n, _)| *n == name) {
            return false;
        }

        let mut custom = self.custom.write().await;
        let tones = custom.entry(username.to_string()).or_default();
        if tones.iter().any(|t| t.name == name) {
            return false;
        }
        tones.push(ToneOption {
            name: name.to_string(),
            description: description.to_string(),
        });
        true
    }
}

/// Picks the tone to send to the model: the free-text tone when the user chose
/// "custom" and typed one, otherwise the selected tone as-is.
pub fn resolve_tone(selected: &str, custom_tone: Option<&str>) -> String {
    let custom = custom_tone.map(str::trim).unwrap_or_default();
    if selected == CUSTOM_TONE_SENTINEL && !custom.is_empty() {
        custom.to_string()
    } else {
        selected.trim().to_string()
    }
}
