use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Locale used when a text has no translation for the requested one.
pub const FALLBACK_LOCALE: &str = "en";

/// A text field translated into several locales.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations(BTreeMap<String, String>);

#[cfg(test)]
impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locale: &str, text: &str) -> Self {
        self.0.insert(locale.to_string(), text.to_string());
        self
    }
}

impl Translations {
    /// Requested locale, then English, then whichever translation sorts first.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0
            .get(locale)
            .or_else(|| self.0.get(FALLBACK_LOCALE))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|text| text.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub id: i64,
    pub name: Translations,
    pub address: Translations,
    pub description: Translations,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Branch {
    /// Applies the fields present in `changes`.
    pub fn apply(&mut self, changes: BranchChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(address) = changes.address {
            self.address = address;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
    }
}

/// Payload for creating a branch.
#[derive(Clone, Debug, Deserialize)]
pub struct NewBranch {
    #[serde(default)]
    pub name: Translations,
    #[serde(default)]
    pub address: Translations,
    #[serde(default)]
    pub description: Translations,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Partial update; absent fields keep their current value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BranchChanges {
    pub name: Option<Translations>,
    pub address: Option<Translations>,
    pub description: Option<Translations>,
    pub is_active: Option<bool>,
}
