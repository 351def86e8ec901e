use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Display language for bilingual descriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Self::English),
            "es" | "spanish" | "español" => Some(Self::Spanish),
            _ => None,
        }
    }
}

/// A priority tag attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityRef {
    pub id: i64,
    pub description_en: String,
    pub description_es: String,
}

impl PriorityRef {
    pub fn description(&self, language: Language) -> &str {
        match language {
            Language::English => &self.description_en,
            Language::Spanish => &self.description_es,
        }
    }
}

/// The main user's own priority list, keyed by priority id.
///
/// Project documents may reference priorities by integer index only; those
/// indexes are resolved here.
#[derive(Debug, Clone, Default)]
pub struct PriorityCatalog {
    entries: HashMap<i64, PriorityRef>,
}

impl PriorityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, index: i64) -> Option<&PriorityRef> {
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry's description in `language`, ordered by id.
    pub fn descriptions(&self, language: Language) -> Vec<(i64, &str)> {
        let mut descriptions: Vec<(i64, &str)> = self
            .entries
            .values()
            .map(|p| (p.id, p.description(language)))
            .collect();
        descriptions.sort_by_key(|(id, _)| *id);
        descriptions
    }
}

impl FromIterator<PriorityRef> for PriorityCatalog {
    fn from_iter<I: IntoIterator<Item = PriorityRef>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}
