use std::collections::BTreeMap;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::article::parts_of_speech::PartOfSpeech;

const PLACEHOLDER_PREFIX: &str = "temp-";

/// Opaque article identifier, assigned by the store on creation.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    From,
)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Store-side id for a freshly inserted document.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Client-side id for a record that has not reached the server yet.
    pub fn placeholder() -> Self {
        Self(format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4().simple()))
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArticleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Draft,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Meaning {
    pub meaning: String,
    #[serde(default)]
    pub examples: String,
}

/// Russian text next to its Hindi counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bilingual {
    #[serde(default)]
    pub rus: String,
    #[serde(default)]
    pub hin: String,
}

/// Grammatical flags, property key -> value key -> set.
pub type Properties = BTreeMap<String, BTreeMap<String, bool>>;

/// Article body without an id: the add payload and the stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    pub word: String,
    #[serde(default)]
    pub transliteration: String,
    #[serde(default)]
    pub spellings: Vec<String>,
    pub part_of_speech: PartOfSpeech,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_from: Option<String>,
    #[serde(default)]
    pub control: Bilingual,
    #[serde(default)]
    pub stable_phrases: Bilingual,
    #[serde(default)]
    pub examples: Bilingual,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl NewArticle {
    pub fn new(word: impl Into<String>, part_of_speech: PartOfSpeech) -> Self {
        Self {
            word: word.into(),
            transliteration: String::new(),
            spellings: Vec::new(),
            part_of_speech,
            meanings: Vec::new(),
            properties: Properties::new(),
            taken_from: None,
            control: Bilingual::default(),
            stable_phrases: Bilingual::default(),
            examples: Bilingual::default(),
            status: Status::Draft,
            author: None,
            approved: None,
        }
    }

    pub fn with_id(self, id: ArticleId) -> Article {
        Article { id, entry: self }
    }

    pub fn is_approved(&self) -> bool {
        self.approved.unwrap_or(false)
    }

    /// Strip surrounding whitespace from the headword.
    pub fn normalize(&mut self) {
        let trimmed = self.word.trim();
        if trimmed.len() != self.word.len() {
            self.word = trimmed.to_string();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    #[serde(flatten)]
    pub entry: NewArticle,
}

impl Article {
    pub fn word(&self) -> &str {
        &self.entry.word
    }

    /// Apply an update in place, leaving the id untouched.
    pub fn apply(&mut self, patch: &PartialArticle) {
        patch.apply_to(&mut self.entry);
    }
}

/// Update payload: an id plus any subset of the article fields.
///
/// Present fields replace the stored value wholesale. `author` is never part
/// of the payload, it is stamped from the verified identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartialArticle {
    pub id: ArticleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spellings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<PartOfSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meanings: Option<Vec<Meaning>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<Bilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable_phrases: Option<Bilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Bilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl PartialArticle {
    pub fn new(id: ArticleId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Strip surrounding whitespace from the headword, if the patch has one.
    pub fn normalize(&mut self) {
        if let Some(word) = &mut self.word {
            *word = word.trim().to_string();
        }
    }

    pub fn apply_to(&self, entry: &mut NewArticle) {
        if let Some(word) = &self.word {
            entry.word.clone_from(word);
        }
        if let Some(transliteration) = &self.transliteration {
            entry.transliteration.clone_from(transliteration);
        }
        if let Some(spellings) = &self.spellings {
            entry.spellings.clone_from(spellings);
        }
        if let Some(part_of_speech) = self.part_of_speech {
            entry.part_of_speech = part_of_speech;
        }
        if let Some(meanings) = &self.meanings {
            entry.meanings.clone_from(meanings);
        }
        if let Some(properties) = &self.properties {
            entry.properties.clone_from(properties);
        }
        if let Some(taken_from) = &self.taken_from {
            entry.taken_from = Some(taken_from.clone());
        }
        if let Some(control) = &self.control {
            entry.control.clone_from(control);
        }
        if let Some(stable_phrases) = &self.stable_phrases {
            entry.stable_phrases.clone_from(stable_phrases);
        }
        if let Some(examples) = &self.examples {
            entry.examples.clone_from(examples);
        }
        if let Some(approved) = self.approved {
            entry.approved = Some(approved);
        }
    }
}

/// Stored user flags, keyed by email in the `users` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub moderator: bool,
}

impl UserRecord {
    pub fn can_approve(&self) -> bool {
        self.admin || self.moderator
    }
}
