use thiserror::Error;

use crate::article::types::{NewArticle, PartialArticle, Properties};
use crate::article::parts_of_speech::PartOfSpeech;

pub const MIN_WORD_LENGTH: usize = 2;
pub const MAX_WORD_LENGTH: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Expected to have {field} of length {} or more", MIN_WORD_LENGTH)]
    TooShort { field: &'static str },

    #[error("Expected to have {field} of length {} or less", MAX_WORD_LENGTH)]
    TooLong { field: &'static str },

    #[error("Expected article to have id")]
    MissingId,

    #[error("Property '{property}' is not defined for {part_of_speech}")]
    UnknownProperty {
        part_of_speech: PartOfSpeech,
        property: String,
    },

    #[error("Value '{value}' is not allowed for property '{property}'")]
    UnknownPropertyValue { property: String, value: String },
}

/// Check a headword or search term; length is counted in characters.
pub fn validate_term(field: &'static str, term: &str) -> Result<(), ValidationError> {
    let length = term.chars().count();
    if length < MIN_WORD_LENGTH {
        return Err(ValidationError::TooShort { field });
    }
    if length > MAX_WORD_LENGTH {
        return Err(ValidationError::TooLong { field });
    }
    Ok(())
}

pub fn validate_properties(
    part_of_speech: PartOfSpeech,
    properties: &Properties,
) -> Result<(), ValidationError> {
    for (key, values) in properties {
        let property =
            part_of_speech
                .property(key)
                .ok_or_else(|| ValidationError::UnknownProperty {
                    part_of_speech,
                    property: key.clone(),
                })?;

        if let Some(value) = values.keys().find(|value| property.value(value).is_none()) {
            return Err(ValidationError::UnknownPropertyValue {
                property: key.clone(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Checks the headword as stored; callers normalize it first.
pub fn validate_new_article(article: &NewArticle) -> Result<(), ValidationError> {
    validate_term("word", &article.word)?;
    validate_properties(article.part_of_speech, &article.properties)
}

/// Shape checks that do not need the stored document.
///
/// Properties are checked against the resulting part of speech once the
/// patch has been merged, see [`validate_new_article`].
pub fn validate_partial_article(patch: &PartialArticle) -> Result<(), ValidationError> {
    if patch.id.as_str().trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    if let Some(word) = &patch.word {
        validate_term("word", word)?;
    }
    Ok(())
}
