use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    #[display("noun")]
    Noun,
    #[display("verb")]
    Verb,
    #[display("compound_verb")]
    CompoundVerb,
    #[display("adjective")]
    Adjective,
    #[display("adverb")]
    Adverb,
    #[display("pronoun")]
    Pronoun,
    #[display("conjunction")]
    Conjunction,
    #[display("interjection")]
    Interjection,
    #[display("postposition")]
    Postposition,
    #[display("particle")]
    Particle,
    #[display("numeral")]
    Numeral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyValue {
    pub key: &'static str,
    pub name: &'static str,
}

/// A grammatical property and the values it may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    pub key: &'static str,
    pub name: &'static str,
    pub values: &'static [PropertyValue],
}

impl PropertyValue {
    const fn new(key: &'static str, name: &'static str) -> Self {
        Self { key, name }
    }
}

impl Property {
    pub fn value(&self, key: &str) -> Option<&PropertyValue> {
        self.values.iter().find(|value| value.key == key)
    }
}

const GENDER: Property = Property {
    key: "gender",
    name: "Род",
    values: &[
        PropertyValue::new("m", "мужской"),
        PropertyValue::new("f", "женский"),
    ],
};

const TRANSITIVITY: Property = Property {
    key: "transitivity",
    name: "Переходность",
    values: &[
        PropertyValue::new("transitive", "переходный"),
        PropertyValue::new("non_transitive", "непереходный"),
    ],
};

const COMPOUND_OF: Property = Property {
    key: "compound_of",
    name: "Состоит из",
    values: &[
        PropertyValue::new("noun_and_verb", "существительного и глагола"),
        PropertyValue::new("adjective_and_verb", "прилагательного и глагола"),
        PropertyValue::new("participle_and_verb", "причастия и глагола"),
    ],
};

const MUTABILITY: Property = Property {
    key: "mutability",
    name: "Изменяемость",
    values: &[
        PropertyValue::new("mutable", "изменяемое"),
        PropertyValue::new("immutable", "неизменяемое"),
    ],
};

const PRONOUN_ORDER: Property = Property {
    key: "order",
    name: "Разряд",
    values: &[
        PropertyValue::new("personal", "личное"),
        PropertyValue::new("demonstrative", "указательное"),
        PropertyValue::new("relative", "относительное"),
        PropertyValue::new("indefinite", "неопределенное"),
        PropertyValue::new("interrogative", "вопросительное"),
    ],
};

const NUMERAL_TYPE: Property = Property {
    key: "type",
    name: "Тип",
    values: &[
        PropertyValue::new("quantitative", "количественное"),
        PropertyValue::new("ordinal", "порядковое"),
        PropertyValue::new("collective", "собирательное"),
    ],
};

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 11] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::CompoundVerb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
        PartOfSpeech::Pronoun,
        PartOfSpeech::Conjunction,
        PartOfSpeech::Interjection,
        PartOfSpeech::Postposition,
        PartOfSpeech::Particle,
        PartOfSpeech::Numeral,
    ];

    /// Russian display label.
    pub fn label(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "существительное",
            PartOfSpeech::Verb => "глагол",
            PartOfSpeech::CompoundVerb => "составной глагол",
            PartOfSpeech::Adjective => "прилагательное",
            PartOfSpeech::Adverb => "наречие",
            PartOfSpeech::Pronoun => "местоимение",
            PartOfSpeech::Conjunction => "союз",
            PartOfSpeech::Interjection => "междометие",
            PartOfSpeech::Postposition => "послелог",
            PartOfSpeech::Particle => "частица",
            PartOfSpeech::Numeral => "числительное",
        }
    }

    pub fn properties(&self) -> &'static [Property] {
        match self {
            PartOfSpeech::Noun => &[GENDER],
            PartOfSpeech::Verb => &[TRANSITIVITY],
            PartOfSpeech::CompoundVerb => &[TRANSITIVITY, COMPOUND_OF],
            PartOfSpeech::Adjective => &[MUTABILITY],
            PartOfSpeech::Pronoun => &[PRONOUN_ORDER, GENDER],
            PartOfSpeech::Numeral => &[NUMERAL_TYPE],
            PartOfSpeech::Adverb
            | PartOfSpeech::Conjunction
            | PartOfSpeech::Interjection
            | PartOfSpeech::Postposition
            | PartOfSpeech::Particle => &[],
        }
    }

    pub fn property(&self, key: &str) -> Option<&'static Property> {
        self.properties().iter().find(|property| property.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_wire_name() {
        for part in PartOfSpeech::ALL {
            let wire = serde_json::to_value(part).unwrap();
            assert_eq!(wire, part.to_string());
        }
    }

    #[test]
    fn test_compound_verb_properties() {
        let part = PartOfSpeech::CompoundVerb;
        assert_eq!(part.properties().len(), 2);
        assert!(part.property("compound_of").unwrap().value("noun_and_verb").is_some());
        assert!(part.property("gender").is_none());
    }

    #[test]
    fn test_pronoun_shares_gender_with_noun() {
        let noun = PartOfSpeech::Noun.property("gender").unwrap();
        let pronoun = PartOfSpeech::Pronoun.property("gender").unwrap();
        assert_eq!(noun, pronoun);
    }

    #[test]
    fn test_particles_have_no_properties() {
        assert!(PartOfSpeech::Particle.properties().is_empty());
        assert_eq!(PartOfSpeech::Particle.label(), "частица");
    }
}
