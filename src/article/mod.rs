pub mod parts_of_speech;
pub mod types;
pub mod validation;

pub use parts_of_speech::PartOfSpeech;
pub use types::{
    Article, ArticleId, Bilingual, Meaning, NewArticle, PartialArticle, Status, UserRecord,
};
pub use validation::ValidationError;
