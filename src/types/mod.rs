//! Public types for the Wanderlore API.

mod budget;
mod content;
mod key;
mod settings;

pub use budget::{BudgetStatus, RequestLimits};
pub use content::{
    ContentItem, ContentPayload, ContentType, CulturalInsight, Quiz, QuizQuestion, Recommendation,
};
pub use key::{ContentKey, UNKNOWN_REGION};
pub use settings::SettingsDocument;

pub(crate) use key::collapse_whitespace;
