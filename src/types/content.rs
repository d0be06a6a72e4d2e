//! Cached content: cultural insights and quizzes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContentKey;

/// The kinds of generated content the cache serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Customs, etiquette, dining and local tips for a region.
    CulturalInsight,
    /// A multiple-choice quiz about a region.
    Quiz,
}

impl ContentType {
    /// All content types, in a stable order.
    pub const ALL: [ContentType; 2] = [ContentType::CulturalInsight, ContentType::Quiz];

    /// Prefix for keys in the local persistent store.
    pub fn storage_prefix(self) -> &'static str {
        match self {
            ContentType::CulturalInsight => "cultural_insights",
            ContentType::Quiz => "quizzes",
        }
    }

    /// Collection name in the remote document store.
    pub fn collection(self) -> &'static str {
        match self {
            ContentType::CulturalInsight => "culturalInsights",
            ContentType::Quiz => "quizzes",
        }
    }

    /// Short label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::CulturalInsight => "cultural_insight",
            ContentType::Quiz => "quiz",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = crate::WanderloreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "cultural_insight" | "cultural_insights" | "insight" | "insights" => {
                Ok(ContentType::CulturalInsight)
            }
            "quiz" | "quizzes" => Ok(ContentType::Quiz),
            other => Err(crate::WanderloreError::InvalidInput(format!(
                "unknown content type: {other}"
            ))),
        }
    }
}

/// A named place suggestion (restaurant, bar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Cultural guidance for a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalInsight {
    pub region: String,
    pub customs: Vec<String>,
    pub etiquette: String,
    pub dining_tips: String,
    #[serde(default)]
    pub restaurants: Vec<Recommendation>,
    #[serde(default)]
    pub bars: Vec<Recommendation>,
    #[serde(default)]
    pub local_tips: Vec<String>,
}

/// A single multiple-choice question. Always exactly four options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: [String; 4],
    pub correct_answer_index: u8,
    pub explanation: String,
}

impl QuizQuestion {
    /// The text of the correct option.
    pub fn correct_answer(&self) -> &str {
        &self.options[usize::from(self.correct_answer_index.min(3))]
    }
}

/// A quiz about a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    pub description: String,
    pub questions: Vec<QuizQuestion>,
}

/// Typed content, one variant per [`ContentType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPayload {
    CulturalInsight(CulturalInsight),
    Quiz(Quiz),
}

impl ContentPayload {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentPayload::CulturalInsight(_) => ContentType::CulturalInsight,
            ContentPayload::Quiz(_) => ContentType::Quiz,
        }
    }

    pub fn as_cultural_insight(&self) -> Option<&CulturalInsight> {
        match self {
            ContentPayload::CulturalInsight(insight) => Some(insight),
            _ => None,
        }
    }

    pub fn as_quiz(&self) -> Option<&Quiz> {
        match self {
            ContentPayload::Quiz(quiz) => Some(quiz),
            _ => None,
        }
    }
}

/// A cached piece of generated content.
///
/// Items are handed out behind an `Arc` and never mutated; a newer version
/// is a new item written through every tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Normalized comparison key.
    pub key: String,
    /// Display-cased region name.
    pub display_name: String,
    pub payload: ContentPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Create a fresh item stamped at `now`.
    pub fn new(key: &ContentKey, payload: ContentPayload, now: DateTime<Utc>) -> Self {
        Self {
            key: key.as_str().to_string(),
            display_name: key.display().to_string(),
            payload,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.payload.content_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parses_aliases() {
        assert_eq!(
            "cultural-insight".parse::<ContentType>().unwrap(),
            ContentType::CulturalInsight
        );
        assert_eq!("Quizzes".parse::<ContentType>().unwrap(), ContentType::Quiz);
        assert!("weather".parse::<ContentType>().is_err());
    }

    #[test]
    fn payload_is_tagged() {
        let payload = ContentPayload::Quiz(Quiz {
            title: "t".into(),
            description: "d".into(),
            questions: vec![],
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "quiz");
        assert_eq!(payload.content_type(), ContentType::Quiz);
    }

    #[test]
    fn insight_uses_camel_case_fields() {
        let json = serde_json::json!({
            "region": "Kyoto",
            "customs": ["Bow when greeting"],
            "etiquette": "Quiet on trains",
            "diningTips": "Say itadakimasu"
        });
        let insight: CulturalInsight = serde_json::from_value(json).unwrap();
        assert_eq!(insight.dining_tips, "Say itadakimasu");
        assert!(insight.local_tips.is_empty());
    }

    #[test]
    fn correct_answer_reads_option() {
        let q = QuizQuestion {
            question: "Capital?".into(),
            options: ["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer_index: 2,
            explanation: String::new(),
        };
        assert_eq!(q.correct_answer(), "C");
    }
}
