//! Strict validation of model output into typed payloads.
//!
//! [`validate`] either returns a fully typed [`ContentPayload`] or an
//! [`InvalidResponse`](WanderloreError::InvalidResponse) naming the first
//! field that could not be used. Required fields are never invented.
//! Optional fields that are missing, empty or mis-shaped are replaced by
//! the templates in [`fallback`](super::fallback) and reported in
//! [`Validated::repaired`].
//!
//! | Type             | Required                                  | Repaired                          |
//! |------------------|-------------------------------------------|-----------------------------------|
//! | cultural insight | `region`, `customs[]`, `etiquette`, `diningTips` | `restaurants`, `bars`, `localTips` |
//! | quiz             | `title`, `description`, `questions[]` (≥ 1 valid) | per-question `explanation`, invalid questions dropped |

use serde_json::{Map, Value};

use super::fallback;
use crate::types::{
    ContentPayload, ContentType, CulturalInsight, Quiz, QuizQuestion, Recommendation,
};
use crate::{Result, WanderloreError};

/// A validated payload plus the optional fields that had to be repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub payload: ContentPayload,
    pub repaired: Vec<&'static str>,
}

/// Validate `value` as a payload of `content_type` about `topic`.
pub fn validate(content_type: ContentType, topic: &str, value: &Value) -> Result<Validated> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid("$", "expected a JSON object"))?;
    let mut repaired = Vec::new();
    let payload = match content_type {
        ContentType::CulturalInsight => {
            ContentPayload::CulturalInsight(cultural_insight(obj, topic, &mut repaired)?)
        }
        ContentType::Quiz => ContentPayload::Quiz(quiz(obj, topic, &mut repaired)?),
    };
    Ok(Validated { payload, repaired })
}

fn cultural_insight(
    obj: &Map<String, Value>,
    topic: &str,
    repaired: &mut Vec<&'static str>,
) -> Result<CulturalInsight> {
    let customs = string_list(obj.get("customs"))
        .filter(|c| !c.is_empty())
        .ok_or_else(|| invalid("customs", "expected a non-empty array of strings"))?;

    let restaurants = recommendations(obj.get("restaurants")).unwrap_or_else(|| {
        repaired.push("restaurants");
        fallback::restaurants(topic)
    });
    let bars = recommendations(obj.get("bars")).unwrap_or_else(|| {
        repaired.push("bars");
        fallback::bars(topic)
    });
    let local_tips = string_list(obj.get("localTips"))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            repaired.push("localTips");
            fallback::local_tips(topic)
        });

    Ok(CulturalInsight {
        region: required_text(obj, "region")?,
        customs,
        etiquette: required_text(obj, "etiquette")?,
        dining_tips: required_text(obj, "diningTips")?,
        restaurants,
        bars,
        local_tips,
    })
}

fn quiz(obj: &Map<String, Value>, topic: &str, repaired: &mut Vec<&'static str>) -> Result<Quiz> {
    let title = required_text(obj, "title")?;
    let description = required_text(obj, "description")?;
    let raw_questions = obj
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("questions", "expected an array"))?;

    let mut questions = Vec::with_capacity(raw_questions.len());
    let mut explanation_filled = false;
    for raw in raw_questions {
        let Some((question, filled)) = quiz_question(raw, topic) else {
            continue;
        };
        explanation_filled |= filled;
        questions.push(question);
    }

    if questions.is_empty() {
        return Err(invalid("questions", "no valid questions"));
    }
    if questions.len() < raw_questions.len() {
        repaired.push("questions");
    }
    if explanation_filled {
        repaired.push("explanation");
    }

    Ok(Quiz {
        title,
        description,
        questions,
    })
}

/// A question and whether its explanation was filled in.
fn quiz_question(raw: &Value, topic: &str) -> Option<(QuizQuestion, bool)> {
    let obj = raw.as_object()?;
    let question = text(obj.get("question"))?;
    // Positions matter: `correctAnswerIndex` points into this array.
    let options: [String; 4] = obj
        .get("options")?
        .as_array()?
        .iter()
        .map(|option| text(Some(option)))
        .collect::<Option<Vec<_>>>()?
        .try_into()
        .ok()?;
    let correct_answer_index = obj
        .get("correctAnswerIndex")
        .and_then(Value::as_u64)
        .filter(|i| *i < 4)
        .and_then(|i| u8::try_from(i).ok())?;

    let (explanation, filled) = match text(obj.get("explanation")) {
        Some(explanation) => (explanation, false),
        None => (
            fallback::explanation(topic, &options[usize::from(correct_answer_index)]),
            true,
        ),
    };

    Some((
        QuizQuestion {
            question,
            options,
            correct_answer_index,
            explanation,
        },
        filled,
    ))
}

/// Re-check a typed payload read back from storage.
///
/// Serde guarantees the shape; this enforces what [`validate`] would have
/// required of the same content: non-blank text, non-empty lists, at least
/// one question and an in-range answer index.
pub fn check(payload: &ContentPayload) -> Result<()> {
    match payload {
        ContentPayload::CulturalInsight(insight) => {
            non_blank("region", &insight.region)?;
            non_blank("etiquette", &insight.etiquette)?;
            non_blank("diningTips", &insight.dining_tips)?;
            if insight.customs.is_empty() || insight.customs.iter().any(|c| c.trim().is_empty()) {
                return Err(invalid("customs", "expected a non-empty array of strings"));
            }
        }
        ContentPayload::Quiz(quiz) => {
            non_blank("title", &quiz.title)?;
            non_blank("description", &quiz.description)?;
            if quiz.questions.is_empty() {
                return Err(invalid("questions", "no valid questions"));
            }
            for question in &quiz.questions {
                non_blank("question", &question.question)?;
                non_blank("explanation", &question.explanation)?;
                if question.options.iter().any(|o| o.trim().is_empty()) {
                    return Err(invalid("options", "expected four non-empty strings"));
                }
                if question.correct_answer_index > 3 {
                    return Err(invalid("correctAnswerIndex", "expected 0 to 3"));
                }
            }
        }
    }
    Ok(())
}

fn non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, "expected a non-empty string"));
    }
    Ok(())
}

fn required_text(obj: &Map<String, Value>, field: &str) -> Result<String> {
    text(obj.get(field)).ok_or_else(|| invalid(field, "expected a non-empty string"))
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// An array of strings. Blank entries are dropped; any non-string entry
/// rejects the whole array. Not for positional lists.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::trim))
        .filter(|s| s.is_none_or(|s| !s.is_empty()))
        .map(|s| s.map(str::to_string))
        .collect()
}

/// Recommendations given as objects (`{name, description}`) or bare names.
/// `None` when absent, empty or mis-shaped.
fn recommendations(value: Option<&Value>) -> Option<Vec<Recommendation>> {
    let list = value?
        .as_array()?
        .iter()
        .map(|entry| match entry {
            Value::String(name) => text(Some(entry)).map(|_| Recommendation {
                name: name.trim().to_string(),
                description: String::new(),
            }),
            Value::Object(obj) => Some(Recommendation {
                name: text(obj.get("name"))?,
                description: text(obj.get("description")).unwrap_or_default(),
            }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    (!list.is_empty()).then_some(list)
}

fn invalid(field: &str, reason: &str) -> WanderloreError {
    WanderloreError::InvalidResponse {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
