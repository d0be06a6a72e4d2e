//! Prompt text per content type.

use crate::types::ContentType;

/// Number of questions requested per quiz.
pub const QUIZ_QUESTIONS: usize = 5;

/// Build the prompt for `topic`.
pub fn build(content_type: ContentType, topic: &str) -> String {
    match content_type {
        ContentType::CulturalInsight => format!(
            "You are a travel guide. Describe the local culture of {topic} for a visitor.\n\
             Respond with a single JSON object with these fields:\n\
             - \"region\": string, the region name\n\
             - \"customs\": array of short strings, notable local customs\n\
             - \"etiquette\": string, etiquette advice\n\
             - \"diningTips\": string, advice on eating out\n\
             - \"restaurants\": array of {{\"name\", \"description\"}}\n\
             - \"bars\": array of {{\"name\", \"description\"}}\n\
             - \"localTips\": array of short strings\n\
             Respond with JSON only."
        ),
        ContentType::Quiz => format!(
            "Write a travel trivia quiz about {topic} with {QUIZ_QUESTIONS} questions.\n\
             Respond with a single JSON object with these fields:\n\
             - \"title\": string\n\
             - \"description\": string\n\
             - \"questions\": array of objects with \"question\" (string), \
             \"options\" (exactly 4 strings), \"correctAnswerIndex\" (0-3) \
             and \"explanation\" (string)\n\
             Respond with JSON only."
        ),
    }
}
