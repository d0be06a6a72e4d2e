//! Template content used to fill optional fields the model left out.
//!
//! Every function is deterministic in its inputs; nothing here calls the
//! backend again.

use crate::types::Recommendation;

/// Local tips for `topic`.
pub fn local_tips(topic: &str) -> Vec<String> {
    vec![
        format!("Ask residents of {topic} where they like to eat; the best spots are often unmarked."),
        format!("Learn a few words of the local language before visiting {topic}."),
        format!("Explore {topic} early in the morning to see daily life before the crowds arrive."),
        format!("Check opening hours in {topic} ahead of time, as many places close for local holidays."),
    ]
}

/// Restaurant suggestions for `topic`.
pub fn restaurants(topic: &str) -> Vec<Recommendation> {
    vec![
        Recommendation {
            name: format!("Traditional kitchens of {topic}"),
            description: format!("Family-run places serving the regional dishes {topic} is known for."),
        },
        Recommendation {
            name: format!("{topic} market stalls"),
            description: format!("Street food and fresh produce from the markets of {topic}."),
        },
    ]
}

/// Bar suggestions for `topic`.
pub fn bars(topic: &str) -> Vec<Recommendation> {
    vec![
        Recommendation {
            name: format!("Neighbourhood bars of {topic}"),
            description: format!("Small local bars where people in {topic} meet after work."),
        },
        Recommendation {
            name: format!("{topic} evening spots"),
            description: format!("Places to try regional drinks as the evening starts in {topic}."),
        },
    ]
}

/// Explanation for a quiz answer about `topic`.
pub fn explanation(topic: &str, correct_answer: &str) -> String {
    format!("The correct answer is \"{correct_answer}\". It reflects a well-known fact about {topic}.")
}
