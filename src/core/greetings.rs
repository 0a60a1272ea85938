use crate::core::knowledge::normalize;
use std::collections::HashMap;

pub const DEFAULT_GREETINGS: &[(&str, &str)] = &[
    ("hi", "Hello! How can I assist you today?"),
    ("hello", "Hi there! What can I do for you?"),
    ("hey", "Hey! How can I help you today?"),
    ("good morning", "Good morning! How can I help you?"),
    ("good afternoon", "Good afternoon! How can I help you?"),
    ("good evening", "Good evening! How can I help you?"),
    ("how are you", "I'm doing well, thank you! How can I help you?"),
    ("thanks", "You're welcome!"),
    ("thank you", "You're welcome! Anything else I can help with?"),
    ("bye", "Goodbye! Have a great day."),
    ("goodbye", "Goodbye! Feel free to come back with more questions."),
];

/// Canned replies looked up by exact (normalized) text.
#[derive(Debug, Clone)]
pub struct Greetings {
    replies: HashMap<String, String>,
}

impl Greetings {
    pub fn new(replies: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            replies: replies
                .into_iter()
                .map(|(phrase, reply)| (normalize(&phrase), reply))
                .collect(),
        }
    }

    pub fn reply_to(&self, query: &str) -> Option<&str> {
        self.replies.get(&normalize(query)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}

impl Default for Greetings {
    fn default() -> Self {
        Self::new(
            DEFAULT_GREETINGS
                .iter()
                .map(|(phrase, reply)| (phrase.to_string(), reply.to_string())),
        )
    }
}
