use serde::{Deserialize, Serialize};
use std::fmt;

/// Help-desk category an unanswered question is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Admission,
    Scholarship,
    StudentAffairs,
    Academics,
    Migration,
}

impl Domain {
    /// Declaration order; classification ties resolve to the earliest entry.
    pub const ALL: [Domain; 5] = [
        Domain::Admission,
        Domain::Scholarship,
        Domain::StudentAffairs,
        Domain::Academics,
        Domain::Migration,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Domain::Admission => "Admission",
            Domain::Scholarship => "Scholarship",
            Domain::StudentAffairs => "Student Affairs",
            Domain::Academics => "Academics",
            Domain::Migration => "Migration",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Outcome of one pass through the help desk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Reply {
    Greeting { text: String },
    Dataset { matched_question: String, answer: String },
    Generated { text: String },
    Forwarded { domain: Domain, staff: String },
}

impl Reply {
    pub fn message(&self) -> String {
        match self {
            Reply::Greeting { text } | Reply::Generated { text } => text.clone(),
            Reply::Dataset { answer, .. } => answer.clone(),
            Reply::Forwarded { domain, staff } => format!(
                "Your query has been forwarded to {} (Domain: {}).",
                staff, domain
            ),
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Reply::Greeting { .. } => "greeting",
            Reply::Dataset { .. } => "dataset",
            Reply::Generated { .. } => "generated",
            Reply::Forwarded { .. } => "forwarded",
        }
    }

    pub fn is_forwarded(&self) -> bool {
        matches!(self, Reply::Forwarded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_message() {
        let reply = Reply::Forwarded {
            domain: Domain::StudentAffairs,
            staff: "Sir Sibtual Hassan".to_string(),
        };
        assert_eq!(
            reply.message(),
            "Your query has been forwarded to Sir Sibtual Hassan (Domain: Student Affairs)."
        );
        assert_eq!(reply.source(), "forwarded");
        assert!(reply.is_forwarded());
    }

    #[test]
    fn test_domain_order_and_labels() {
        let labels: Vec<&str> = Domain::ALL.iter().map(|d| d.label()).collect();
        assert_eq!(
            labels,
            vec!["Admission", "Scholarship", "Student Affairs", "Academics", "Migration"]
        );
    }
}
