use crate::core::matcher::close_matches;
use crate::domain::model::FaqEntry;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Trimmed, lowercased form used for every lookup key.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct Row {
    key: String,
    question: String,
    answer: String,
}

/// Question/answer table in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    rows: Vec<Row>,
    index: HashMap<String, usize>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = FaqEntry>) -> Self {
        let mut kb = Self::new();
        kb.extend(entries);
        kb
    }

    /// A question already present keeps its position and takes the new answer.
    pub fn insert(&mut self, entry: FaqEntry) {
        let key = normalize(&entry.question);
        match self.index.get(&key) {
            Some(&position) => {
                let row = &mut self.rows[position];
                row.question = entry.question;
                row.answer = entry.answer;
            }
            None => {
                self.index.insert(key.clone(), self.rows.len());
                self.rows.push(Row {
                    key,
                    question: entry.question,
                    answer: entry.answer,
                });
            }
        }
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = FaqEntry>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.index
            .get(&normalize(question))
            .map(|&position| self.rows[position].answer.as_str())
    }

    /// Closest stored question to `query` scoring at least `cutoff`, with its answer.
    pub fn best_match(&self, query: &str, cutoff: f64) -> Result<Option<(&str, &str)>> {
        let query = normalize(query);
        let best = close_matches(&query, self.rows.iter().map(|row| row.key.as_str()), 1, cutoff)?;

        Ok(best
            .first()
            .and_then(|key| self.index.get(*key))
            .map(|&position| {
                let row = &self.rows[position];
                (row.question.as_str(), row.answer.as_str())
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KnowledgeBase {
        KnowledgeBase::from_entries(vec![
            FaqEntry::new("What is the admission deadline?", "The deadline is 30 August."),
            FaqEntry::new("How can I apply for a scholarship?", "Submit the form at the finance office."),
            FaqEntry::new("Where is the library?", "Next to the main auditorium."),
        ])
    }

    #[test]
    fn test_best_match_tolerates_typos_and_case() {
        let kb = sample();
        let (question, answer) = kb
            .best_match("what is the admision deadline", 0.6)
            .unwrap()
            .unwrap();
        assert_eq!(question, "What is the admission deadline?");
        assert_eq!(answer, "The deadline is 30 August.");
    }

    #[test]
    fn test_best_match_below_cutoff() {
        let kb = sample();
        assert!(kb.best_match("is the cafeteria open on sunday", 0.6).unwrap().is_none());
    }

    #[test]
    fn test_empty_table_never_matches() {
        let kb = KnowledgeBase::new();
        assert!(kb.is_empty());
        assert!(kb.best_match("anything", 0.6).unwrap().is_none());
    }

    #[test]
    fn test_later_entry_overrides_answer_in_place() {
        let mut kb = sample();
        kb.insert(FaqEntry::new("  where is the LIBRARY?", "Block C, ground floor."));

        assert_eq!(kb.len(), 3);
        assert_eq!(kb.get("Where is the library?"), Some("Block C, ground floor."));
    }
}
