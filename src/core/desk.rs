use crate::core::classifier::DomainClassifier;
use crate::core::greetings::Greetings;
use crate::core::inbox::StaffInbox;
use crate::core::knowledge::{normalize, KnowledgeBase};
use crate::domain::model::{FaqEntry, Reply};
use crate::domain::ports::{FaqStore, Generator};
use crate::utils::error::{HelpDeskError, Result};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const DEFAULT_CUTOFF: f64 = 0.6;

#[derive(Debug, Clone)]
pub struct DeskSettings {
    pub cutoff: f64,
    pub greetings: Greetings,
    pub classifier: DomainClassifier,
}

impl Default for DeskSettings {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            greetings: Greetings::default(),
            classifier: DomainClassifier::default(),
        }
    }
}

/// Answers questions: greeting, then dataset, then generator, then a staff member.
pub struct HelpDesk {
    store: Arc<dyn FaqStore>,
    generator: Option<Arc<dyn Generator>>,
    knowledge: RwLock<KnowledgeBase>,
    greetings: Greetings,
    classifier: DomainClassifier,
    inbox: StaffInbox,
    cutoff: f64,
}

impl HelpDesk {
    /// Loads the dataset from `store` and builds a desk around it.
    pub async fn open(
        store: Arc<dyn FaqStore>,
        generator: Option<Arc<dyn Generator>>,
        settings: DeskSettings,
    ) -> Result<Self> {
        if !(settings.cutoff >= 0.0 && settings.cutoff <= 1.0) {
            return Err(HelpDeskError::ConfigValidationError {
                field: "dataset.cutoff".to_string(),
                message: format!("must be between 0.0 and 1.0, got {}", settings.cutoff),
            });
        }

        let entries = store.load().await?;
        let knowledge = KnowledgeBase::from_entries(entries);
        tracing::info!("Loaded {} FAQ entries", knowledge.len());

        let inbox = StaffInbox::new(
            settings
                .classifier
                .routes()
                .map(|(domain, route)| (domain, route.staff.as_str())),
        );

        Ok(Self {
            store,
            generator,
            knowledge: RwLock::new(knowledge),
            greetings: settings.greetings,
            classifier: settings.classifier,
            inbox,
            cutoff: settings.cutoff,
        })
    }

    pub async fn answer(&self, query: &str) -> Result<Reply> {
        let query = normalize(query);
        if query.is_empty() {
            return Err(HelpDeskError::ValidationError {
                message: "query must not be empty".to_string(),
            });
        }

        if let Some(text) = self.greetings.reply_to(&query) {
            tracing::debug!("Greeting matched: {:?}", query);
            return Ok(Reply::Greeting {
                text: text.to_string(),
            });
        }

        if let Some((matched_question, answer)) = self.lookup(&query)? {
            tracing::debug!("Dataset matched {:?} -> {:?}", query, matched_question);
            return Ok(Reply::Dataset {
                matched_question,
                answer,
            });
        }

        if let Some(text) = self.generate(&query).await {
            tracing::debug!("Generator answered {:?}", query);
            return Ok(Reply::Generated { text });
        }

        let classification = self.classifier.classify(&query);
        let unread = self.inbox.record(&classification.staff)?;
        tracing::info!(
            "Forwarded query to {} (domain: {}, keyword hits: {}, unread: {})",
            classification.staff,
            classification.domain,
            classification.score,
            unread
        );

        Ok(Reply::Forwarded {
            domain: classification.domain,
            staff: classification.staff,
        })
    }

    fn lookup(&self, query: &str) -> Result<Option<(String, String)>> {
        let knowledge = self.read_knowledge();
        Ok(knowledge
            .best_match(query, self.cutoff)?
            .map(|(question, answer)| (question.to_string(), answer.to_string())))
    }

    /// Any generator failure is logged and treated as "no answer".
    async fn generate(&self, query: &str) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let prompt = build_prompt(query);

        match generator.generate(&prompt).await {
            Ok(raw) => {
                let text = extract_answer(&raw, &prompt);
                if text.is_empty() {
                    tracing::debug!("Generator returned an empty answer");
                    None
                } else {
                    Some(text)
                }
            }
            Err(e) => {
                tracing::warn!("Generation failed, routing to staff: {}", e);
                None
            }
        }
    }

    /// Persists a new pair and makes it answerable immediately.
    pub async fn teach(&self, question: &str, answer: &str) -> Result<FaqEntry> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() || answer.is_empty() {
            return Err(HelpDeskError::ValidationError {
                message: "question and answer must both be non-empty".to_string(),
            });
        }

        let entry = FaqEntry::new(question, answer);
        self.store.append(&entry).await?;
        self.write_knowledge().insert(entry.clone());
        tracing::info!("Added FAQ entry: {:?}", entry.question);
        Ok(entry)
    }

    /// Re-reads the store, replacing the in-memory table. Returns the new size.
    pub async fn reload(&self) -> Result<usize> {
        let entries = self.store.load().await?;
        let knowledge = KnowledgeBase::from_entries(entries);
        let count = knowledge.len();
        *self.write_knowledge() = knowledge;
        tracing::info!("Reloaded {} FAQ entries", count);
        Ok(count)
    }

    pub fn faq_count(&self) -> usize {
        self.read_knowledge().len()
    }

    pub fn inbox(&self) -> &StaffInbox {
        &self.inbox
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    fn read_knowledge(&self) -> RwLockReadGuard<'_, KnowledgeBase> {
        self.knowledge.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_knowledge(&self) -> RwLockWriteGuard<'_, KnowledgeBase> {
        self.knowledge.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn build_prompt(query: &str) -> String {
    format!("Q: {}\nA:", query)
}

/// First line of the completion, with an echoed prompt removed.
pub fn extract_answer(raw: &str, prompt: &str) -> String {
    let completion = raw.strip_prefix(prompt).unwrap_or(raw);
    completion
        .trim_start()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Domain;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<Vec<FaqEntry>>,
    }

    impl MemoryStore {
        fn with(entries: Vec<FaqEntry>) -> Self {
            Self {
                entries: Mutex::new(entries),
            }
        }
    }

    #[async_trait]
    impl FaqStore for MemoryStore {
        async fn load(&self) -> Result<Vec<FaqEntry>> {
            Ok(self.entries.lock().await.clone())
        }

        async fn append(&self, entry: &FaqEntry) -> Result<()> {
            self.entries.lock().await.push(entry.clone());
            Ok(())
        }
    }

    struct ScriptedGenerator {
        reply: Result<String>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(HelpDeskError::GenerationError {
                    message: "model offline".to_string(),
                }),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(HelpDeskError::GenerationError {
                    message: e.to_string(),
                }),
            }
        }
    }

    fn faq() -> Vec<FaqEntry> {
        vec![
            FaqEntry::new("What is the fee structure?", "Fees are listed on the finance portal."),
            FaqEntry::new("When do classes start?", "Classes start on 1 September."),
        ]
    }

    async fn desk(generator: Option<Arc<dyn Generator>>) -> HelpDesk {
        HelpDesk::open(
            Arc::new(MemoryStore::with(faq())),
            generator,
            DeskSettings::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_greeting_comes_first() {
        let desk = desk(None).await;
        let reply = desk.answer("  HELLO ").await.unwrap();
        assert_eq!(reply.source(), "greeting");
        assert_eq!(reply.message(), "Hi there! What can I do for you?");
    }

    #[tokio::test]
    async fn test_dataset_match_skips_generator() {
        let generator = Arc::new(ScriptedGenerator::ok("should not be used"));
        let desk = desk(Some(generator.clone() as Arc<dyn Generator>)).await;

        let reply = desk.answer("what is the fee structur").await.unwrap();
        assert_eq!(
            reply,
            Reply::Dataset {
                matched_question: "What is the fee structure?".to_string(),
                answer: "Fees are listed on the finance portal.".to_string(),
            }
        );
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generator_answers_unknown_questions() {
        let generator = Arc::new(ScriptedGenerator::ok(" The gym opens at 7am.\nQ: next"));
        let desk = desk(Some(generator)).await;

        let reply = desk.answer("when does the gym open").await.unwrap();
        assert_eq!(
            reply,
            Reply::Generated {
                text: "The gym opens at 7am.".to_string()
            }
        );
        assert_eq!(desk.inbox().total_unread(), 0);
    }

    #[tokio::test]
    async fn test_generator_failure_falls_through_to_routing() {
        let desk = desk(Some(Arc::new(ScriptedGenerator::failing()))).await;

        let reply = desk.answer("I want to apply for admission").await.unwrap();
        assert_eq!(
            reply,
            Reply::Forwarded {
                domain: Domain::Admission,
                staff: "Dr Gohar".to_string(),
            }
        );
        assert_eq!(desk.inbox().unread("Dr Gohar"), Some(1));
    }

    #[tokio::test]
    async fn test_blank_generation_falls_through_to_routing() {
        let desk = desk(Some(Arc::new(ScriptedGenerator::ok("   \n")))).await;
        let reply = desk.answer("hostel room allocation").await.unwrap();
        assert!(reply.is_forwarded());
        assert_eq!(desk.inbox().unread("Sir Sibtual Hassan"), Some(1));
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_without_counting() {
        let desk = desk(None).await;
        let err = desk.answer("   ").await.unwrap_err();
        assert!(matches!(err, HelpDeskError::ValidationError { .. }));
        assert_eq!(desk.inbox().total_unread(), 0);
    }

    #[tokio::test]
    async fn test_open_rejects_out_of_range_cutoff() {
        for cutoff in [1.5, -0.1, f64::NAN] {
            let settings = DeskSettings {
                cutoff,
                ..DeskSettings::default()
            };
            let result = HelpDesk::open(Arc::new(MemoryStore::with(faq())), None, settings).await;
            match result {
                Err(HelpDeskError::ConfigValidationError { field, .. }) => {
                    assert_eq!(field, "dataset.cutoff")
                }
                Err(e) => panic!("unexpected error for cutoff {}: {}", cutoff, e),
                Ok(_) => panic!("cutoff {} should be rejected", cutoff),
            }
        }

        let edge = DeskSettings {
            cutoff: 1.0,
            ..DeskSettings::default()
        };
        assert!(HelpDesk::open(Arc::new(MemoryStore::default()), None, edge)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_teach_makes_answer_available() {
        let store = Arc::new(MemoryStore::default());
        let desk = HelpDesk::open(store.clone(), None, DeskSettings::default())
            .await
            .unwrap();
        assert_eq!(desk.faq_count(), 0);

        desk.teach("Where is the transport office?", "Behind block A.")
            .await
            .unwrap();
        assert_eq!(desk.faq_count(), 1);
        assert_eq!(store.entries.lock().await.len(), 1);

        let reply = desk.answer("where is the transport office").await.unwrap();
        assert_eq!(reply.message(), "Behind block A.");

        assert!(desk.teach("  ", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_reload_picks_up_store_changes() {
        let store = Arc::new(MemoryStore::with(faq()));
        let desk = HelpDesk::open(store.clone(), None, DeskSettings::default())
            .await
            .unwrap();

        store
            .entries
            .lock()
            .await
            .push(FaqEntry::new("Is there a hostel?", "Yes, for 400 students."));
        assert_eq!(desk.reload().await.unwrap(), 3);
    }

    #[test]
    fn test_extract_answer() {
        let prompt = build_prompt("what is ai");
        assert_eq!(prompt, "Q: what is ai\nA:");
        assert_eq!(
            extract_answer("Q: what is ai\nA: Artificial intelligence.\nQ: more", &prompt),
            "Artificial intelligence."
        );
        assert_eq!(extract_answer("\n\nJust this line\nnot this", &prompt), "Just this line");
        assert_eq!(extract_answer("", &prompt), "");
    }
}
