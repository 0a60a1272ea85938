//! Keyword-count routing of unanswered questions.

use crate::domain::model::Domain;
use serde::{Deserialize, Serialize};

/// Staff member and trigger keywords for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRoute {
    pub staff: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl DomainRoute {
    pub fn new(staff: &str, keywords: &[&str]) -> Self {
        Self {
            staff: staff.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn default_for(domain: Domain) -> Self {
        match domain {
            Domain::Admission => Self::new("Dr Gohar", &["admission", "admit", "apply", "form"]),
            Domain::Scholarship => Self::new("Dr Naeem", &["scholarship", "financial aid"]),
            Domain::StudentAffairs => Self::new(
                "Sir Sibtual Hassan",
                &["hostel", "society", "club", "event", "transport", "card", "complaint"],
            ),
            Domain::Academics => Self::new(
                "Teacher Kinza",
                &["course", "exam", "grade", "semester", "class", "timetable", "result", "attendance"],
            ),
            Domain::Migration => Self::new("Dr Asim Zeb", &["migration", "migrate", "transfer"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub domain: Domain,
    pub staff: String,
    pub score: usize,
}

/// Domains with no keyword hit land here.
pub const FALLBACK_DOMAIN: Domain = Domain::StudentAffairs;

#[derive(Debug, Clone)]
pub struct DomainClassifier {
    routes: Vec<(Domain, DomainRoute)>,
}

impl DomainClassifier {
    /// `route_for` is consulted once per domain in declaration order.
    pub fn new(mut route_for: impl FnMut(Domain) -> DomainRoute) -> Self {
        let routes = Domain::ALL
            .iter()
            .map(|&domain| {
                let mut route = route_for(domain);
                route.keywords = route.keywords.iter().map(|k| k.to_lowercase()).collect();
                (domain, route)
            })
            .collect();
        Self { routes }
    }

    pub fn staff_for(&self, domain: Domain) -> &str {
        self.routes
            .iter()
            .find(|(d, _)| *d == domain)
            .map(|(_, route)| route.staff.as_str())
            .unwrap_or_default()
    }

    pub fn routes(&self) -> impl Iterator<Item = (Domain, &DomainRoute)> {
        self.routes.iter().map(|(domain, route)| (*domain, route))
    }

    /// Number of the domain's keywords occurring anywhere in `query`.
    pub fn score(&self, domain: Domain, query: &str) -> usize {
        let query = query.to_lowercase();
        self.routes
            .iter()
            .find(|(d, _)| *d == domain)
            .map(|(_, route)| count_hits(&route.keywords, &query))
            .unwrap_or(0)
    }

    pub fn classify(&self, query: &str) -> Classification {
        let query = query.to_lowercase();
        let mut best: Option<(Domain, &DomainRoute, usize)> = None;

        for (domain, route) in &self.routes {
            let score = count_hits(&route.keywords, &query);
            // strictly greater keeps the earliest domain on ties
            if score > 0 && best.map_or(true, |(_, _, top)| score > top) {
                best = Some((*domain, route, score));
            }
        }

        match best {
            Some((domain, route, score)) => Classification {
                domain,
                staff: route.staff.clone(),
                score,
            },
            None => Classification {
                domain: FALLBACK_DOMAIN,
                staff: self.staff_for(FALLBACK_DOMAIN).to_string(),
                score: 0,
            },
        }
    }
}

impl Default for DomainClassifier {
    fn default() -> Self {
        Self::new(DomainRoute::default_for)
    }
}

fn count_hits(keywords: &[String], query: &str) -> usize {
    keywords
        .iter()
        .filter(|keyword| !keyword.is_empty() && query.contains(keyword.as_str()))
        .count()
}
