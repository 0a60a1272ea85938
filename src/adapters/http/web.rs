//! HTML form site. Forwarded questions redirect to `/forwarded`, which reads the
//! notice back through a session cookie.

use crate::adapters::http::AppState;
use crate::domain::model::{Domain, Reply};
use crate::utils::error::HelpDeskError;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "helpdesk_session";
const MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardNotice {
    pub query: String,
    pub domain: Domain,
    pub staff: String,
    pub forwarded_at: DateTime<Utc>,
}

/// Server-side session data keyed by the cookie's UUID.
#[derive(Debug)]
pub struct SessionStore {
    notices: Mutex<HashMap<Uuid, ForwardNotice>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionStore {
    /// A store holding at most `capacity` notices (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notices: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Stores `notice` under a fresh id. Past capacity the oldest notice is dropped.
    pub fn create(&self, notice: ForwardNotice) -> Uuid {
        let id = Uuid::new_v4();
        let mut notices = self.notices.lock().unwrap_or_else(|p| p.into_inner());
        while notices.len() >= self.capacity {
            let oldest = notices
                .iter()
                .min_by_key(|(_, n)| n.forwarded_at)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => notices.remove(&oldest),
                None => break,
            };
        }
        notices.insert(id, notice);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<ForwardNotice> {
        self.notices
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.notices.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Session id from a `Cookie` header, if present and well formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
        body = body
    ))
}

fn ask_form(note: Option<&str>) -> String {
    let note = note
        .map(|n| format!("<p class=\"note\">{}</p>\n", escape_html(n)))
        .unwrap_or_default();
    format!(
        "{note}<form method=\"post\" action=\"/ask\">\n<input type=\"text\" name=\"query\" placeholder=\"Ask a question\" autofocus>\n<button type=\"submit\">Ask</button>\n</form>"
    )
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub query: String,
}

pub async fn index() -> Html<String> {
    page("University Help Desk", &ask_form(None))
}

pub async fn ask(State(state): State<AppState>, Form(form): Form<AskForm>) -> Response {
    let reply = match state.desk.answer(&form.query).await {
        Ok(reply) => reply,
        Err(HelpDeskError::ValidationError { .. }) => {
            return (
                StatusCode::BAD_REQUEST,
                page("University Help Desk", &ask_form(Some("Please type a question."))),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Web ask failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                page("Something went wrong", &ask_form(Some(&e.user_friendly_message()))),
            )
                .into_response();
        }
    };

    match reply {
        Reply::Forwarded { domain, staff } => {
            let id = state.sessions.create(ForwardNotice {
                query: form.query.trim().to_string(),
                domain,
                staff,
                forwarded_at: Utc::now(),
            });
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
            ([(header::SET_COOKIE, cookie)], Redirect::to("/forwarded")).into_response()
        }
        answered => {
            let body = format!(
                "<p class=\"question\">{}</p>\n<p class=\"answer\">{}</p>\n{}",
                escape_html(form.query.trim()),
                escape_html(&answered.message()),
                ask_form(None)
            );
            page("Answer", &body).into_response()
        }
    }
}

pub async fn forwarded(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(notice) = session_id(&headers).and_then(|id| state.sessions.get(&id)) else {
        return Redirect::to("/").into_response();
    };

    let body = format!(
        "<p class=\"question\">{}</p>\n<p>Your query has been forwarded to <strong>{}</strong> (Domain: {}).</p>\n<p>Forwarded at {}.</p>\n{}",
        escape_html(&notice.query),
        escape_html(&notice.staff),
        escape_html(notice.domain.label()),
        notice.forwarded_at.format("%Y-%m-%d %H:%M UTC"),
        ask_form(None)
    );
    page("Forwarded to Staff", &body).into_response()
}

pub async fn staff(State(state): State<AppState>) -> Html<String> {
    let rows: String = state
        .desk
        .inbox()
        .snapshot()
        .iter()
        .map(|status| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&status.staff),
                escape_html(status.domain.label()),
                status.unread
            )
        })
        .collect();
    let body = format!(
        "<table>\n<tr><th>Staff</th><th>Domain</th><th>Unread</th></tr>\n{}</table>",
        rows
    );
    page("Staff Inbox", &body)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ask", get(|| async { Redirect::to("/") }).post(ask))
        .route("/forwarded", get(forwarded))
        .route("/staff", get(staff))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_session_id_from_cookie_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, id)).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));

        let mut bad = HeaderMap::new();
        bad.insert(header::COOKIE, HeaderValue::from_static("helpdesk_session=nope"));
        assert_eq!(session_id(&bad), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_store_round_trip() {
        let store = SessionStore::default();
        assert!(store.is_empty());
        let notice = ForwardNotice {
            query: "hostel fee".to_string(),
            domain: Domain::StudentAffairs,
            staff: "Sir Sibtual Hassan".to_string(),
            forwarded_at: Utc::now(),
        };
        let id = store.create(notice.clone());
        assert_eq!(store.get(&id), Some(notice));
        assert_eq!(store.get(&Uuid::new_v4()), None);
    }

    #[test]
    fn test_session_store_evicts_oldest_past_capacity() {
        let store = SessionStore::with_capacity(2);
        let start = Utc::now();
        let notice = |minutes: i64| ForwardNotice {
            query: format!("question {}", minutes),
            domain: Domain::Academics,
            staff: "Teacher Kinza".to_string(),
            forwarded_at: start + chrono::Duration::minutes(minutes),
        };

        let second = store.create(notice(1));
        let first = store.create(notice(0));
        let third = store.create(notice(2));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&first), None);
        assert_eq!(store.get(&second).map(|n| n.query), Some("question 1".to_string()));
        assert!(store.get(&third).is_some());
    }
}
