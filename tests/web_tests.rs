use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use helpdesk_router::adapters::http::web;
use helpdesk_router::{app, AppState, TomlConfig};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn setup() -> (TempDir, Router) {
    let temp_dir = TempDir::new().unwrap();
    let dataset = temp_dir.path().join("faq.csv");
    std::fs::write(
        &dataset,
        "Where is the library?,The library is next to the main auditorium.\n",
    )
    .unwrap();

    let config = TomlConfig::from_toml_str(&format!(
        "[dataset]\npaths = [\"{}\"]\n\n[generator]\nenabled = false\n",
        dataset.display()
    ))
    .unwrap();
    let desk = app::build_desk(&config).await.unwrap();
    (temp_dir, web::router(AppState::new(Arc::new(desk))))
}

fn form_request(query: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("query={}", query)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_renders_form() {
    let (_dir, router) = setup().await;

    let response = router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response.into_body()).await;
    assert!(html.contains("<form method=\"post\" action=\"/ask\">"));
    assert!(html.contains("name=\"query\""));
}

#[tokio::test]
async fn test_answered_question_renders_inline() {
    let (_dir, router) = setup().await;

    let response = router
        .oneshot(form_request("where+is+the+librery"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response.into_body()).await;
    assert!(html.contains("The library is next to the main auditorium."));
    assert!(html.contains("where is the librery"));
}

#[tokio::test]
async fn test_forwarded_question_redirects_with_session() {
    let (_dir, router) = setup().await;

    let response = router
        .clone()
        .oneshot(form_request("%3Cb%3Escholarship%3C%2Fb%3E+please"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/forwarded");

    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("{}=", web::SESSION_COOKIE)));
    assert!(cookie.contains("HttpOnly"));
    let session = cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .uri("/forwarded")
        .header(header::COOKIE, session)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("forwarded to <strong>Dr Naeem</strong> (Domain: Scholarship)"));
    assert!(html.contains("&lt;b&gt;scholarship&lt;/b&gt; please"));
    assert!(!html.contains("<b>scholarship</b>"));

    let response = router.oneshot(get("/staff")).await.unwrap();
    let html = body_text(response.into_body()).await;
    assert!(html.contains("<tr><td>Dr Naeem</td><td>Scholarship</td><td>1</td></tr>"));
}

#[tokio::test]
async fn test_forwarded_without_session_goes_home() {
    let (_dir, router) = setup().await;

    let response = router.clone().oneshot(get("/forwarded")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let request = Request::builder()
        .uri("/forwarded")
        .header(
            header::COOKIE,
            format!("{}=00000000-0000-4000-8000-000000000000", web::SESSION_COOKIE),
        )
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_blank_question_shows_form_again() {
    let (_dir, router) = setup().await;

    let response = router.oneshot(form_request("+++")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response.into_body()).await;
    assert!(html.contains("Please type a question."));
}
