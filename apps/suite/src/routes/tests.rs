use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use anyhow::Result;
use axum::{
    body::Body,
    extract::Query,
    http::{header, Method, Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::ServiceExt;

use super::build_router;
use crate::content::ResumeDocument;
use crate::download::DownloadControl;
use crate::i18n::{Locale, Strings};
use crate::key_store::storage::StorageError;
use crate::key_store::{KeyStore, KeyValueStorage, MemoryStorage};
use crate::llm_client::prompts::PromptTemplates;
use crate::llm_client::GeminiClient;
use crate::state::AppState;
use crate::suite::SuiteController;

const QUESTION_REPLY: &str =
    r#"{"candidates":[{"content":{"parts":[{"text":"What is your greatest strength?"}]}}]}"#;

type SeenKeys = Arc<StdMutex<Vec<String>>>;

/// Local stand-in for the Gemini endpoint. Records the `key` of every call.
async fn spawn_gemini_stub(reply: &'static str) -> Result<(String, SeenKeys)> {
    let seen: SeenKeys = Arc::default();
    let recorder = seen.clone();
    let app = Router::new().route(
        "/v1beta/models/:model",
        post(move |Query(query): Query<HashMap<String, String>>| {
            let recorder = recorder.clone();
            async move {
                recorder
                    .lock()
                    .unwrap()
                    .push(query.get("key").cloned().unwrap_or_default());
                reply
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), seen))
}

fn test_router(api_base: &str, build_key: Option<&str>, pdf_path: &Path) -> Result<Router> {
    router_with_storage(api_base, build_key, pdf_path, Box::new(MemoryStorage::new()))
}

fn router_with_storage(
    api_base: &str,
    build_key: Option<&str>,
    pdf_path: &Path,
    storage: Box<dyn KeyValueStorage>,
) -> Result<Router> {
    let strings = Arc::new(Strings::for_locale(Locale::En));
    let resume = Arc::new(ResumeDocument::from_source(
        "<main><h1>Jane Doe</h1><p>Rust engineer</p></main>".to_string(),
    ));
    let controller = SuiteController::new(
        KeyStore::resolve(build_key, storage),
        strings.clone(),
        PromptTemplates::for_locale(Locale::En),
        resume.clone(),
    );

    Ok(build_router(AppState {
        suite: Arc::new(Mutex::new(controller)),
        generator: Arc::new(GeminiClient::new(api_base)?),
        resume,
        strings,
        download: Arc::new(DownloadControl::new(pdf_path, "CV_english.pdf")),
    }))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => request.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

/// Memory storage that records the thread of every write.
#[derive(Default)]
struct WriterThreads {
    inner: MemoryStorage,
    writers: Arc<StdMutex<Vec<ThreadId>>>,
}

impl KeyValueStorage for WriterThreads {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writers.lock().unwrap().push(thread::current().id());
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.writers.lock().unwrap().push(thread::current().id());
        self.inner.delete(key)
    }
}

/// Polls the view until the in-flight request has landed.
async fn wait_for_result(app: &Router) -> Result<Value> {
    for _ in 0..200 {
        let (_, view) = send(app, Method::GET, "/api/v1/suite", None).await?;
        if view["view"] != "loading" {
            return Ok(view);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    anyhow::bail!("request never completed")
}

#[tokio::test]
async fn health_endpoint_reports_ok() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let app = test_router("http://127.0.0.1:9", None, &dir.path().join("cv.pdf"))?;

    let (status, body) = send(&app, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn mock_interview_prompts_for_key_then_shows_question() -> Result<()> {
    let (base, seen) = spawn_gemini_stub(QUESTION_REPLY).await?;
    let dir = tempfile::tempdir()?;
    let app = test_router(&base, None, &dir.path().join("cv.pdf"))?;

    let (_, view) = send(&app, Method::POST, "/api/v1/suite/open", None).await?;
    assert_eq!(view["view"], "menu");
    assert_eq!(view["key_status"]["source"], "none");

    let (status, view) = send(
        &app,
        Method::POST,
        "/api/v1/suite/actions/mock-interview",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["visible_panes"], json!(["key_setup"]));

    let (_, view) = send(
        &app,
        Method::POST,
        "/api/v1/suite/key",
        Some(json!({"key": "xyz"})),
    )
    .await?;
    assert_eq!(view["key_status"]["source"], "browser");

    let view = wait_for_result(&app).await?;
    assert_eq!(view["visible_panes"], json!(["result"]));
    assert_eq!(view["result"]["interview_input"], true);
    assert!(view["result"]["markdown"]
        .as_str()
        .unwrap_or_default()
        .contains("What is your greatest strength?"));
    assert_eq!(*seen.lock().unwrap(), vec!["xyz".to_string()]);
    Ok(())
}

#[tokio::test]
async fn cover_letter_without_company_sends_nothing() -> Result<()> {
    let (base, seen) = spawn_gemini_stub(QUESTION_REPLY).await?;
    let dir = tempfile::tempdir()?;
    let app = test_router(&base, Some("k"), &dir.path().join("cv.pdf"))?;

    send(&app, Method::POST, "/api/v1/suite/open", None).await?;
    send(&app, Method::POST, "/api/v1/suite/actions/cover-letter", None).await?;
    let (status, view) = send(
        &app,
        Method::POST,
        "/api/v1/suite/form",
        Some(json!({"company": "", "role": "SRE"})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["visible_panes"], json!(["input_view"]));
    assert_eq!(view["form"]["kind"], "cover_letter");
    assert!(seen.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn remote_failure_shows_connection_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let app = test_router("http://127.0.0.1:9", Some("k"), &dir.path().join("cv.pdf"))?;

    send(&app, Method::POST, "/api/v1/suite/open", None).await?;
    let (_, view) = send(
        &app,
        Method::POST,
        "/api/v1/suite/actions/elevator-pitch",
        None,
    )
    .await?;
    // Either still loading or already failed, never anything else.
    assert!(view["view"] == "loading" || view["view"] == "result");

    let view = wait_for_result(&app).await?;
    let expected = Strings::for_locale(Locale::En).connection_error;
    assert_eq!(view["visible_panes"], json!(["result"]));
    assert_eq!(view["result"]["markdown"], expected.as_str());
    assert_eq!(view["result"]["interview_input"], false);

    let (status, view) = send(&app, Method::POST, "/api/v1/suite/reset", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["view"], "menu");
    Ok(())
}

#[tokio::test]
async fn triggers_on_closed_modal_conflict() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let app = test_router("http://127.0.0.1:9", Some("k"), &dir.path().join("cv.pdf"))?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/suite/actions/elevator-pitch",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn unknown_action_is_not_found() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let app = test_router("http://127.0.0.1:9", Some("k"), &dir.path().join("cv.pdf"))?;

    send(&app, Method::POST, "/api/v1/suite/open", None).await?;
    let (status, _) = send(&app, Method::POST, "/api/v1/suite/actions/dance", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn toggle_and_clear_key_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let app = test_router("http://127.0.0.1:9", Some("k"), &dir.path().join("cv.pdf"))?;

    let (_, view) = send(&app, Method::POST, "/api/v1/suite/toggle", None).await?;
    assert_eq!(view["modal_open"], true);
    assert_eq!(view["key_status"]["source"], "build");

    let (_, view) = send(&app, Method::DELETE, "/api/v1/suite/key", None).await?;
    assert_eq!(view["key_status"]["source"], "none");
    assert_eq!(view["key_status"]["action"], "configure");

    let (_, view) = send(&app, Method::POST, "/api/v1/suite/key/configure", None).await?;
    assert_eq!(view["view"], "key_setup");

    let (_, view) = send(&app, Method::POST, "/api/v1/suite/toggle", None).await?;
    assert_eq!(view["modal_open"], false);
    assert_eq!(view["visible_panes"], json!([]));
    Ok(())
}

#[tokio::test]
async fn download_serves_pdf_with_filename() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pdf = dir.path().join("cv.pdf");
    std::fs::write(&pdf, b"%PDF-1.7 test")?;
    let app = test_router("http://127.0.0.1:9", None, &pdf)?;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/download").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()?
        .contains("filename=\"CV_english.pdf\""));
    let bytes = response.into_body().collect().await?.to_bytes();
    assert_eq!(&bytes[..], b"%PDF-1.7 test");
    Ok(())
}

#[tokio::test]
async fn failed_download_reports_and_releases_control() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let app = test_router("http://127.0.0.1:9", None, &dir.path().join("missing.pdf"))?;

    let (status, body) = send(&app, Method::GET, "/download", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"]["message"],
        Strings::for_locale(Locale::En).pdf_error.as_str()
    );

    let (_, view) = send(&app, Method::GET, "/api/v1/suite", None).await?;
    assert_eq!(view["download"]["busy"], false);
    Ok(())
}

#[tokio::test]
async fn resume_page_is_served_as_html() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let app = test_router("http://127.0.0.1:9", None, &dir.path().join("cv.pdf"))?;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()?
        .starts_with("text/html"));
    Ok(())
}

#[tokio::test]
async fn key_storage_writes_run_off_the_runtime_thread() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = WriterThreads::default();
    let writers = storage.writers.clone();
    let app = router_with_storage(
        "http://127.0.0.1:9",
        None,
        &dir.path().join("cv.pdf"),
        Box::new(storage),
    )?;

    send(&app, Method::POST, "/api/v1/suite/open", None).await?;
    send(&app, Method::POST, "/api/v1/suite/key/configure", None).await?;
    let (status, view) = send(
        &app,
        Method::POST,
        "/api/v1/suite/key",
        Some(json!({"key": "abc"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["key_status"]["source"], "browser");

    let (status, view) = send(&app, Method::DELETE, "/api/v1/suite/key", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["key_status"]["source"], "none");

    // The test runtime is single-threaded, so this is the runtime's thread.
    let runtime_thread = thread::current().id();
    let writers = writers.lock().unwrap();
    assert_eq!(writers.len(), 2);
    assert!(writers.iter().all(|id| *id != runtime_thread));
    Ok(())
}
