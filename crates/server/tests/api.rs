//! In-process tests of the HTTP surface with a counting pipeline factory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use iplrag::{
    build_index, Completion, GenerationError, GenerationProvider, Generator, IndexBuildConfig,
    PipelineSettings, RagPipeline, Retriever, StubEmbedder,
};
use server::error::ErrorResponse;
use server::{
    build_router, InfoResponse, PipelineFactory, RagitResponse, ServerConfig, ServerState,
    ServiceError, ServiceStatus,
};

const CORPUS: &str = "Jos Buttler played for the RR in 2022 and scored a total of 863 runs.\n\n\
                      KL Rahul played for the LSG in 2022 and scored a total of 616 runs.";

struct ScriptedChat {
    model: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl GenerationProvider for ScriptedChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = if prompt.contains("Original question:") {
            "How many runs did Jos Buttler score?\nJos Buttler total runs"
        } else {
            "Jos Buttler scored 863 runs."
        };
        Ok(Completion {
            text: text.to_string(),
            model: None,
        })
    }
}

#[derive(Default)]
struct CountingFactory {
    builds: AtomicUsize,
    chat_calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl PipelineFactory for CountingFactory {
    async fn build(&self, settings: &PipelineSettings) -> Result<RagPipeline, String> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        if self.fail {
            return Err(format!(
                "index artifact not found: {}",
                settings.location().index_path().display()
            ));
        }

        let embedder = Arc::new(StubEmbedder::new(settings.embedding.model_name.clone(), 32));
        let store = build_index(CORPUS, embedder.as_ref(), &IndexBuildConfig::default())
            .await
            .map_err(|e| e.to_string())?;
        let chat = Arc::new(ScriptedChat {
            model: settings.generation.model_name.clone(),
            calls: self.chat_calls.clone(),
        });
        let retriever = Retriever::new(
            Arc::new(store),
            embedder,
            chat.clone(),
            settings.retrieval.clone(),
        )
        .map_err(|e| e.to_string())?;
        Ok(RagPipeline::new(retriever, Generator::new(chat)))
    }
}

fn config() -> ServerConfig {
    ServerConfig::from_vars([
        ("EMBEDDING_MODEL", "granite-embedding:30m"),
        ("GENERATION_MODEL", "gemma3:4b"),
        ("VECTOR_STORE_PATH", "./vector_store"),
        ("VECTOR_STORE_INDEX", "ipl_2022"),
    ])
    .unwrap()
}

fn app(factory: Arc<CountingFactory>) -> (Router, Arc<ServerState>) {
    let state = Arc::new(ServerState::with_factory(config(), factory).unwrap());
    (build_router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn ragit(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ragit")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn info_reports_config_without_building() {
    let factory = Arc::new(CountingFactory::default());
    let (app, state) = app(factory.clone());

    for _ in 0..2 {
        let (status, _, body) = send(&app, get("/info")).await;
        assert_eq!(status, StatusCode::OK);
        let info: InfoResponse = serde_json::from_value(body).unwrap();
        assert_eq!(
            info,
            InfoResponse {
                embedding_model: "granite-embedding:30m".into(),
                generation_model: "gemma3:4b".into(),
                vector_store_path: "./vector_store".into(),
                vector_store_index: "ipl_2022".into(),
            }
        );
    }

    assert_eq!(factory.builds.load(Ordering::SeqCst), 0);
    assert_eq!(state.rag.status(), ServiceStatus::Uninitialized);
}

#[tokio::test]
async fn empty_query_is_rejected_before_initialization() {
    let factory = Arc::new(CountingFactory::default());
    let (app, _) = app(factory.clone());

    for query in ["", "   ", "\n\t"] {
        let (status, _, body) = send(&app, ragit(json!({ "query": query }).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(err.error.code, "INVALID_INPUT");
        assert_eq!(err.error.message, "Query cannot be empty");
    }

    assert_eq!(factory.builds.load(Ordering::SeqCst), 0);
    assert_eq!(factory.chat_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let factory = Arc::new(CountingFactory::default());
    let (app, _) = app(factory.clone());

    for body in ["not json", "{}", r#"{"query": 7}"#] {
        let (status, _, body) = send(&app, ragit(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
    assert_eq!(factory.builds.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ragit_answers_with_configured_model() {
    let factory = Arc::new(CountingFactory::default());
    let (app, state) = app(factory.clone());

    let question = "what is the total run scored by Jos Buttler?";
    let (status, _, body) = send(&app, ragit(json!({ "query": question }).to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let answer: RagitResponse = serde_json::from_value(body).unwrap();
    assert!(!answer.id.is_empty());
    assert_eq!(answer.user_query, question);
    assert_eq!(answer.rag_result, "Jos Buttler scored 863 runs.");
    assert_eq!(answer.model_used, "gemma3:4b");

    assert_eq!(state.rag.status(), ServiceStatus::Ready);
    // one expansion call plus one generation call
    assert_eq!(factory.chat_calls.load(Ordering::SeqCst), 2);

    let (_, _, again) = send(&app, ragit(json!({ "query": question }).to_string())).await;
    assert_ne!(again["id"], answer.id.as_str());
    assert_eq!(factory.builds.load(Ordering::SeqCst), 1);

    let (status, _, ready) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["state"], "ready");
}

#[tokio::test]
async fn concurrent_first_calls_build_once() {
    let factory = Arc::new(CountingFactory::default());
    let state = ServerState::with_factory(config(), factory.clone()).unwrap();

    let calls = (0..8).map(|_| state.rag.answer_query("who scored 863 runs?"));
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropped_first_caller_does_not_restart_initialization() {
    let factory = Arc::new(CountingFactory::default());
    let state = ServerState::with_factory(config(), factory.clone()).unwrap();

    let rag = state.rag.clone();
    let first = tokio::spawn(async move { rag.answer_query("who scored 863 runs?").await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());
    assert_eq!(state.rag.status(), ServiceStatus::Initializing);

    let answer = state.rag.answer_query("who scored 863 runs?").await.unwrap();
    assert_eq!(answer.rag_result, "Jos Buttler scored 863 runs.");
    assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    assert_eq!(state.rag.status(), ServiceStatus::Ready);
}

#[tokio::test]
async fn failed_initialization_is_terminal() {
    let factory = Arc::new(CountingFactory {
        fail: true,
        ..Default::default()
    });
    let (app, state) = app(factory.clone());

    for _ in 0..2 {
        let (status, _, body) = send(&app, ragit(json!({ "query": "who?" }).to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "RAG_INIT_FAILED");
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("RAG service initialization failed: index artifact not found"));
    }

    assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    assert_eq!(state.rag.status(), ServiceStatus::Failed);
    assert!(matches!(
        state.rag.answer_query("again").await,
        Err(ServiceError::Initialization(_))
    ));

    let (status, _, ready) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ready["state"], "failed");

    // configuration stays readable
    let (status, _, _) = send(&app, get("/info")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (app, _) = app(Arc::new(CountingFactory::default()));
    let (status, _, body) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn health_and_request_id() {
    let (app, _) = app(Arc::new(CountingFactory::default()));

    let (status, headers, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(headers.contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app, request).await;
    assert_eq!(headers["x-request-id"], "abc-123");
}
