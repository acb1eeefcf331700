mod analyze;
mod audio;

pub(crate) use audio::prune_audio_dir;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use newsvox_pipeline::NewsSentimentPipeline;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<NewsSentimentPipeline>,
    pub audio_dir: PathBuf,
    /// Narration files kept in `audio_dir` after each analysis.
    pub audio_retain_files: usize,
    pub default_max_items: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn analyze_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/analyze-news", post(analyze::analyze_news))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/audio/{file}", get(audio::get_audio));

    Router::new()
        .merge(public_routes)
        .merge(analyze_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use super::audio::is_safe_audio_name;
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use newsvox_pipeline::PipelineConfig;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_audio_dir() -> PathBuf {
        std::env::temp_dir().join(format!("newsvox-server-{}", uuid::Uuid::new_v4()))
    }

    /// Every upstream (search, translate, TTS) points at `base_url`.
    fn test_state(base_url: &str, audio_dir: PathBuf) -> AppState {
        let config = PipelineConfig {
            search_base_url: base_url.to_string(),
            translate_base_url: base_url.to_string(),
            tts_base_url: base_url.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            source_language: "en".to_string(),
            target_language: "hi".to_string(),
            item_concurrency: 2,
            request_timeout_secs: 5,
            max_retries: 0,
            retry_backoff_base_ms: 0,
        };
        AppState {
            pipeline: Arc::new(NewsSentimentPipeline::new(&config).expect("pipeline builds")),
            audio_dir,
            audio_retain_files: 50,
            default_max_items: 5,
        }
    }

    fn test_app(state: AppState) -> Router {
        build_app(state, RateLimitState::new(100, Duration::from_secs(60)))
    }

    fn analyze_request(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze-news")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    /// Search, translate and TTS all served by one mock server.
    async fn upstreams() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div class="NewsArticle"><h4>Acme wins</h4><p>Acme posts record profit.</p></div>
                   <div class="NewsArticle"><h4>Acme inquiry</h4><p>Fraud investigation widens.</p></div>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([[["अनुवाद", "src", null, null, 10]], null, "en"])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_upstream_error_maps_to_bad_gateway() {
        let response = ApiError::new("req-1", "upstream_error", "tts down").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn safe_audio_names() {
        assert!(is_safe_audio_name("3f2b-11aa.mp3"));
        assert!(!is_safe_audio_name("../secret.mp3"));
        assert!(!is_safe_audio_name("nested/file.mp3"));
        assert!(!is_safe_audio_name(".hidden.mp3"));
        assert!(!is_safe_audio_name("notes.txt"));
    }

    #[tokio::test]
    async fn health_returns_ok_with_request_id() {
        let app = test_app(test_state("http://127.0.0.1:9", temp_audio_dir()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "req-42");
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["meta"]["request_id"], "req-42");
    }

    #[tokio::test]
    async fn analyze_rejects_blank_company() {
        let app = test_app(test_state("http://127.0.0.1:9", temp_audio_dir()));
        let response = app
            .oneshot(analyze_request(&json!({"company": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn analyze_rejects_out_of_range_max_items() {
        let app = test_app(test_state("http://127.0.0.1:9", temp_audio_dir()));
        let response = app
            .oneshot(analyze_request(&json!({"company": "Acme", "max_items": 0})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analyze_returns_not_found_when_search_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = test_app(test_state(&server.uri(), temp_audio_dir()));
        let response = app
            .oneshot(analyze_request(&json!({"company": "Acme"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "not_found");
        assert_eq!(json["error"]["message"], "No news found");
    }

    #[tokio::test]
    async fn analyze_runs_pipeline_and_serves_audio() {
        let server = upstreams().await;

        let audio_dir = temp_audio_dir();
        let app = test_app(test_state(&server.uri(), audio_dir.clone()));

        let response = app
            .clone()
            .oneshot(analyze_request(&json!({"company": "Acme"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let data = &json["data"];
        assert_eq!(data["company"], "Acme");
        assert_eq!(data["items"].as_array().map(Vec::len), Some(2));
        assert_eq!(data["items"][0]["sentiment"], "Positive");
        assert_eq!(data["items"][1]["sentiment"], "Negative");
        assert_eq!(data["tally"], json!({"Positive": 1, "Neutral": 0, "Negative": 1}));
        assert_eq!(data["narration"], "अनुवाद अनुवाद");
        assert_eq!(data["final_sentiment"], "Overall, the news coverage is mixed.");

        let audio_url = data["audio_url"].as_str().expect("audio_url present");
        let audio = app
            .oneshot(Request::builder().uri(audio_url).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(audio.status(), StatusCode::OK);
        assert_eq!(audio.headers()[header::CONTENT_TYPE], "audio/mpeg");
        let bytes = to_bytes(audio.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ID3");

        let _ = tokio::fs::remove_dir_all(&audio_dir).await;
    }

    #[tokio::test]
    async fn audio_rejects_traversal() {
        let app = test_app(test_state("http://127.0.0.1:9", temp_audio_dir()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/audio/..%2Fsecret.mp3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn audio_missing_file_is_not_found() {
        let app = test_app(test_state("http://127.0.0.1:9", temp_audio_dir()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/audio/missing.mp3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn analyze_is_rate_limited() {
        let state = test_state("http://127.0.0.1:9", temp_audio_dir());
        let app = build_app(state, RateLimitState::new(1, Duration::from_secs(60)));

        let first = app
            .clone()
            .oneshot(analyze_request(&json!({"company": ""})))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::BAD_REQUEST);

        let second = app
            .oneshot(analyze_request(&json!({"company": ""})))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn analyze_keeps_only_newest_audio_files() {
        let server = upstreams().await;
        let audio_dir = temp_audio_dir();
        let state = AppState {
            audio_retain_files: 2,
            ..test_state(&server.uri(), audio_dir.clone())
        };
        let app = test_app(state);

        let mut last_audio_url = String::new();
        for _ in 0..4 {
            let response = app
                .clone()
                .oneshot(analyze_request(&json!({"company": "Acme"})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            last_audio_url = json["data"]["audio_url"].as_str().unwrap().to_string();
        }

        let mut entries = tokio::fs::read_dir(&audio_dir).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 2);

        let audio = app
            .oneshot(Request::builder().uri(&last_audio_url).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(audio.status(), StatusCode::OK);

        let _ = tokio::fs::remove_dir_all(&audio_dir).await;
    }

    #[tokio::test]
    async fn prune_keeps_current_file_and_newest_others() {
        let dir = temp_audio_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        for name in ["current.mp3", "old.mp3", "middle.mp3", "new.mp3"] {
            tokio::fs::write(dir.join(name), b"ID3").await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::fs::write(dir.join("notes.txt"), b"keep me").await.unwrap();

        let removed = prune_audio_dir(&dir, 2, Some("current.mp3")).await.unwrap();

        assert_eq!(removed, 2);
        assert!(dir.join("current.mp3").exists());
        assert!(dir.join("new.mp3").exists());
        assert!(!dir.join("middle.mp3").exists());
        assert!(!dir.join("old.mp3").exists());
        assert!(dir.join("notes.txt").exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
