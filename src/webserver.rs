use axum::extract::{Path, State};
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::routing::any;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::error::QueueError;
use crate::queue::Request;
use crate::state::BotState;
use crate::stats;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    uptime_seconds: u64,
    memory_rss_mb: f64,
    queue_length: usize,
    published_count: usize,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct PublishBody {
    request_number: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

async fn url_health(State(bot): State<BotState>) -> impl IntoResponse {
    let (queue_length, published_count) = bot.queue_counts().await;

    Json(Health {
        status: "ok",
        uptime_seconds: bot.uptime().await.as_secs(),
        memory_rss_mb: stats::to_mb(stats::process_stats().rss_bytes),
        queue_length,
        published_count,
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

async fn url_request(
    Path(prompt): Path<String>,
    State(bot): State<BotState>,
) -> Result<Json<Request>, QueueError> {
    bot.queue_enqueue(&prompt).await.map(Json)
}

async fn url_request_empty() -> QueueError {
    QueueError::BadPrompt
}

async fn url_check(
    Path(request_number): Path<String>,
    State(bot): State<BotState>,
) -> impl IntoResponse {
    Json(bot.queue_check(&request_number).await)
}

async fn url_check_empty(State(bot): State<BotState>) -> impl IntoResponse {
    Json(bot.queue_check("").await)
}

async fn url_publish(
    State(bot): State<BotState>,
    Json(body): Json<PublishBody>,
) -> Result<Json<Request>, QueueError> {
    bot.queue_publish(
        &body.request_number,
        &body.author,
        &body.title,
        &body.description,
    )
    .await
    .map(Json)
}

fn decode_segment(segment: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned()
}

/* Positional form: /publish/<id>/<author>/<title>/<description>, trailing parts optional.
 * The raw path is split before decoding, so an encoded slash stays inside its segment. */
async fn url_publish_positional(
    uri: Uri,
    State(bot): State<BotState>,
) -> Result<Json<Request>, QueueError> {
    let params = uri.path().strip_prefix("/publish/").unwrap_or_default();
    let mut parts = params.split('/').map(decode_segment);
    let mut next = || parts.next().unwrap_or_default();
    let (request_number, author, title, description) = (next(), next(), next(), next());

    bot.queue_publish(&request_number, &author, &title, &description)
        .await
        .map(Json)
}

async fn url_show(State(bot): State<BotState>) -> impl IntoResponse {
    Json(bot.queue_show().await)
}

async fn url_listing(State(bot): State<BotState>) -> impl IntoResponse {
    Json(bot.queue_listing().await)
}

pub fn create_app(bot: BotState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    /* Routes match on the path alone; only the JSON publish cares about the method. */
    Router::new()
        .route("/", any(url_health))
        .route("/health", any(url_health))
        .route("/request/", any(url_request_empty))
        .route("/request/*prompt", any(url_request))
        .route("/check/", any(url_check_empty))
        .route("/check/*request_number", any(url_check))
        .route("/publish", any(url_listing).post(url_publish))
        .route("/publish/", any(url_publish_positional))
        .route("/publish/*params", any(url_publish_positional))
        .route("/show/", any(url_show))
        .route("/show/*rest", any(url_show))
        .fallback(url_listing)
        .layer(cors)
        .with_state(bot)
}
