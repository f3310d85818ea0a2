// 🌐 REST API with Axum
//
//   GET    /api/health
//   GET    /api/members?view=assembly|government&q=...
//   GET    /api/members/:name?type=assembly|government
//   GET    /api/comments/:member
//   POST   /api/comments
//   DELETE /api/comments/:id        body: { "password": "..." }

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::aggregation::PersonSummary;
use crate::cache::SummaryCache;
use crate::comments::{self, Comment, CommentError, CommentThread, NewComment};
use crate::config::Config;
use crate::disclosure::{self, DataSources, Population};
use crate::money::{format_change, format_compact, format_money};
use crate::profiles;
use crate::ranking::{self, party_color, PartyColor, RankedMember};
use crate::rules::{Bucket, RuleEngine};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sources: Arc<DataSources>,
    pub engine: Arc<RuleEngine>,
    pub cache: Arc<SummaryCache>,
    pub db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(sources: DataSources, engine: RuleEngine, db: Connection) -> Self {
        AppState {
            sources: Arc::new(sources),
            engine: Arc::new(engine),
            cache: Arc::new(SummaryCache::new()),
            db: Arc::new(Mutex::new(db)),
        }
    }

    fn ranking(&self, population: Population) -> Arc<Vec<RankedMember>> {
        self.cache
            .get_or_compute(population, || ranking::rank(population, &self.sources, &self.engine))
    }
}

/// Load the three documents concurrently; each failure degrades to empty
pub async fn load_sources(config: &Config) -> DataSources {
    let (assembly_path, officials_path, profiles_path) =
        (config.assembly_path(), config.officials_path(), config.profiles_path());

    let (assembly, officials, profiles) = tokio::join!(
        tokio::task::spawn_blocking(move || disclosure::load_assembly(assembly_path)),
        tokio::task::spawn_blocking(move || disclosure::load_officials(officials_path)),
        tokio::task::spawn_blocking(move || profiles::load_profiles(profiles_path)),
    );

    fn flatten<T>(joined: Result<anyhow::Result<Vec<T>>, tokio::task::JoinError>) -> anyhow::Result<Vec<T>> {
        joined.map_err(anyhow::Error::from).and_then(|r| r)
    }

    DataSources {
        assembly: disclosure::or_empty("assembly", flatten(assembly)),
        officials: disclosure::or_empty("officials", flatten(officials)),
        profiles: disclosure::or_empty("profiles", flatten(profiles)),
    }
}

// ============================================================================
// Responses
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

impl IntoResponse for CommentError {
    fn into_response(self) -> Response {
        let status = match &self {
            CommentError::MissingField { .. }
            | CommentError::TooLong { .. }
            | CommentError::InvalidParent(_)
            | CommentError::ParentNotFound(_) => StatusCode::BAD_REQUEST,
            CommentError::NotFound(_) => StatusCode::NOT_FOUND,
            CommentError::WrongPassword => StatusCode::FORBIDDEN,
            CommentError::Database(e) => {
                error!("comment store error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        failure(status, self.to_string())
    }
}

/// Ranking card (list view)
#[derive(Serialize)]
struct MemberCard {
    rank: usize,
    name: String,
    population: Population,
    party: String,
    district: String,
    image_url: String,
    party_color: PartyColor,
    net_worth: i64,
    net_worth_display: String,
    change_amount: i64,
    change_rate_percent: f64,
    change_display: String,
}

impl From<&RankedMember> for MemberCard {
    fn from(member: &RankedMember) -> Self {
        let s = &member.summary;
        Self {
            rank: member.rank,
            name: s.name.clone(),
            population: s.population,
            party: s.affiliation_label.clone(),
            district: s.secondary_label.clone(),
            image_url: s.image_url.clone(),
            party_color: party_color(s),
            net_worth: s.breakdown.net_worth,
            net_worth_display: format_money(s.breakdown.net_worth),
            change_amount: s.breakdown.change_amount,
            change_rate_percent: s.breakdown.change_rate_percent,
            change_display: format_change(&s.breakdown),
        }
    }
}

#[derive(Serialize)]
struct BucketSection {
    bucket: Bucket,
    title: &'static str,
    count: usize,
    total: i64,
    total_display: String,
    compact_display: String,
}

/// Person detail view
#[derive(Serialize)]
struct MemberDetail {
    #[serde(flatten)]
    summary: PersonSummary,
    party_color: PartyColor,
    net_worth_display: String,
    change_display: String,
    highlight_bucket: Bucket,
    sections: Vec<BucketSection>,
}

impl From<PersonSummary> for MemberDetail {
    fn from(summary: PersonSummary) -> Self {
        let b = &summary.breakdown;
        let sections = Bucket::ALL
            .iter()
            .map(|bucket| {
                let total = b.total(*bucket);
                let sign = if bucket.is_debt() && total > 0 { "-" } else { "" };
                BucketSection {
                    bucket: *bucket,
                    title: bucket.title(),
                    count: b.items(*bucket).len(),
                    total,
                    total_display: format!("{}{}", sign, format_money(total)),
                    compact_display: format!("{}{}", sign, format_compact(total)),
                }
            })
            .collect();

        Self {
            party_color: party_color(&summary),
            net_worth_display: format_money(b.net_worth),
            change_display: format_change(b),
            highlight_bucket: b.highlight_bucket(),
            sections,
            summary,
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MembersQuery {
    view: Option<String>,
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    #[serde(rename = "type")]
    population: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    password: String,
}

#[derive(Serialize)]
struct DeleteResponse {
    removed: usize,
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/members - Ranked list for one population, optionally searched
async fn list_members(State(state): State<AppState>, Query(query): Query<MembersQuery>) -> Response {
    let population = query
        .view
        .as_deref()
        .and_then(Population::parse)
        .unwrap_or(Population::Assembly);

    let ranked = state.ranking(population);
    let cards: Vec<MemberCard> = ranking::search(&ranked, query.q.as_deref().unwrap_or(""))
        .into_iter()
        .map(MemberCard::from)
        .collect();

    (StatusCode::OK, Json(ApiResponse::ok(cards))).into_response()
}

/// GET /api/members/:name - Full breakdown for one person
async fn get_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let hint = query.population.as_deref().and_then(Population::parse);

    match ranking::find_person(&name, hint, &state.sources, &state.engine) {
        Some(summary) => (StatusCode::OK, Json(ApiResponse::ok(MemberDetail::from(summary)))).into_response(),
        None => failure(StatusCode::NOT_FOUND, format!("No disclosure data for {}", name)),
    }
}

/// GET /api/comments/:member - Threads, oldest first
async fn get_comments(State(state): State<AppState>, Path(member): Path<String>) -> Response {
    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => return failure(StatusCode::INTERNAL_SERVER_ERROR, "comment store unavailable"),
    };

    match comments::list_comments(&conn, &member) {
        Ok(rows) => {
            let threads: Vec<CommentThread> = comments::thread_comments(rows);
            (StatusCode::OK, Json(ApiResponse::ok(threads))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/comments - New comment or reply
async fn post_comment(State(state): State<AppState>, Json(new): Json<NewComment>) -> Response {
    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => return failure(StatusCode::INTERNAL_SERVER_ERROR, "comment store unavailable"),
    };

    match comments::insert_comment(&conn, &new) {
        Ok(comment) => (StatusCode::CREATED, Json(ApiResponse::<Comment>::ok(comment))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /api/comments/:id - Password-checked delete
async fn remove_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<DeleteRequest>,
) -> Response {
    let conn = match state.db.lock() {
        Ok(conn) => conn,
        Err(_) => return failure(StatusCode::INTERNAL_SERVER_ERROR, "comment store unavailable"),
    };

    match comments::delete_comment(&conn, id, &request.password) {
        Ok(removed) => (StatusCode::OK, Json(ApiResponse::ok(DeleteResponse { removed }))).into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/members", get(list_members))
        .route("/members/:name", get(get_member))
        .route("/comments", post(post_comment))
        // One path segment: a member name for GET, a comment id for DELETE
        .route("/comments/:key", get(get_comments).delete(remove_comment))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &Config, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disclosure::{DisclosureRecord, RawLineItem};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state() -> AppState {
        let deposit = |v: i64| RawLineItem {
            item_type: "예금".to_string(),
            current_value: v,
            ..Default::default()
        };
        let sources = DataSources {
            assembly: vec![
                DisclosureRecord { name: "박정".to_string(), affiliation: None, assets: vec![deposit(300)] },
                DisclosureRecord { name: "안철수".to_string(), affiliation: None, assets: vec![deposit(1000)] },
            ],
            officials: vec![DisclosureRecord {
                name: "김공직".to_string(),
                affiliation: Some("기획재정부".to_string()),
                assets: vec![deposit(50)],
            }],
            profiles: Vec::new(),
        };
        let conn = Connection::open_in_memory().unwrap();
        comments::setup_comments(&conn).unwrap();
        AppState::new(sources, RuleEngine::with_defaults(), conn)
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_members_ranked_and_filtered() {
        let app = router(state());

        let (status, body) = call(app.clone(), get_req("/api/members")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["name"], "안철수");
        assert_eq!(body["data"][1]["rank"], 2);

        let (_, body) = call(app.clone(), get_req("/api/members?view=government")).await;
        assert_eq!(body["data"][0]["party"], "기획재정부");
        assert_eq!(body["data"][0]["district"], "공직자");
    }

    #[tokio::test]
    async fn test_member_detail_and_missing() {
        let app = router(state());

        let (status, body) = call(app.clone(), get_req("/api/members/%EA%B9%80%EA%B3%B5%EC%A7%81")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["population"], "government");
        assert_eq!(body["data"]["net_worth"], 50);

        let (status, body) = call(app, get_req("/api/members/nobody")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_comment_round_trip() {
        let app = router(state());
        let new = serde_json::json!({
            "member_name": "nobody",
            "nickname": "citizen",
            "password": "pw",
            "content": "hello"
        });

        let (status, body) = call(app.clone(), json_req("POST", "/api/comments", new)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["data"].get("password").is_none());
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = call(app.clone(), get_req("/api/comments/nobody")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["content"], "hello");

        let uri = format!("/api/comments/{}", id);
        let (status, _) = call(app.clone(), json_req("DELETE", &uri, serde_json::json!({"password": "no"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(app, json_req("DELETE", &uri, serde_json::json!({"password": "pw"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["removed"], 1);

        let (_, body) = call(app, get_req("/api/comments/nobody")).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_comment_validation_is_bad_request() {
        let app = router(state());
        let blank = serde_json::json!({
            "member_name": "nobody",
            "nickname": "",
            "password": "pw",
            "content": "hello"
        });

        let (status, body) = call(app, json_req("POST", "/api/comments", blank)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "nickname is required");
    }
}
