use crate::{
    event::RunId,
    event_log::{self, LogEvent, WithOffset},
    render,
    service::{
        AnalyticsError, ContactForm, ContactResponse, DashboardData, PageView,
        PlayerState, SharedAnalyticsClient, SharedDemoPlayer,
    },
    timeline::{scenarios, Bid, LogEntry, Scenario, ScenarioId, ScenarioParseError, Stage},
};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{future::Future, net::SocketAddr, time::Duration};
use tracing::{info, warn};

const DEFAULT_EVENTS_LIMIT: usize = 100;
const MAX_EVENTS_WAIT: Duration = Duration::from_secs(30);

/// The HTTP surface of the demo page
#[derive(Clone)]
pub struct Ui {
    player: SharedDemoPlayer,
    event_reader: event_log::SharedReader,
    analytics: SharedAnalyticsClient,
}

impl Ui {
    pub fn new(
        player: SharedDemoPlayer,
        event_reader: event_log::SharedReader,
        analytics: SharedAnalyticsClient,
    ) -> Self {
        Self {
            player,
            event_reader,
            analytics,
        }
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/demo", get(demo_page))
            .route("/api/demo", get(demo_state))
            .route("/api/demo/timeline", get(demo_timeline))
            .route("/api/demo/start", post(demo_start))
            .route("/api/demo/reset", post(demo_reset))
            .route("/api/demo/scenario", post(demo_scenario))
            .route("/api/demo/events", get(demo_events))
            .route("/api/contact", post(contact))
            .route("/api/analytics/dashboard", get(dashboard))
            .with_state(self)
    }

    /// Serve until `shutdown` resolves
    pub async fn serve(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let player = self.player.clone();
        let server = axum::Server::try_bind(&addr)
            .with_context(|| format!("Failed to bind {addr}"))?
            .serve(self.router().into_make_service());

        info!(addr = %server.local_addr(), "demo site listening");
        server
            .with_graceful_shutdown(shutdown)
            .await
            .context("Failed to run http server")?;

        player.reset();
        info!("demo site stopped");
        Ok(())
    }
}

/// Error body shared by every route: `{success: false, error}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ContactResponse {
                success: false,
                error: Some(self.message),
            }),
        )
            .into_response()
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        let status = match &e {
            AnalyticsError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
            AnalyticsError::MissingApiKey => StatusCode::UNAUTHORIZED,
            AnalyticsError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            AnalyticsError::Rejected { status, .. } if *status >= 500 => StatusCode::BAD_GATEWAY,
            AnalyticsError::Rejected { .. } => StatusCode::BAD_REQUEST,
            AnalyticsError::Status(401) | AnalyticsError::Status(403) => StatusCode::UNAUTHORIZED,
            AnalyticsError::Status(_) | AnalyticsError::Http(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Report a page view without holding up the page
fn track_page_view(analytics: &SharedAnalyticsClient, page: &str, headers: &HeaderMap) {
    let view = PageView {
        page: page.to_owned(),
        user_agent: header_str(headers, header::USER_AGENT),
        referrer: header_str(headers, header::REFERER),
    };
    let analytics = analytics.clone();
    tokio::spawn(async move {
        if let Err(e) = analytics.track_page_view(&view).await {
            warn!(page = %view.page, %e, "failed to track page view");
        }
    });
}

async fn demo_page(State(ui): State<Ui>, headers: HeaderMap) -> impl IntoResponse {
    track_page_view(&ui.analytics, "/demo", &headers);
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render::render(ui.player.timeline(), &ui.player.state()),
    )
}

async fn demo_state(State(ui): State<Ui>) -> Json<PlayerState> {
    Json(ui.player.state())
}

#[derive(Debug, Serialize)]
struct TimelineResponse<'a> {
    stages: &'a [Stage],
    bids: &'a [Bid],
    log: &'a [LogEntry],
    scenarios: [Scenario; 3],
}

async fn demo_timeline(State(ui): State<Ui>) -> Response {
    let timeline = ui.player.timeline();
    Json(TimelineResponse {
        stages: timeline.stages(),
        bids: timeline.bids(),
        log: timeline.log(),
        scenarios: scenarios(),
    })
    .into_response()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub run: RunId,
}

async fn demo_start(State(ui): State<Ui>) -> Json<StartResponse> {
    Json(StartResponse {
        run: ui.player.start(),
    })
}

async fn demo_reset(State(ui): State<Ui>) -> Json<PlayerState> {
    ui.player.reset();
    Json(ui.player.state())
}

#[derive(Debug, Deserialize)]
struct ScenarioRequest {
    scenario: String,
}

async fn demo_scenario(
    State(ui): State<Ui>,
    Json(req): Json<ScenarioRequest>,
) -> Result<Json<PlayerState>, ApiError> {
    let scenario: ScenarioId = req
        .scenario
        .parse()
        .map_err(|e: ScenarioParseError| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
    ui.player.select_scenario(scenario);
    Ok(Json(ui.player.state()))
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    offset: Option<event_log::Offset>,
    limit: Option<usize>,
    wait_ms: Option<u64>,
}

async fn demo_events(
    State(ui): State<Ui>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<WithOffset<Vec<LogEvent>>>, ApiError> {
    let offset = match query.offset {
        Some(offset) => offset,
        None => ui
            .event_reader
            .get_start_offset()
            .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    };
    let timeout = query
        .wait_ms
        .map(|ms| Duration::from_millis(ms).min(MAX_EVENTS_WAIT));

    let events = ui
        .event_reader
        .read(offset, query.limit.unwrap_or(DEFAULT_EVENTS_LIMIT), timeout)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(events))
}

async fn contact(
    State(ui): State<Ui>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ContactResponse>, ApiError> {
    form.validate().map_err(AnalyticsError::from)?;
    Ok(Json(ui.analytics.submit_contact(&form).await?))
}

async fn dashboard(
    State(ui): State<Ui>,
    headers: HeaderMap,
) -> Result<Json<DashboardData>, ApiError> {
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Ok(Json(ui.analytics.fetch_dashboard(api_key).await?))
}
