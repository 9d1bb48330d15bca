use crate::config::AppConfig;
use crate::data;
use crate::filter;
use crate::html::dashboard::DASHBOARD_HTML;
use crate::render;
use crate::session::SessionContext;
use anyhow::Result;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub config: AppConfig,
    /// Pre-serialized once at startup; the boundary never changes.
    pub boundary_geojson: String,
    pub session: RwLock<SessionContext>,
}

pub async fn start_server(config: AppConfig, boundary: MultiPolygon<f64>) -> Result<()> {
    let boundary_geojson = render::boundary_geojson(&boundary)?;

    let state = Arc::new(AppState {
        session: RwLock::new(SessionContext::new(&config.columns)),
        boundary_geojson,
        config,
    });

    let port = state.config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/", get(dashboard_handler))
        .route("/map", get(map_handler))
        .route("/api/upload", post(upload_handler))
        .route("/api/schema", get(schema_handler))
        .route("/api/table", get(table_handler))
        .route("/api/filter/column", post(add_filter_column_handler))
        .route("/api/filter/values", post(set_filter_values_handler))
        .route("/api/filter/years", post(set_year_range_handler))
        .route("/api/options", post(set_options_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// Raw CSV body upload. A malformed file fails this interaction outright and
/// leaves the previous record set untouched; the user must re-upload.
async fn upload_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<StatusCode, (StatusCode, String)> {
    let set = data::load_records(body.as_bytes(), &state.config.columns)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("{e:#}")))?;

    tracing::info!(rows = set.records.len(), "upload accepted");
    state.session.write().await.replace_records(set);
    Ok(StatusCode::OK)
}

#[derive(Serialize)]
struct FilterState {
    column: String,
    options: Vec<String>,
    selected: Vec<String>,
}

#[derive(Serialize)]
struct SchemaResponse {
    uploaded: bool,
    columns: Vec<String>,
    year_bounds: Option<(i32, i32)>,
    year_range: Option<(i32, i32)>,
    filters: Vec<FilterState>,
    popup_fields: Vec<String>,
    clustering: bool,
    matching: usize,
}

/// Everything the dashboard UI needs to draw its controls.
async fn schema_handler(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let session = state.session.read().await;

    let (columns, year_bounds, filters) = match &session.records {
        Some(set) => {
            let filters = session
                .filters
                .categorical
                .iter()
                .map(|(column, selected)| FilterState {
                    column: column.clone(),
                    options: filter::distinct_values(set, column).into_iter().collect(),
                    selected: selected.iter().cloned().collect(),
                })
                .collect();
            (set.columns.clone(), filter::year_bounds(set), filters)
        }
        None => (Vec::new(), None, Vec::new()),
    };

    Json(SchemaResponse {
        uploaded: session.records.is_some(),
        columns,
        year_bounds,
        year_range: session.filters.year_range,
        filters,
        popup_fields: session.popup_fields.clone(),
        clustering: session.clustering,
        matching: session.filtered().len(),
    })
}

#[derive(Deserialize)]
struct AddColumnRequest {
    column: String,
}

async fn add_filter_column_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddColumnRequest>,
) -> StatusCode {
    tracing::info!(column = %req.column, "filter column added");
    state.session.write().await.add_filter_column(&req.column);
    StatusCode::OK
}

#[derive(Deserialize)]
struct SetValuesRequest {
    column: String,
    values: BTreeSet<String>,
}

async fn set_filter_values_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetValuesRequest>,
) -> StatusCode {
    tracing::info!(column = %req.column, selected = req.values.len(), "filter values updated");
    state
        .session
        .write()
        .await
        .set_filter_values(&req.column, req.values);
    StatusCode::OK
}

#[derive(Deserialize)]
struct YearRangeRequest {
    min: i32,
    max: i32,
}

async fn set_year_range_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<YearRangeRequest>,
) -> StatusCode {
    tracing::info!(min = req.min, max = req.max, "year range updated");
    state.session.write().await.set_year_range(req.min, req.max);
    StatusCode::OK
}

#[derive(Deserialize)]
struct OptionsRequest {
    clustering: Option<bool>,
    popup_fields: Option<Vec<String>>,
}

async fn set_options_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OptionsRequest>,
) -> StatusCode {
    tracing::info!(
        clustering = ?req.clustering,
        popup_fields = ?req.popup_fields,
        "render options updated"
    );
    let mut session = state.session.write().await;
    if let Some(clustering) = req.clustering {
        session.clustering = clustering;
    }
    if let Some(fields) = req.popup_fields {
        session.popup_fields = fields;
    }
    StatusCode::OK
}

/// The rendered map for the current filtered subset. An empty subset yields
/// an advisory page instead of a map.
async fn map_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let session = state.session.read().await;

    if session.records.is_none() {
        return Ok(Html(advisory_page("Upload a CSV file to see the map.")));
    }

    let filtered = session.filtered();
    if filtered.is_empty() {
        return Ok(Html(advisory_page(
            "No records match the selected filters. Try different filters.",
        )));
    }

    let markers = render::build_markers(&filtered, &state.config.columns, &session.popup_fields);
    let html = render::render_map(
        &state.boundary_geojson,
        &markers,
        session.clustering,
        &state.config.map,
    )
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;

    Ok(Html(html))
}

async fn table_handler(State(state): State<Arc<AppState>>) -> Json<render::TableView> {
    let session = state.session.read().await;
    let view = match &session.records {
        Some(set) => render::table_view(&set.columns, &session.filtered()),
        None => render::TableView {
            columns: Vec::new(),
            rows: Vec::new(),
        },
    };
    Json(view)
}

fn advisory_page(message: &str) -> String {
    format!(
        "<!doctype html><html><body style=\"font-family: system-ui, sans-serif; \
         display: flex; align-items: center; justify-content: center; height: 100vh;\">\
         <p>{message}</p></body></html>"
    )
}
