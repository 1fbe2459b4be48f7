use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use engine::query::{parse_date, parse_distance_km};
use engine::{
    BoundingBox, CategoryCount, Engine, EngineError, Event, GeoPoint, MapResponse, SearchResponse, SortMode,
    StatsOverview,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Query string of `/api/events/search`. Everything arrives as text so that
/// empty values can be treated as absent and bad numbers reported as 400s.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub price_max: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub distance: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapParams {
    pub top_lat: Option<String>,
    pub bottom_lat: Option<String>,
    pub left_lon: Option<String>,
    pub right_lon: Option<String>,
    pub category: Option<String>,
}

/// Engine errors rendered as `{"error": "..."}` with a matching status.
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::IndexUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::Corrupted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub fn build_app(engine: Arc<Engine>) -> Result<Router> {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/events/search", get(search_handler))
        .route("/api/events/map", get(map_handler))
        .route("/api/events/categories", get(categories_handler))
        .route("/api/events/stats/overview", get(stats_handler))
        .route("/api/events/:id", get(event_handler))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

async fn health_handler(State(engine): State<Arc<Engine>>) -> Json<serde_json::Value> {
    let num_docs = engine.snapshot().map(|s| s.num_docs()).ok();
    Json(serde_json::json!({
        "status": "ok",
        "loaded": num_docs.is_some(),
        "num_docs": num_docs.unwrap_or(0),
    }))
}

pub async fn search_handler(
    State(engine): State<Arc<Engine>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<SearchResponse> {
    let query = params.into_query()?;
    Ok(Json(engine.search(&query)?))
}

pub async fn map_handler(
    State(engine): State<Arc<Engine>>,
    Query(params): Query<MapParams>,
) -> ApiResult<MapResponse> {
    let bbox = BoundingBox::from_edges(
        number(&params.top_lat, "top_lat")?,
        number(&params.bottom_lat, "bottom_lat")?,
        number(&params.left_lon, "left_lon")?,
        number(&params.right_lon, "right_lon")?,
    )?;
    Ok(Json(engine.search_within_box(&bbox, present(&params.category))?))
}

async fn categories_handler(State(engine): State<Arc<Engine>>) -> ApiResult<Vec<CategoryCount>> {
    Ok(Json(engine.list_categories()?))
}

async fn stats_handler(State(engine): State<Arc<Engine>>) -> ApiResult<StatsOverview> {
    Ok(Json(engine.stats_overview()?))
}

async fn event_handler(State(engine): State<Arc<Engine>>, Path(id): Path<String>) -> ApiResult<Event> {
    Ok(Json(engine.get_by_id(&id)?))
}

impl SearchParams {
    pub fn into_query(self) -> Result<engine::Query, EngineError> {
        let mut query = engine::Query::text(present(&self.q).unwrap_or_default());
        query.category = present(&self.category).map(str::to_string);
        query.city = present(&self.city).map(str::to_string);
        query.country = present(&self.country).map(str::to_string);

        let from = present(&self.date_from).map(parse_date).transpose()?;
        let to = present(&self.date_to).map(parse_date).transpose()?;
        if from.is_some() || to.is_some() {
            query = query.with_dates(from, to);
        }
        if let Some(max) = number::<f64>(&self.price_max, "price_max")? {
            query = query.with_price_max(max);
        }

        let lat = number::<f64>(&self.lat, "lat")?;
        let lon = number::<f64>(&self.lon, "lon")?;
        let radius = present(&self.distance).map(parse_distance_km).transpose()?;
        match (lat, lon) {
            (Some(lat), Some(lon)) => query = query.with_origin(GeoPoint::new(lat, lon), radius),
            (None, None) => {}
            _ => return Err(EngineError::validation("lat and lon must be given together")),
        }

        let page = number::<i64>(&self.page, "page")?.unwrap_or(1);
        let size = number::<i64>(&self.size, "size")?.unwrap_or(20);
        if page < 1 {
            return Err(EngineError::validation(format!("page must be at least 1, got {page}")));
        }
        if size < 1 {
            return Err(EngineError::validation(format!("size must be at least 1, got {size}")));
        }
        query = query.with_page(page as usize, size as usize);

        if let Some(sort) = present(&self.sort) {
            query = query.with_sort(SortMode::parse(sort));
        }
        Ok(query)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn number<T: FromStr>(value: &Option<String>, name: &str) -> Result<Option<T>, EngineError> {
    present(value)
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| EngineError::validation(format!("{name} is not a number: {s:?}")))
        })
        .transpose()
}
