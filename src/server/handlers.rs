use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::atlas::{Atlas, CountryView, ProvinceView};
use crate::danger::{CityDangerDetail, DangerOptions, DangerReport, ProvinceDangerDetail};
use crate::dataset::NameScheme;
use crate::error::Error;
use crate::location::ResolvedPlace;
use crate::news::NewsSelection;
use crate::summary::{CitySummary, CountrySummary, ProvinceSummary};
use crate::timeline::local_today;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::Configuration(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DataIntegrity { .. } | Error::Network(_) => StatusCode::BAD_GATEWAY,
            Error::Io(_) | Error::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Runs `f` off the async workers (lookups and timeline fetches block) and
/// logs one line per request.
async fn run<T, F>(state: Arc<AppState>, label: String, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Atlas) -> crate::Result<T> + Send + 'static,
{
    let start = Instant::now();
    let out = tokio::task::spawn_blocking(move || f(&state.atlas))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    info!(
        "[{}] GET {} -> {} ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        label,
        if out.is_ok() { "ok" } else { "error" },
        start.elapsed().as_secs_f64() * 1000.0,
    );
    out.map(Json).map_err(ApiError::from)
}

fn parse_scheme(s: Option<&str>) -> Result<NameScheme, ApiError> {
    s.map_or(Ok(NameScheme::default()), |s| {
        s.parse().map_err(|e: String| api_error(StatusCode::BAD_REQUEST, e))
    })
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("Missing '{}' parameter", name)))
}

// ─── GET /api/region ─────────────────────────────────────────────

pub async fn region(State(state): State<Arc<AppState>>) -> ApiResult<ResolvedPlace> {
    run(state, "/api/region".into(), |atlas| Ok(atlas.region())).await
}

// ─── GET /api/danger ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DangerQuery {
    pub include_cities: Option<bool>,
    pub include_counts: Option<bool>,
    pub include_danger_areas: Option<bool>,
}

pub async fn danger(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DangerQuery>,
) -> ApiResult<DangerReport> {
    let defaults = DangerOptions::default();
    let options = DangerOptions {
        include_cities: params.include_cities.unwrap_or(defaults.include_cities),
        include_counts: params.include_counts.unwrap_or(defaults.include_counts),
        include_danger_areas: params.include_danger_areas.unwrap_or(defaults.include_danger_areas),
    };
    run(state, "/api/danger".into(), move |atlas| atlas.danger(options)).await
}

// ─── GET /api/detail ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DetailQuery {
    pub province: Option<String>,
    pub city: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum DetailResponse {
    All(Vec<ProvinceDangerDetail>),
    City(CityDangerDetail),
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DetailQuery>,
) -> ApiResult<DetailResponse> {
    let label = format!("/api/detail city={}", params.city.as_deref().unwrap_or("*"));
    run(state, label, move |atlas| match params.city {
        Some(city) => atlas
            .city_detail(params.province.as_deref(), &city)
            .map(DetailResponse::City),
        None => Ok(DetailResponse::All(atlas.detail())),
    })
    .await
}

// ─── GET /api/provinces ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProvincesQuery {
    #[serde(default)]
    pub include_cities: bool,
}

pub async fn provinces(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProvincesQuery>,
) -> ApiResult<Vec<ProvinceSummary>> {
    run(state, "/api/provinces".into(), move |atlas| {
        Ok(atlas.provinces(params.include_cities))
    })
    .await
}

// ─── GET /api/province ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProvinceQuery {
    pub name: Option<String>,
    pub days: Option<u32>,
}

pub async fn province(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProvinceQuery>,
) -> ApiResult<ProvinceView> {
    let name = required(params.name, "name")?;
    let label = format!("/api/province name={}", name);
    let today = local_today();
    run(state, label, move |atlas| atlas.province(&name, params.days, today)).await
}

// ─── GET /api/city ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CityQuery {
    pub province: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub danger_counts: bool,
}

pub async fn city(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityQuery>,
) -> ApiResult<CitySummary> {
    let city = required(params.city, "city")?;
    let province = params.province.unwrap_or_default();
    let label = format!("/api/city city={}", city);
    run(state, label, move |atlas| {
        atlas.city(&province, &city, params.danger_counts)
    })
    .await
}

// ─── GET /api/world, /api/country ────────────────────────────────

#[derive(Deserialize)]
pub struct WorldQuery {
    pub scheme: Option<String>,
}

pub async fn world(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WorldQuery>,
) -> ApiResult<Vec<CountrySummary>> {
    let scheme = parse_scheme(params.scheme.as_deref())?;
    run(state, "/api/world".into(), move |atlas| Ok(atlas.world(scheme))).await
}

#[derive(Deserialize)]
pub struct CountryQuery {
    pub name: Option<String>,
    pub scheme: Option<String>,
    pub days: Option<u32>,
}

pub async fn country(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CountryQuery>,
) -> ApiResult<CountryView> {
    let name = required(params.name, "name")?;
    let scheme = parse_scheme(params.scheme.as_deref())?;
    let label = format!("/api/country name={}", name);
    let today = local_today();
    run(state, label, move |atlas| atlas.country(&name, scheme, params.days, today)).await
}

// ─── GET /api/news ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct NewsQuery {
    pub province: Option<String>,
    pub summary: Option<bool>,
}

pub async fn news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsQuery>,
) -> ApiResult<NewsSelection> {
    let show_summary = params.summary.unwrap_or(true);
    run(state, "/api/news".into(), move |atlas| {
        Ok(atlas.news(params.province.as_deref(), show_summary))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (Error::Configuration("x".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::DataIntegrity { code: "x".into() }, StatusCode::BAD_GATEWAY),
            (Error::Network("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            let ApiError(got, _) = ApiError::from(err);
            assert_eq!(got, status);
        }
    }

    #[test]
    fn test_parse_scheme_defaults_to_native() {
        assert_eq!(parse_scheme(None).ok(), Some(NameScheme::Native));
        assert_eq!(parse_scheme(Some("en")).ok(), Some(NameScheme::Latin));
        assert!(parse_scheme(Some("klingon")).is_err());
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(required(None, "name").is_err());
        assert!(required(Some("  ".into()), "name").is_err());
        assert_eq!(required(Some(" 上海 ".into()), "name").ok().as_deref(), Some("上海"));
    }
}
