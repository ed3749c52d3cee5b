use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::dashboard::{ArticleCard, Dashboard};
use crate::db::ALL_CATEGORIES;
use crate::error::DashboardError;

pub struct AppState {
    pub dashboard: Dashboard,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/categories", get(api_categories))
        .route("/api/articles", get(api_articles))
        .route("/health", get(health))
        .with_state(state)
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub categories: Vec<String>,
    pub selected: String,
    pub cards: Vec<ArticleCard>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub message: String,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

fn status_for(err: &DashboardError) -> StatusCode {
    if err.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// A data-access failure rendered as the error page.
pub struct AppError(DashboardError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Render failed: {}", self.0);
        let status = status_for(&self.0);
        let page = HtmlTemplate(ErrorTemplate {
            message: self.0.to_string(),
        });
        (status, page).into_response()
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        AppError(err)
    }
}

/// A data-access failure rendered as a JSON body.
pub struct ApiError(DashboardError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("API request failed: {}", self.0);
        let status = status_for(&self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        ApiError(err)
    }
}

#[derive(Deserialize)]
pub struct IndexQuery {
    pub category: Option<String>,
}

impl IndexQuery {
    /// The single selected category, uppercased; `All` when absent.
    pub fn selected(&self) -> String {
        normalize_category(self.category.as_deref().unwrap_or_default().trim())
    }
}

#[derive(Deserialize)]
pub struct ArticlesQuery {
    /// Comma-separated category list.
    pub categories: Option<String>,
}

impl ArticlesQuery {
    pub fn selected(&self) -> Vec<String> {
        self.categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(normalize_category)
            .collect()
    }
}

/// Uppercases a requested category; any casing of `all`, or nothing, selects `All`.
fn normalize_category(category: &str) -> String {
    if category.is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES) {
        ALL_CATEGORIES.to_string()
    } else {
        category.to_uppercase()
    }
}

// Route handlers
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> Result<impl IntoResponse, AppError> {
    let categories = state.dashboard.list_categories().await?;
    let selected = query.selected();
    let cards = state.dashboard.fetch_cards(&[selected.as_str()]).await?;

    Ok(HtmlTemplate(IndexTemplate {
        categories,
        selected,
        cards,
    }))
}

pub async fn api_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.dashboard.list_categories().await?))
}

pub async fn api_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<Vec<ArticleCard>>, ApiError> {
    let cards = state.dashboard.fetch_cards(&query.selected()).await?;
    Ok(Json(cards))
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
