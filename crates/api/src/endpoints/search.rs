//! Blog search endpoint.

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use inkpost_common::{AppError, AppResult};
use inkpost_core::BlogSummary;
use serde::Deserialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Accepts the keyword as `q` or `Q`. When both are sent, `q` wins.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "Q")]
    pub upper_q: Option<String>,
}

impl SearchQuery {
    fn keyword(self) -> String {
        self.q.or(self.upper_q).unwrap_or_default()
    }
}

/// Search blogs by title or content. An empty query lists everything.
async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<BlogSummary>>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let blogs = state.blog_service.search(&query.keyword()).await?;
    Ok(ApiResponse::ok(blogs))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Uri;

    fn parse(raw: &str) -> SearchQuery {
        let uri: Uri = format!("/search?{raw}").parse().unwrap();
        Query::<SearchQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_keyword_prefers_lowercase() {
        assert_eq!(parse("q=rust&Q=python").keyword(), "rust");
        assert_eq!(parse("Q=python").keyword(), "python");
        assert_eq!(parse("").keyword(), "");
    }
}
