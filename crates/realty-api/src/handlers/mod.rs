pub mod admin;
pub mod forms;
pub mod site;
pub mod views;

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH, VARY},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use realty_core::{DatabaseBackend, Listing, RealtyError, Store};
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::{error::ApiResult, state::AppState};

pub use forms::*;
pub use site::*;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let backend = match state.settings.database.backend {
        DatabaseBackend::Memory => "memory",
        DatabaseBackend::Rest => "rest",
    };
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": backend,
        "admin_enabled": state.auth.enabled(),
    }))
}

/// Listings visitors may see.
pub(crate) async fn public_listings(store: &Store) -> ApiResult<Vec<Listing>> {
    Ok(store
        .listings
        .list()
        .await?
        .into_iter()
        .filter(|listing| listing.status.is_public())
        .collect())
}

pub(crate) fn created<T: Serialize>(body: T) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

fn etag_for(bytes: &[u8]) -> String {
    format!("\"{:x}\"", Sha256::digest(bytes))
}

fn etag_matches(request_headers: &HeaderMap, etag: &str) -> bool {
    request_headers
        .get(IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value.split(',').map(str::trim).any(|candidate| {
                candidate == "*" || candidate.trim_start_matches("W/") == etag
            })
        })
}

/// Serializes `body` with a content hash `ETag`, answering 304 when the
/// client already holds the same representation.
pub(crate) fn cached_json<T: Serialize>(
    body: &T,
    request_headers: &HeaderMap,
) -> ApiResult<Response> {
    let bytes = serde_json::to_vec(body).map_err(RealtyError::from)?;
    let etag = etag_for(&bytes);

    let mut response = if etag_matches(request_headers, &etag) {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        (
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            Bytes::from(bytes),
        )
            .into_response()
    };

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(ETAG, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=60"));
    headers.insert(VARY, HeaderValue::from_static("accept-language"));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_quoted_sha256() {
        let etag = etag_for(b"{}");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), 64 + 2);
        assert_eq!(etag, etag_for(b"{}"));
        assert_ne!(etag, etag_for(b"[]"));
    }

    #[test]
    fn if_none_match_accepts_lists_and_weak_tags() {
        let etag = etag_for(b"body");
        let mut headers = HeaderMap::new();
        assert!(!etag_matches(&headers, &etag));

        headers.insert(
            IF_NONE_MATCH,
            HeaderValue::from_str(&format!("\"other\", W/{etag}")).unwrap(),
        );
        assert!(etag_matches(&headers, &etag));

        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("\"stale\""));
        assert!(!etag_matches(&headers, &etag));
    }

    #[test]
    fn not_modified_keeps_etag() {
        let body = json!({"listings": []});
        let first = cached_json(&body, &HeaderMap::new()).unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let etag = first.headers().get(ETAG).unwrap().clone();

        let mut headers = HeaderMap::new();
        headers.insert(IF_NONE_MATCH, etag.clone());
        let second = cached_json(&body, &headers).unwrap();
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(second.headers().get(ETAG), Some(&etag));
    }
}
