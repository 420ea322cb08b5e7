use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use realty_core::Locale;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LangParam {
    lang: Option<String>,
}

/// Locale of the current request: `?lang=` first, then `Accept-Language`,
/// then the configured site default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

impl RequestLocale {
    pub fn resolve(parts: &Parts, default: Locale) -> Locale {
        let explicit = Query::<LangParam>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(param)| param.lang)
            .and_then(|lang| Locale::parse(&lang));
        if let Some(locale) = explicit {
            return locale;
        }

        parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(|value| Locale::negotiate(value, default))
            .unwrap_or(default)
    }
}

impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(Self::resolve(parts, state.settings.site.default_locale)))
    }
}
