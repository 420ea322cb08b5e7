//! Public form submissions: contact requests and "sell your property"
//! intakes.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use chrono::Utc;
use realty_core::{
    i18n, ContactForm, FieldError, Locale, PropertyIntakeForm, RecordId, Validate,
    ValidationErrors,
};
use serde::Serialize;
use tracing::info;

use super::created;
use crate::{
    error::{ApiError, ApiResult, Localize},
    locale::RequestLocale,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct Receipt {
    pub id: RecordId,
    pub message: String,
}

impl Receipt {
    fn new(id: RecordId, locale: Locale) -> Self {
        Self {
            id,
            message: i18n::t(locale, "form.sent").to_string(),
        }
    }
}

pub async fn submit_contact(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(form) = payload?;
    form.validate().localized(locale)?;

    if let Some(listing_id) = form.listing_id {
        if state.store.listings.get(listing_id).await?.is_none() {
            let mut errors = ValidationErrors::default();
            errors.push(FieldError::new("listing_id", "validation.unknown_value"));
            return Err(ApiError::invalid(errors, locale));
        }
    }

    let submission = state
        .store
        .contacts
        .insert(form.into_submission(locale, Utc::now()))
        .await?;
    info!(
        id = %submission.id,
        listing = ?submission.listing_id,
        locale = %locale,
        "Contact request received"
    );
    Ok(created(Receipt::new(submission.id, locale)))
}

pub async fn submit_property(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<PropertyIntakeForm>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(form) = payload?;
    form.validate().localized(locale)?;

    let intake = state
        .store
        .intakes
        .insert(form.into_intake(locale, Utc::now()))
        .await?;
    info!(
        id = %intake.id,
        category = %intake.category,
        city = %intake.city,
        "Property intake received"
    );
    Ok(created(Receipt::new(intake.id, locale)))
}
