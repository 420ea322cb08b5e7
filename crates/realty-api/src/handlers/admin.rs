//! Admin panel endpoints. Everything here except `login` sits behind
//! [`crate::auth::require_admin`].

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::Response,
    Json,
};
use chrono::Utc;
use realty_core::{
    Agent, AgentInput, ContactSubmission, Destination, DestinationInput, FieldError, Listing,
    ListingInput, ListingStatus, Locale, Office, OfficeInput, PropertyIntake, RecordId,
    StatusUpdate, SubmissionStatus, Validate, ValidationErrors,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::created;
use crate::{
    auth::IssuedToken,
    error::{ApiError, ApiResult, Localize},
    locale::RequestLocale,
    state::AppState,
};

/// Record id taken from the path, rejected as JSON like every other error.
pub struct RecordPath(pub RecordId);

impl<S: Send + Sync> FromRequestParts<S> for RecordPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<RecordId>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(id))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<IssuedToken>> {
    let Json(request) = payload?;
    let auth = state.auth.clone();
    // Password hashing blocks; run it on the blocking pool.
    let issued = tokio::task::spawn_blocking(move || {
        auth.login(&request.username, &request.password)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("login task failed: {e}")))??;
    Ok(Json(issued))
}

fn unknown_reference(errors: &mut ValidationErrors, field: &str) {
    errors.push(FieldError::new(field, "validation.unknown_value"));
}

fn ensure_slug(errors: &mut ValidationErrors, field: &str, slug: &str) {
    if slug.is_empty() {
        errors.push(FieldError::new(field, "validation.slug"));
    }
}

fn ensure_unique<'a>(
    entity: &str,
    id: RecordId,
    slug: &str,
    existing: impl IntoIterator<Item = (RecordId, &'a str)>,
) -> ApiResult<()> {
    if existing
        .into_iter()
        .any(|(other, taken)| other != id && taken == slug)
    {
        return Err(ApiError::Conflict(format!(
            "{entity} slug '{slug}' is already in use"
        )));
    }
    Ok(())
}

fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
}

// ---------------------------------------------------------------------------
// Listings

async fn check_listing(state: &AppState, listing: &Listing, locale: Locale) -> ApiResult<()> {
    let mut errors = ValidationErrors::default();
    for l in Locale::ALL {
        ensure_slug(&mut errors, &format!("slug.{l}"), listing.slug.exact(l));
    }
    if let Some(agent_id) = listing.agent_id {
        if state.store.agents.get(agent_id).await?.is_none() {
            unknown_reference(&mut errors, "agent_id");
        }
    }
    if let Some(destination_id) = listing.destination_id {
        if state.store.destinations.get(destination_id).await?.is_none() {
            unknown_reference(&mut errors, "destination_id");
        }
    }
    errors.into_result().localized(locale)?;

    // Slugs are unique per locale; the same word may appear in both tables.
    let existing = state.store.listings.list().await?;
    for l in Locale::ALL {
        ensure_unique(
            "listing",
            listing.id,
            listing.slug.exact(l),
            existing.iter().map(|other| (other.id, other.slug.exact(l))),
        )?;
    }
    Ok(())
}

pub async fn list_listings(State(state): State<AppState>) -> ApiResult<Json<Vec<Listing>>> {
    let mut listings = state.store.listings.list().await?;
    newest_first(&mut listings, |l| l.updated_at);
    Ok(Json(listings))
}

pub async fn get_listing(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<Json<Listing>> {
    Ok(Json(state.store.listings.require(id).await?))
}

pub async fn create_listing(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<ListingInput>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(input) = payload?;
    input.validate().localized(locale)?;

    let _writes = state.admin_writes.lock().await;
    let listing = input.into_listing(Utc::now());
    check_listing(&state, &listing, locale).await?;
    let listing = state.store.listings.insert(listing).await?;
    info!(id = %listing.id, slug = %listing.slug.en, status = %listing.status, "Listing created");
    Ok(created(listing))
}

pub async fn update_listing(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RecordPath(id): RecordPath,
    payload: Result<Json<ListingInput>, JsonRejection>,
) -> ApiResult<Json<Listing>> {
    let Json(input) = payload?;
    input.validate().localized(locale)?;

    let _writes = state.admin_writes.lock().await;
    let mut listing = state.store.listings.require(id).await?;
    input.apply_to(&mut listing, Utc::now());
    check_listing(&state, &listing, locale).await?;
    let listing = state.store.listings.update(listing).await?;
    info!(id = %listing.id, status = %listing.status, "Listing updated");
    Ok(Json(listing))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<StatusCode> {
    state.store.listings.delete(id).await?;
    info!(%id, "Listing deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Agents

async fn check_agent(state: &AppState, agent: &Agent, locale: Locale) -> ApiResult<()> {
    let mut errors = ValidationErrors::default();
    ensure_slug(&mut errors, "slug", &agent.slug);
    if let Some(office_id) = agent.office_id {
        if state.store.offices.get(office_id).await?.is_none() {
            unknown_reference(&mut errors, "office_id");
        }
    }
    errors.into_result().localized(locale)?;

    let existing = state.store.agents.list().await?;
    ensure_unique(
        "agent",
        agent.id,
        &agent.slug,
        existing.iter().map(|a| (a.id, a.slug.as_str())),
    )
}

pub async fn list_agents(State(state): State<AppState>) -> ApiResult<Json<Vec<Agent>>> {
    let mut agents = state.store.agents.list().await?;
    agents.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(agents))
}

pub async fn get_agent(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<Json<Agent>> {
    Ok(Json(state.store.agents.require(id).await?))
}

pub async fn create_agent(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<AgentInput>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(input) = payload?;
    input.validate().localized(locale)?;

    let _writes = state.admin_writes.lock().await;
    let agent = input.into_agent(Utc::now());
    check_agent(&state, &agent, locale).await?;
    let agent = state.store.agents.insert(agent).await?;
    info!(id = %agent.id, slug = %agent.slug, "Agent created");
    Ok(created(agent))
}

pub async fn update_agent(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RecordPath(id): RecordPath,
    payload: Result<Json<AgentInput>, JsonRejection>,
) -> ApiResult<Json<Agent>> {
    let Json(input) = payload?;
    input.validate().localized(locale)?;

    let _writes = state.admin_writes.lock().await;
    let mut agent = state.store.agents.require(id).await?;
    input.apply_to(&mut agent);
    check_agent(&state, &agent, locale).await?;
    Ok(Json(state.store.agents.update(agent).await?))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<StatusCode> {
    let _writes = state.admin_writes.lock().await;
    state.store.agents.require(id).await?;
    let assigned = state
        .store
        .listings
        .list()
        .await?
        .iter()
        .filter(|l| l.agent_id == Some(id))
        .count();
    if assigned > 0 {
        return Err(ApiError::Conflict(format!(
            "agent still has {assigned} listing(s); reassign them first"
        )));
    }
    state.store.agents.delete(id).await?;
    info!(%id, "Agent deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Offices

async fn check_office(state: &AppState, office: &Office, locale: Locale) -> ApiResult<()> {
    let mut errors = ValidationErrors::default();
    ensure_slug(&mut errors, "slug", &office.slug);
    errors.into_result().localized(locale)?;

    let existing = state.store.offices.list().await?;
    ensure_unique(
        "office",
        office.id,
        &office.slug,
        existing.iter().map(|o| (o.id, o.slug.as_str())),
    )
}

pub async fn list_offices(State(state): State<AppState>) -> ApiResult<Json<Vec<Office>>> {
    let mut offices = state.store.offices.list().await?;
    offices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(offices))
}

pub async fn get_office(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<Json<Office>> {
    Ok(Json(state.store.offices.require(id).await?))
}

pub async fn create_office(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<OfficeInput>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(input) = payload?;
    input.validate().localized(locale)?;

    let _writes = state.admin_writes.lock().await;
    let office = input.into_office(Utc::now());
    check_office(&state, &office, locale).await?;
    let office = state.store.offices.insert(office).await?;
    info!(id = %office.id, slug = %office.slug, "Office created");
    Ok(created(office))
}

pub async fn update_office(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RecordPath(id): RecordPath,
    payload: Result<Json<OfficeInput>, JsonRejection>,
) -> ApiResult<Json<Office>> {
    let Json(input) = payload?;
    input.validate().localized(locale)?;

    let _writes = state.admin_writes.lock().await;
    let mut office = state.store.offices.require(id).await?;
    input.apply_to(&mut office);
    check_office(&state, &office, locale).await?;
    Ok(Json(state.store.offices.update(office).await?))
}

pub async fn delete_office(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<StatusCode> {
    let _writes = state.admin_writes.lock().await;
    state.store.offices.require(id).await?;
    let staffed = state
        .store
        .agents
        .list()
        .await?
        .iter()
        .filter(|a| a.office_id == Some(id))
        .count();
    if staffed > 0 {
        return Err(ApiError::Conflict(format!(
            "office still has {staffed} agent(s); move them first"
        )));
    }
    state.store.offices.delete(id).await?;
    info!(%id, "Office deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Destinations

async fn check_destination(
    state: &AppState,
    destination: &Destination,
    locale: Locale,
) -> ApiResult<()> {
    let mut errors = ValidationErrors::default();
    ensure_slug(&mut errors, "slug", &destination.slug);
    errors.into_result().localized(locale)?;

    let existing = state.store.destinations.list().await?;
    ensure_unique(
        "destination",
        destination.id,
        &destination.slug,
        existing.iter().map(|d| (d.id, d.slug.as_str())),
    )
}

pub async fn list_destinations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Destination>>> {
    let mut destinations = state.store.destinations.list().await?;
    destinations.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(Json(destinations))
}

pub async fn get_destination(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<Json<Destination>> {
    Ok(Json(state.store.destinations.require(id).await?))
}

pub async fn create_destination(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<DestinationInput>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(input) = payload?;
    input.validate().localized(locale)?;

    let _writes = state.admin_writes.lock().await;
    let destination = input.into_destination(Utc::now());
    check_destination(&state, &destination, locale).await?;
    let destination = state.store.destinations.insert(destination).await?;
    info!(id = %destination.id, slug = %destination.slug, "Destination created");
    Ok(created(destination))
}

pub async fn update_destination(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RecordPath(id): RecordPath,
    payload: Result<Json<DestinationInput>, JsonRejection>,
) -> ApiResult<Json<Destination>> {
    let Json(input) = payload?;
    input.validate().localized(locale)?;

    let _writes = state.admin_writes.lock().await;
    let mut destination = state.store.destinations.require(id).await?;
    input.apply_to(&mut destination);
    check_destination(&state, &destination, locale).await?;
    Ok(Json(state.store.destinations.update(destination).await?))
}

pub async fn delete_destination(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<StatusCode> {
    let _writes = state.admin_writes.lock().await;
    state.store.destinations.require(id).await?;
    let linked = state
        .store
        .listings
        .list()
        .await?
        .iter()
        .filter(|l| l.destination_id == Some(id))
        .count();
    if linked > 0 {
        return Err(ApiError::Conflict(format!(
            "destination still has {linked} listing(s)"
        )));
    }
    state.store.destinations.delete(id).await?;
    info!(%id, "Destination deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Submissions

pub async fn list_contacts(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ContactSubmission>>> {
    let mut contacts = state.store.contacts.list().await?;
    newest_first(&mut contacts, |c| c.created_at);
    Ok(Json(contacts))
}

pub async fn update_contact(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Json<ContactSubmission>> {
    let Json(StatusUpdate { status }) = payload?;
    let mut contact = state.store.contacts.require(id).await?;
    contact.status = status;
    let contact = state.store.contacts.update(contact).await?;
    info!(%id, status = %contact.status, "Contact request updated");
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<StatusCode> {
    state.store.contacts.delete(id).await?;
    info!(%id, "Contact request deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_intakes(State(state): State<AppState>) -> ApiResult<Json<Vec<PropertyIntake>>> {
    let mut intakes = state.store.intakes.list().await?;
    newest_first(&mut intakes, |i| i.created_at);
    Ok(Json(intakes))
}

pub async fn update_intake(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Json<PropertyIntake>> {
    let Json(StatusUpdate { status }) = payload?;
    let mut intake = state.store.intakes.require(id).await?;
    intake.status = status;
    let intake = state.store.intakes.update(intake).await?;
    info!(%id, status = %intake.status, "Property intake updated");
    Ok(Json(intake))
}

pub async fn delete_intake(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> ApiResult<StatusCode> {
    state.store.intakes.delete(id).await?;
    info!(%id, "Property intake deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Dashboard

#[derive(Debug, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
}

impl StatusCounts {
    fn count(all: &[&'static str], statuses: impl IntoIterator<Item = &'static str>) -> Self {
        let mut by_status: BTreeMap<&'static str, usize> =
            all.iter().map(|status| (*status, 0)).collect();
        let mut total = 0;
        for status in statuses {
            *by_status.entry(status).or_default() += 1;
            total += 1;
        }
        Self { total, by_status }
    }
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub listings: StatusCounts,
    pub agents: usize,
    pub offices: usize,
    pub destinations: usize,
    pub contacts: StatusCounts,
    pub intakes: StatusCounts,
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    let listing_statuses: Vec<&'static str> =
        ListingStatus::ALL.iter().map(|s| s.as_str()).collect();
    let submission_statuses: Vec<&'static str> =
        SubmissionStatus::ALL.iter().map(|s| s.as_str()).collect();

    let listings = state.store.listings.list().await?;
    let contacts = state.store.contacts.list().await?;
    let intakes = state.store.intakes.list().await?;

    Ok(Json(Stats {
        listings: StatusCounts::count(
            &listing_statuses,
            listings.iter().map(|l| l.status.as_str()),
        ),
        agents: state.store.agents.list().await?.len(),
        offices: state.store.offices.list().await?.len(),
        destinations: state.store.destinations.list().await?.len(),
        contacts: StatusCounts::count(
            &submission_statuses,
            contacts.iter().map(|c| c.status.as_str()),
        ),
        intakes: StatusCounts::count(
            &submission_statuses,
            intakes.iter().map(|i| i.status.as_str()),
        ),
    }))
}
