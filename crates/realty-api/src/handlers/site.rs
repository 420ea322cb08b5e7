//! Read-only endpoints behind the public pages.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use realty_core::{
    filter::{self, Facets},
    i18n,
    routing::{self, Page, RouteMatch},
    Agent, Destination, Listing, ListingFilter, ListingQuery, ListingSort, Locale, Office,
    RealtyError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::{
    cached_json, public_listings,
    views::{
        listing_alternates, shared_alternates, AgentCard, AgentDetail, DestinationCard,
        DestinationDetail, ListingCard, ListingDetail, OfficeCard, OfficeDetail,
    },
};
use crate::{
    error::{ApiError, ApiResult, Localize},
    locale::RequestLocale,
    state::AppState,
};

const HOME_FEATURED: usize = 6;
const SIMILAR_LIMIT: usize = 3;

pub async fn get_i18n(RequestLocale(locale): RequestLocale) -> Json<Value> {
    Json(json!({
        "locale": locale,
        "messages": i18n::catalog(locale),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ResolvedRoute {
    #[serde(flatten)]
    pub route: RouteMatch,
    pub alternates: BTreeMap<Locale, String>,
}

pub async fn resolve_route(
    State(state): State<AppState>,
    query: Result<Query<ResolveQuery>, QueryRejection>,
) -> ApiResult<Json<ResolvedRoute>> {
    let Query(ResolveQuery { path }) = query?;
    let route = routing::resolve(&path)
        .ok_or_else(|| ApiError::NotFound(format!("no page at {path}")))?;

    // Listing slugs differ per locale, so their alternates need the record.
    let listing = match (&route.page, &route.param) {
        (Page::ListingDetail, Some(slug)) => public_listings(&state.store)
            .await?
            .into_iter()
            .find(|l| l.slug.exact(route.locale) == slug.as_str()),
        _ => None,
    };
    let alternates = match listing {
        Some(listing) => listing_alternates(&listing),
        None => Locale::ALL
            .into_iter()
            .filter_map(|locale| routing::translate_path(&path, locale).map(|p| (locale, p)))
            .collect(),
    };

    Ok(Json(ResolvedRoute { route, alternates }))
}

#[derive(Debug, Serialize)]
pub struct SortOption {
    pub key: &'static str,
    pub label: &'static str,
}

fn sort_options(locale: Locale) -> Vec<SortOption> {
    ListingSort::ALL
        .into_iter()
        .map(|sort| SortOption {
            key: sort.as_str(),
            label: i18n::sort_label(sort, locale),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub locale: Locale,
    pub featured: Vec<ListingCard>,
    pub latest: Vec<ListingCard>,
    pub destinations: Vec<DestinationCard>,
    pub facets: Facets,
    pub sort_options: Vec<SortOption>,
}

pub async fn home(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> ApiResult<Json<HomePage>> {
    let listings = public_listings(&state.store).await?;
    let facets = filter::facets(&listings);

    let newest = filter::apply(listings, &ListingFilter::default(), ListingSort::Newest);
    let featured: Vec<Listing> = newest
        .iter()
        .filter(|l| l.featured)
        .take(HOME_FEATURED)
        .cloned()
        .collect();
    let latest = &newest[..newest.len().min(HOME_FEATURED)];

    let mut destinations = state.store.destinations.list().await?;
    sort_destinations(&mut destinations, locale);

    Ok(Json(HomePage {
        locale,
        featured: ListingCard::many(&featured, locale),
        latest: ListingCard::many(latest, locale),
        destinations: destinations
            .iter()
            .map(|d| DestinationCard::new(d, locale))
            .collect(),
        facets,
        sort_options: sort_options(locale),
    }))
}

#[derive(Debug, Serialize)]
pub struct ListingsPage {
    pub locale: Locale,
    pub sort: &'static str,
    pub total: usize,
    pub listings: Vec<ListingCard>,
    pub facets: Facets,
    pub sort_options: Vec<SortOption>,
}

pub async fn list_listings(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    headers: HeaderMap,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let (filter, sort) = ListingFilter::from_query(query, locale).localized(locale)?;

    let matching = filter::apply(public_listings(&state.store).await?, &filter, sort);
    debug!(matches = matching.len(), sort = sort.as_str(), "Listings filtered");

    let page = ListingsPage {
        locale,
        sort: sort.as_str(),
        total: matching.len(),
        facets: filter::facets(&matching),
        listings: ListingCard::many(&matching, locale),
        sort_options: sort_options(locale),
    };
    cached_json(&page, &headers)
}

/// Finds a public listing by id or by slug in either locale, preferring the
/// request locale.
async fn find_listing(
    state: &AppState,
    key: &str,
    locale: Locale,
) -> ApiResult<(Listing, Vec<Listing>)> {
    let listings = public_listings(&state.store).await?;
    let id = Uuid::parse_str(key).ok();
    let found = listings
        .iter()
        .find(|l| Some(l.id) == id)
        .or_else(|| listings.iter().find(|l| l.slug.exact(locale) == key))
        .or_else(|| listings.iter().find(|l| l.slug.exact(locale.other()) == key))
        .cloned()
        .ok_or_else(|| RealtyError::not_found("Listing", key))?;
    Ok((found, listings))
}

pub async fn get_listing(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(key): Path<String>,
) -> ApiResult<Json<ListingDetail>> {
    let (listing, candidates) = find_listing(&state, &key, locale).await?;

    let agent = match listing.agent_id {
        Some(id) => state.store.agents.get(id).await?,
        None => None,
    };
    let destination = match listing.destination_id {
        Some(id) => state.store.destinations.get(id).await?,
        None => None,
    };
    let similar = filter::similar(&listing, &candidates, SIMILAR_LIMIT);

    Ok(Json(ListingDetail {
        card: ListingCard::new(&listing, locale),
        description: listing.description.get(locale).to_string(),
        address: listing.address.clone(),
        postal_code: listing.postal_code.clone(),
        images: listing.images.clone(),
        agent: agent.as_ref().map(|a| AgentCard::new(a, locale)),
        destination: destination.as_ref().map(|d| DestinationCard::new(d, locale)),
        alternates: listing_alternates(&listing),
        similar: ListingCard::many(&similar, locale),
    }))
}

fn sort_destinations(destinations: &mut [Destination], locale: Locale) {
    destinations.sort_by(|a, b| a.name.get(locale).cmp(b.name.get(locale)));
}

pub async fn list_destinations(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> ApiResult<Json<Vec<DestinationCard>>> {
    let mut destinations = state.store.destinations.list().await?;
    sort_destinations(&mut destinations, locale);
    Ok(Json(
        destinations
            .iter()
            .map(|d| DestinationCard::new(d, locale))
            .collect(),
    ))
}

pub async fn get_destination(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(slug): Path<String>,
) -> ApiResult<Json<DestinationDetail>> {
    let destination = state
        .store
        .destinations
        .list()
        .await?
        .into_iter()
        .find(|d| d.slug == slug)
        .ok_or_else(|| RealtyError::not_found("Destination", &slug))?;

    let filter = ListingFilter {
        destination_id: Some(destination.id),
        ..Default::default()
    };
    let listings = filter::apply(
        public_listings(&state.store).await?,
        &filter,
        ListingSort::Newest,
    );

    Ok(Json(DestinationDetail {
        card: DestinationCard::new(&destination, locale),
        listings: ListingCard::many(&listings, locale),
        alternates: shared_alternates(Page::DestinationDetail, Some(&destination.slug)),
    }))
}

async fn active_agents(state: &AppState) -> ApiResult<Vec<Agent>> {
    let mut agents: Vec<Agent> = state
        .store
        .agents
        .list()
        .await?
        .into_iter()
        .filter(|a| a.active)
        .collect();
    agents.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(agents)
}

pub async fn list_agents(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> ApiResult<Json<Vec<AgentCard>>> {
    let agents = active_agents(&state).await?;
    Ok(Json(
        agents.iter().map(|a| AgentCard::new(a, locale)).collect(),
    ))
}

pub async fn get_agent(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(slug): Path<String>,
) -> ApiResult<Json<AgentDetail>> {
    let agent = active_agents(&state)
        .await?
        .into_iter()
        .find(|a| a.slug == slug)
        .ok_or_else(|| RealtyError::not_found("Agent", &slug))?;

    let office = match agent.office_id {
        Some(id) => state.store.offices.get(id).await?,
        None => None,
    };
    let filter = ListingFilter {
        agent_id: Some(agent.id),
        ..Default::default()
    };
    let listings = filter::apply(
        public_listings(&state.store).await?,
        &filter,
        ListingSort::Newest,
    );

    Ok(Json(AgentDetail {
        card: AgentCard::new(&agent, locale),
        bio: agent.bio.get(locale).to_string(),
        office: office.as_ref().map(|o| OfficeCard::new(o, locale)),
        listings: ListingCard::many(&listings, locale),
        alternates: shared_alternates(Page::AgentDetail, Some(&agent.slug)),
    }))
}

pub async fn list_offices(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> ApiResult<Json<Vec<OfficeCard>>> {
    let mut offices: Vec<Office> = state.store.offices.list().await?;
    offices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(
        offices.iter().map(|o| OfficeCard::new(o, locale)).collect(),
    ))
}

pub async fn get_office(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(slug): Path<String>,
) -> ApiResult<Json<OfficeDetail>> {
    let office = state
        .store
        .offices
        .list()
        .await?
        .into_iter()
        .find(|o| o.slug == slug)
        .ok_or_else(|| RealtyError::not_found("Office", &slug))?;

    let agents = active_agents(&state)
        .await?
        .into_iter()
        .filter(|a| a.office_id == Some(office.id))
        .map(|a| AgentCard::new(&a, locale))
        .collect();

    Ok(Json(OfficeDetail {
        card: OfficeCard::new(&office, locale),
        agents,
    }))
}
