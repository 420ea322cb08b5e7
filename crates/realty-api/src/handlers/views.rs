//! Locale-resolved shapes returned by the public endpoints.

use std::collections::BTreeMap;

use realty_core::{
    i18n,
    routing::{self, Page},
    Agent, Category, Currency, Destination, Feature, Listing, ListingStatus, Locale, Office,
    RecordId, Transaction,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Labelled<T> {
    pub key: T,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ListingCard {
    pub id: RecordId,
    pub slug: String,
    pub path: String,
    pub title: String,
    pub category: Labelled<Category>,
    pub transaction: Labelled<Transaction>,
    pub status: ListingStatus,
    pub price: Option<u64>,
    pub currency: Currency,
    /// Price formatted for the locale; `None` means "price on request".
    pub price_label: Option<String>,
    pub city: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area_m2: Option<f64>,
    pub cover_image: Option<String>,
    pub featured: bool,
    pub features: Vec<Labelled<Feature>>,
}

impl ListingCard {
    pub fn new(listing: &Listing, locale: Locale) -> Self {
        let slug = listing.slug.get(locale).to_string();
        Self {
            id: listing.id,
            path: routing::path_for(Page::ListingDetail, locale, Some(&slug)),
            slug,
            title: listing.title.get(locale).to_string(),
            category: Labelled {
                key: listing.category,
                label: i18n::category_label(listing.category, locale),
            },
            transaction: Labelled {
                key: listing.transaction,
                label: i18n::transaction_label(listing.transaction, locale),
            },
            status: listing.status,
            price: listing.price,
            currency: listing.currency,
            price_label: listing
                .price
                .map(|amount| i18n::format_price(amount, listing.currency, locale)),
            city: listing.city.clone(),
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            area_m2: listing.area_m2,
            cover_image: listing.cover_image().map(str::to_string),
            featured: listing.featured,
            features: listing
                .features
                .iter()
                .map(|&feature| Labelled {
                    key: feature,
                    label: i18n::feature_label(feature, locale),
                })
                .collect(),
        }
    }

    pub fn many(listings: &[Listing], locale: Locale) -> Vec<Self> {
        listings.iter().map(|l| Self::new(l, locale)).collect()
    }
}

/// Path of a listing in every locale, for language switchers and
/// `hreflang` links.
pub fn listing_alternates(listing: &Listing) -> BTreeMap<Locale, String> {
    Locale::ALL
        .into_iter()
        .map(|locale| {
            let path =
                routing::path_for(Page::ListingDetail, locale, Some(listing.slug.get(locale)));
            (locale, path)
        })
        .collect()
}

/// Alternates for pages whose parameter is the same in every locale.
pub fn shared_alternates(page: Page, param: Option<&str>) -> BTreeMap<Locale, String> {
    Locale::ALL
        .into_iter()
        .map(|locale| (locale, routing::path_for(page, locale, param)))
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub card: ListingCard,
    pub description: String,
    pub address: String,
    pub postal_code: String,
    pub images: Vec<String>,
    pub agent: Option<AgentCard>,
    pub destination: Option<DestinationCard>,
    pub alternates: BTreeMap<Locale, String>,
    pub similar: Vec<ListingCard>,
}

#[derive(Debug, Serialize)]
pub struct DestinationCard {
    pub id: RecordId,
    pub slug: String,
    pub path: String,
    pub name: String,
    pub description: String,
    pub country: String,
    pub image: Option<String>,
}

impl DestinationCard {
    pub fn new(destination: &Destination, locale: Locale) -> Self {
        Self {
            id: destination.id,
            slug: destination.slug.clone(),
            path: routing::path_for(Page::DestinationDetail, locale, Some(&destination.slug)),
            name: destination.name.get(locale).to_string(),
            description: destination.description.get(locale).to_string(),
            country: destination.country.clone(),
            image: destination.image.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentCard {
    pub id: RecordId,
    pub slug: String,
    pub path: String,
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub photo: Option<String>,
    pub languages: Vec<Locale>,
}

impl AgentCard {
    pub fn new(agent: &Agent, locale: Locale) -> Self {
        Self {
            id: agent.id,
            slug: agent.slug.clone(),
            path: routing::path_for(Page::AgentDetail, locale, Some(&agent.slug)),
            name: agent.name.clone(),
            title: agent.title.get(locale).to_string(),
            email: agent.email.clone(),
            phone: agent.phone.clone(),
            photo: agent.photo.clone(),
            languages: agent.languages.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentDetail {
    #[serde(flatten)]
    pub card: AgentCard,
    pub bio: String,
    pub office: Option<OfficeCard>,
    pub listings: Vec<ListingCard>,
    pub alternates: BTreeMap<Locale, String>,
}

#[derive(Debug, Serialize)]
pub struct OfficeCard {
    pub id: RecordId,
    pub slug: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub email: String,
    pub phone: String,
    pub opening_hours: String,
}

impl OfficeCard {
    pub fn new(office: &Office, locale: Locale) -> Self {
        Self {
            id: office.id,
            slug: office.slug.clone(),
            name: office.name.clone(),
            address: office.address.clone(),
            city: office.city.clone(),
            postal_code: office.postal_code.clone(),
            email: office.email.clone(),
            phone: office.phone.clone(),
            opening_hours: office.opening_hours.get(locale).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OfficeDetail {
    #[serde(flatten)]
    pub card: OfficeCard,
    pub agents: Vec<AgentCard>,
}

#[derive(Debug, Serialize)]
pub struct DestinationDetail {
    #[serde(flatten)]
    pub card: DestinationCard,
    pub listings: Vec<ListingCard>,
    pub alternates: BTreeMap<Locale, String>,
}
