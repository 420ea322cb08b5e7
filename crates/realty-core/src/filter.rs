//! Listing search: filter predicates, sort orders and facet counts.
//!
//! Rows come back from the database unfiltered; every predicate here runs in
//! memory and they compose with logical AND. An unset criterion always
//! passes. There is no pagination: the whole matching set is returned.

use std::{cmp::Ordering, collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    locale::Locale,
    model::{Category, Feature, Listing, RecordId, Transaction},
    routing,
    text::{contains_folded, fold},
    validation::{FieldError, ValidationErrors},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    pub category: Option<Category>,
    pub transaction: Option<Transaction>,
    pub location: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub postal_code: Option<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
    pub destination_id: Option<RecordId>,
    pub agent_id: Option<RecordId>,
    pub query: Option<String>,
}

/// Raw query-string form of [`ListingFilter`], as sent by the listings page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub transaction: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub beds: Option<String>,
    pub baths: Option<String>,
    pub postal_code: Option<String>,
    /// Comma separated feature names.
    pub features: Option<String>,
    pub destination: Option<String>,
    pub agent: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional query value; blanks count as unset and anything
/// unparsable is reported against `field`.
fn parse_field<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
) -> Option<T> {
    let raw = non_blank(value)?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        errors.push(FieldError::new(field, "validation.unknown_value"));
    }
    parsed
}

impl ListingFilter {
    /// Builds a filter from query parameters.
    ///
    /// `category` accepts the canonical name or the category slug of
    /// `locale` (`byty`, `apartments`). Unknown values are reported as field
    /// errors instead of being silently ignored.
    pub fn from_query(
        query: ListingQuery,
        locale: Locale,
    ) -> Result<(Self, ListingSort), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let category = non_blank(query.category).and_then(|raw| {
            let parsed = Category::from_str(&raw)
                .ok()
                .or_else(|| routing::category_from_slug(locale, &raw));
            if parsed.is_none() {
                errors.push(FieldError::new("category", "validation.unknown_value"));
            }
            parsed
        });

        let transaction = non_blank(query.transaction).and_then(|raw| {
            let parsed = Transaction::from_str(&raw).ok();
            if parsed.is_none() {
                errors.push(FieldError::new("transaction", "validation.unknown_value"));
            }
            parsed
        });

        let mut features = Vec::new();
        for raw in query
            .features
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            match Feature::from_str(raw) {
                Ok(feature) if !features.contains(&feature) => features.push(feature),
                Ok(_) => {}
                Err(_) => errors.push(FieldError::new("features", "validation.unknown_value")),
            }
        }

        let sort = match non_blank(query.sort) {
            Some(raw) => ListingSort::from_str(&raw).unwrap_or_else(|_| {
                errors.push(FieldError::new("sort", "validation.unknown_value"));
                ListingSort::default()
            }),
            None => ListingSort::default(),
        };

        let min_price: Option<u64> = parse_field(&mut errors, "min_price", query.min_price);
        let max_price: Option<u64> = parse_field(&mut errors, "max_price", query.max_price);
        let min_bedrooms = parse_field(&mut errors, "beds", query.beds);
        let min_bathrooms = parse_field(&mut errors, "baths", query.baths);
        let destination_id = parse_field(&mut errors, "destination", query.destination);
        let agent_id = parse_field(&mut errors, "agent", query.agent);

        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                errors.push(FieldError::new("min_price", "validation.range"));
            }
        }

        errors.into_result()?;

        Ok((
            Self {
                category,
                transaction,
                location: non_blank(query.location),
                min_price,
                max_price,
                min_bedrooms,
                min_bathrooms,
                postal_code: non_blank(query.postal_code),
                features,
                destination_id,
                agent_id,
                query: non_blank(query.q),
            },
            sort,
        ))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when `listing` satisfies every set criterion.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.prepared().matches(listing)
    }

    fn prepared(&self) -> PreparedFilter<'_> {
        PreparedFilter {
            filter: self,
            location: self.location.as_deref().map(fold),
            query: self.query.as_deref().map(fold),
            postal_prefix: self.postal_code.as_deref().map(strip_whitespace),
        }
    }
}

/// A filter with its text criteria folded once, not once per listing.
struct PreparedFilter<'a> {
    filter: &'a ListingFilter,
    location: Option<String>,
    query: Option<String>,
    postal_prefix: Option<String>,
}

impl PreparedFilter<'_> {
    fn matches(&self, listing: &Listing) -> bool {
        let f = self.filter;

        if f.category.is_some_and(|c| c != listing.category) {
            return false;
        }
        if f.transaction.is_some_and(|t| t != listing.transaction) {
            return false;
        }
        if f.destination_id.is_some() && f.destination_id != listing.destination_id {
            return false;
        }
        if f.agent_id.is_some() && f.agent_id != listing.agent_id {
            return false;
        }
        if f.min_price.is_some() || f.max_price.is_some() {
            let Some(price) = listing.price else {
                return false;
            };
            if f.min_price.is_some_and(|min| price < min) {
                return false;
            }
            if f.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }
        if f.min_bedrooms.is_some_and(|beds| listing.bedrooms < beds) {
            return false;
        }
        if f.min_bathrooms.is_some_and(|baths| listing.bathrooms < baths) {
            return false;
        }
        if let Some(prefix) = &self.postal_prefix {
            if !strip_whitespace(&listing.postal_code).starts_with(prefix.as_str()) {
                return false;
            }
        }
        if !f.features.iter().all(|feature| listing.has_feature(*feature)) {
            return false;
        }
        if let Some(location) = &self.location {
            if !contains_folded(&listing.city, location)
                && !contains_folded(&listing.address, location)
            {
                return false;
            }
        }
        if let Some(query) = &self.query {
            if !contains_folded(&listing.title.en, query)
                && !contains_folded(&listing.title.cs, query)
                && !contains_folded(&listing.city, query)
            {
                return false;
            }
        }
        true
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    AreaAsc,
    AreaDesc,
    Featured,
}

impl ListingSort {
    pub const ALL: [ListingSort; 7] = [
        ListingSort::Newest,
        ListingSort::Oldest,
        ListingSort::PriceAsc,
        ListingSort::PriceDesc,
        ListingSort::AreaAsc,
        ListingSort::AreaDesc,
        ListingSort::Featured,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::AreaAsc => "area_asc",
            Self::AreaDesc => "area_desc",
            Self::Featured => "featured",
        }
    }

    fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        let primary = match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::Oldest => a.created_at.cmp(&b.created_at),
            Self::PriceAsc => missing_last(a.price, b.price, |x, y| x.cmp(&y)),
            Self::PriceDesc => missing_last(a.price, b.price, |x, y| y.cmp(&x)),
            Self::AreaAsc => missing_last(a.area_m2, b.area_m2, |x, y| x.total_cmp(&y)),
            Self::AreaDesc => missing_last(a.area_m2, b.area_m2, |x, y| y.total_cmp(&x)),
            Self::Featured => b.featured.cmp(&a.featured),
        };
        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl FromStr for ListingSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort order: {s}"))
    }
}

/// Orders present values with `cmp`; absent values go last in either
/// direction.
fn missing_last<T: Copy>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filters then sorts `listings`.
pub fn apply(listings: Vec<Listing>, filter: &ListingFilter, sort: ListingSort) -> Vec<Listing> {
    let prepared = filter.prepared();
    let mut matching: Vec<Listing> = listings
        .into_iter()
        .filter(|listing| prepared.matches(listing))
        .collect();
    matching.sort_by(|a, b| sort.compare(a, b));
    matching
}

/// Counts shown next to the filter options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub total: usize,
    pub categories: BTreeMap<Category, usize>,
    pub transactions: BTreeMap<Transaction, usize>,
}

pub fn facets<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Facets {
    let mut facets = Facets::default();
    for listing in listings {
        facets.total += 1;
        *facets.categories.entry(listing.category).or_default() += 1;
        *facets.transactions.entry(listing.transaction).or_default() += 1;
    }
    facets
}

/// Up to `limit` listings resembling `target`: same category, same city
/// first, then closest price.
pub fn similar(target: &Listing, candidates: &[Listing], limit: usize) -> Vec<Listing> {
    let mut similar: Vec<&Listing> = candidates
        .iter()
        .filter(|l| l.id != target.id && l.category == target.category)
        .collect();
    let city = fold(&target.city);
    similar.sort_by(|a, b| {
        let a_city = fold(&a.city) != city;
        let b_city = fold(&b.city) != city;
        a_city
            .cmp(&b_city)
            .then_with(|| price_distance(target, a).cmp(&price_distance(target, b)))
            .then_with(|| a.id.cmp(&b.id))
    });
    similar.into_iter().take(limit).cloned().collect()
}

fn price_distance(target: &Listing, other: &Listing) -> u64 {
    match (target.price, other.price) {
        (Some(a), Some(b)) => a.abs_diff(b),
        _ => u64::MAX,
    }
}
