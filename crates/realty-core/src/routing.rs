//! Locale-aware URL tables.
//!
//! Every public page has one path segment per locale (`/en/listings`,
//! `/cs/nemovitosti`). Detail pages hang one slug below their index page.
//! Each table must stay bijective per locale: a segment identifies exactly
//! one page, and a page has exactly one segment.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::{RealtyError, Result},
    locale::Locale,
    model::Category,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Home,
    Listings,
    ListingDetail,
    Destinations,
    DestinationDetail,
    Agents,
    AgentDetail,
    Offices,
    Contact,
    SellProperty,
    About,
    Privacy,
}

impl Page {
    pub const ALL: [Page; 12] = [
        Page::Home,
        Page::Listings,
        Page::ListingDetail,
        Page::Destinations,
        Page::DestinationDetail,
        Page::Agents,
        Page::AgentDetail,
        Page::Offices,
        Page::Contact,
        Page::SellProperty,
        Page::About,
        Page::Privacy,
    ];

    /// Index page a detail page lives under.
    pub const fn parent(self) -> Option<Page> {
        match self {
            Page::ListingDetail => Some(Page::Listings),
            Page::DestinationDetail => Some(Page::Destinations),
            Page::AgentDetail => Some(Page::Agents),
            _ => None,
        }
    }

    /// Detail page hanging below this index page, if any.
    pub const fn detail(self) -> Option<Page> {
        match self {
            Page::Listings => Some(Page::ListingDetail),
            Page::Destinations => Some(Page::DestinationDetail),
            Page::Agents => Some(Page::AgentDetail),
            _ => None,
        }
    }

    const fn has_segment(self) -> bool {
        !matches!(self, Page::Home) && self.parent().is_none()
    }
}

/// `(page, en, cs)` segments for every page that owns one.
const PAGE_SEGMENTS: &[(Page, &str, &str)] = &[
    (Page::Listings, "listings", "nemovitosti"),
    (Page::Destinations, "destinations", "destinace"),
    (Page::Agents, "agents", "makleri"),
    (Page::Offices, "offices", "pobocky"),
    (Page::Contact, "contact", "kontakt"),
    (Page::SellProperty, "sell", "prodat"),
    (Page::About, "about", "o-nas"),
    (Page::Privacy, "privacy", "ochrana-osobnich-udaju"),
];

const CATEGORY_SLUGS: &[(Category, &str, &str)] = &[
    (Category::Apartment, "apartments", "byty"),
    (Category::House, "houses", "domy"),
    (Category::Villa, "villas", "vily"),
    (Category::Land, "land", "pozemky"),
    (Category::Commercial, "commercial", "komercni"),
    (Category::Cottage, "cottages", "chaty"),
];

fn pick<'a>(locale: Locale, en: &'a str, cs: &'a str) -> &'a str {
    match locale {
        Locale::En => en,
        Locale::Cs => cs,
    }
}

/// A path resolved back to the page it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    pub locale: Locale,
    pub page: Page,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

pub fn segment(page: Page, locale: Locale) -> Option<&'static str> {
    PAGE_SEGMENTS
        .iter()
        .find(|(p, _, _)| *p == page)
        .map(|(_, en, cs)| pick(locale, en, cs))
}

fn page_for_segment(locale: Locale, segment: &str) -> Option<Page> {
    PAGE_SEGMENTS
        .iter()
        .find(|(_, en, cs)| pick(locale, en, cs) == segment)
        .map(|(page, _, _)| *page)
}

/// Builds the public path of `page` in `locale`.
///
/// Detail pages append `param`; without one they point at their index page.
pub fn path_for(page: Page, locale: Locale, param: Option<&str>) -> String {
    let base = match page.parent() {
        Some(parent) => parent,
        None => page,
    };
    let mut path = format!("/{}", locale.as_str());
    if let Some(segment) = segment(base, locale) {
        path.push('/');
        path.push_str(segment);
    }
    if let (Some(_), Some(param)) = (page.parent(), param) {
        path.push('/');
        path.push_str(param);
    }
    path
}

/// Resolves a public path (query string and trailing slash tolerated).
pub fn resolve(path: &str) -> Option<RouteMatch> {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let mut parts = path.split('/').filter(|s| !s.is_empty());

    // Only the bare locale code is a valid prefix; `/en-gb/` is not a route.
    let prefix = parts.next()?;
    let locale = Locale::ALL.into_iter().find(|l| l.as_str() == prefix)?;
    let first = parts.next();
    let second = parts.next();
    if parts.next().is_some() {
        return None;
    }

    match (first, second) {
        (None, _) => Some(RouteMatch {
            locale,
            page: Page::Home,
            param: None,
        }),
        (Some(segment), None) => page_for_segment(locale, segment).map(|page| RouteMatch {
            locale,
            page,
            param: None,
        }),
        (Some(segment), Some(param)) => {
            let detail = page_for_segment(locale, segment)?.detail()?;
            Some(RouteMatch {
                locale,
                page: detail,
                param: Some(param.to_string()),
            })
        }
    }
}

/// Maps `path` to the same page in `target`, keeping any query string.
///
/// Entity slugs are carried over unchanged; callers that know the entity
/// substitute its slug for the target locale.
pub fn translate_path(path: &str, target: Locale) -> Option<String> {
    let route = resolve(path)?;
    let mut translated = path_for(route.page, target, route.param.as_deref());
    if let Some((_, query)) = path.split_once('?') {
        translated.push('?');
        translated.push_str(query);
    }
    Some(translated)
}

pub fn category_slug(category: Category, locale: Locale) -> &'static str {
    CATEGORY_SLUGS
        .iter()
        .find(|(c, _, _)| *c == category)
        .map(|(_, en, cs)| pick(locale, en, cs))
        .unwrap_or(category.as_str())
}

pub fn category_from_slug(locale: Locale, slug: &str) -> Option<Category> {
    CATEGORY_SLUGS
        .iter()
        .find(|(_, en, cs)| pick(locale, en, cs) == slug)
        .map(|(category, _, _)| *category)
}

/// Checks that every table is complete and bijective per locale.
pub fn verify_tables() -> Result<()> {
    for locale in Locale::ALL {
        let mut seen = HashSet::new();
        for page in Page::ALL.iter().filter(|p| p.has_segment()) {
            let count = PAGE_SEGMENTS.iter().filter(|(p, _, _)| p == page).count();
            if count != 1 {
                return Err(RealtyError::Config(format!(
                    "page {page:?} has {count} segments in locale {locale}"
                )));
            }
        }
        for (page, en, cs) in PAGE_SEGMENTS {
            if !page.has_segment() {
                return Err(RealtyError::Config(format!(
                    "page {page:?} must not own a segment"
                )));
            }
            let segment = pick(locale, en, cs);
            if segment.is_empty() || !seen.insert(segment) {
                return Err(RealtyError::Config(format!(
                    "segment '{segment}' is not unique in locale {locale}"
                )));
            }
        }

        let mut seen = HashSet::new();
        for category in Category::ALL {
            let count = CATEGORY_SLUGS
                .iter()
                .filter(|(c, _, _)| c == category)
                .count();
            if count != 1 {
                return Err(RealtyError::Config(format!(
                    "category {category} has {count} slugs in locale {locale}"
                )));
            }
        }
        for (_, en, cs) in CATEGORY_SLUGS {
            let slug = pick(locale, en, cs);
            if !seen.insert(slug) {
                return Err(RealtyError::Config(format!(
                    "category slug '{slug}' is not unique in locale {locale}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_bijective() {
        verify_tables().unwrap();
    }

    #[test]
    fn every_page_round_trips_through_its_path() {
        for locale in Locale::ALL {
            for page in Page::ALL {
                let param = page.parent().map(|_| "some-slug");
                let path = path_for(page, locale, param);
                let route = resolve(&path).unwrap_or_else(|| panic!("{path} did not resolve"));
                assert_eq!(route.page, page, "{path}");
                assert_eq!(route.locale, locale);
                assert_eq!(route.param.as_deref(), param);
            }
        }
    }

    #[test]
    fn builds_localized_paths() {
        assert_eq!(path_for(Page::Home, Locale::Cs, None), "/cs");
        assert_eq!(path_for(Page::Listings, Locale::Cs, None), "/cs/nemovitosti");
        assert_eq!(
            path_for(Page::ListingDetail, Locale::En, Some("sunny-flat")),
            "/en/listings/sunny-flat"
        );
        assert_eq!(path_for(Page::AgentDetail, Locale::En, None), "/en/agents");
    }

    #[test]
    fn resolve_rejects_unknown_paths() {
        assert!(resolve("/").is_none());
        assert!(resolve("/de/listings").is_none());
        assert!(resolve("/en-gb/listings").is_none());
        assert!(resolve("/en/nemovitosti").is_none());
        assert!(resolve("/en/contact/extra").is_none());
        assert!(resolve("/en/listings/a/b").is_none());
    }

    #[test]
    fn resolve_tolerates_trailing_slash_and_query() {
        let route = resolve("/cs/nemovitosti/?category=byty").unwrap();
        assert_eq!(route.page, Page::Listings);
        assert_eq!(route.locale, Locale::Cs);
    }

    #[test]
    fn translates_paths_between_locales() {
        assert_eq!(
            translate_path("/en/listings?sort=price_asc", Locale::Cs).as_deref(),
            Some("/cs/nemovitosti?sort=price_asc")
        );
        assert_eq!(
            translate_path("/cs/kontakt", Locale::En).as_deref(),
            Some("/en/contact")
        );
        assert_eq!(translate_path("/xx", Locale::En), None);
    }

    #[test]
    fn category_slugs_round_trip() {
        for locale in Locale::ALL {
            for category in Category::ALL {
                let slug = category_slug(*category, locale);
                assert_eq!(category_from_slug(locale, slug), Some(*category));
            }
        }
        assert_eq!(category_from_slug(Locale::Cs, "apartments"), None);
    }
}
