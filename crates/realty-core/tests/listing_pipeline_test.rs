use std::path::PathBuf;

use realty_core::{
    filter::{self, similar},
    routing, Category, Feature, ListingFilter, ListingQuery, ListingSort, Locale, Page, SeedData,
    Store, Transaction,
};

fn seed_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/seed.json")
}

async fn seeded_store() -> Store {
    let seed = SeedData::from_file(&seed_path()).await.unwrap();
    let store = Store::memory();
    seed.apply(&store).await.unwrap();
    store
}

async fn public_listings(store: &Store) -> Vec<realty_core::Listing> {
    store
        .listings
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|l| l.status.is_public())
        .collect()
}

fn run(query: ListingQuery, locale: Locale, listings: Vec<realty_core::Listing>) -> Vec<String> {
    let (filter, sort) = ListingFilter::from_query(query, locale).unwrap();
    filter::apply(listings, &filter, sort)
        .into_iter()
        .map(|l| l.slug.en)
        .collect()
}

#[tokio::test]
async fn test_seed_loads_every_table() {
    let store = seeded_store().await;
    assert_eq!(store.destinations.list().await.unwrap().len(), 4);
    assert_eq!(store.offices.list().await.unwrap().len(), 2);
    assert_eq!(store.agents.list().await.unwrap().len(), 3);
    assert_eq!(store.listings.list().await.unwrap().len(), 8);
}

#[tokio::test]
async fn test_sold_listings_are_not_public() {
    let store = seeded_store().await;
    let listings = public_listings(&store).await;
    assert_eq!(listings.len(), 7);
    assert!(listings.iter().all(|l| l.slug.en != "sold-flat-smichov"));
}

#[tokio::test]
async fn test_czech_category_slug_and_price_sort() {
    let store = seeded_store().await;
    let query = ListingQuery {
        category: Some("byty".into()),
        transaction: Some("sale".into()),
        sort: Some("price_asc".into()),
        ..Default::default()
    };
    let slugs = run(query, Locale::Cs, public_listings(&store).await);
    assert_eq!(slugs, vec!["sunny-flat-vinohrady", "loft-holesovice"]);
}

#[tokio::test]
async fn test_location_search_ignores_diacritics() {
    let store = seeded_store().await;
    let query = ListingQuery {
        location: Some("pec pod snezkou".into()),
        ..Default::default()
    };
    let slugs = run(query, Locale::En, public_listings(&store).await);
    assert_eq!(slugs, vec!["mountain-cottage-pec"]);

    let query = ListingQuery {
        q: Some("žabovřesky".into()),
        ..Default::default()
    };
    let slugs = run(query, Locale::En, public_listings(&store).await);
    assert_eq!(slugs, vec!["family-house-brno-zabovresky"]);
}

#[tokio::test]
async fn test_feature_filter_requires_every_feature() {
    let store = seeded_store().await;
    let query = ListingQuery {
        features: Some("garage,garden".into()),
        ..Default::default()
    };
    let slugs = run(query, Locale::En, public_listings(&store).await);
    assert_eq!(slugs, vec!["family-house-brno-zabovresky"]);
}

#[tokio::test]
async fn test_unpriced_listing_fails_price_bounds_and_sorts_last() {
    let store = seeded_store().await;
    let brno = ListingQuery {
        location: Some("Brno".into()),
        sort: Some("price_desc".into()),
        ..Default::default()
    };
    let slugs = run(brno, Locale::En, public_listings(&store).await);
    assert_eq!(
        slugs,
        vec!["family-house-brno-zabovresky", "building-plot-brno-bystrc"]
    );

    let bounded = ListingQuery {
        location: Some("Brno".into()),
        max_price: Some("100000000".into()),
        ..Default::default()
    };
    let slugs = run(bounded, Locale::En, public_listings(&store).await);
    assert_eq!(slugs, vec!["family-house-brno-zabovresky"]);
}

#[tokio::test]
async fn test_postal_prefix_and_bedrooms() {
    let store = seeded_store().await;
    let query = ListingQuery {
        postal_code: Some("1 2 0".into()),
        beds: Some("2".into()),
        ..Default::default()
    };
    let slugs = run(query, Locale::En, public_listings(&store).await);
    assert_eq!(slugs, vec!["sunny-flat-vinohrady"]);
}

#[tokio::test]
async fn test_facets_count_public_listings() {
    let store = seeded_store().await;
    let listings = public_listings(&store).await;
    let facets = filter::facets(&listings);
    assert_eq!(facets.total, 7);
    assert_eq!(facets.categories.get(&Category::Apartment), Some(&3));
    assert_eq!(facets.transactions.get(&Transaction::Rent), Some(&1));
}

#[tokio::test]
async fn test_similar_prefers_same_city() {
    let store = seeded_store().await;
    let listings = public_listings(&store).await;
    let target = listings
        .iter()
        .find(|l| l.slug.en == "sunny-flat-vinohrady")
        .unwrap();
    let similar: Vec<String> = similar(target, &listings, 3)
        .into_iter()
        .map(|l| l.slug.en)
        .collect();
    assert_eq!(similar, vec!["loft-holesovice", "studio-rent-karlin"]);
}

#[tokio::test]
async fn test_listing_paths_translate_between_locales() {
    let store = seeded_store().await;
    let listings = public_listings(&store).await;
    let villa = listings
        .iter()
        .find(|l| l.has_feature(Feature::SeaView))
        .unwrap();

    let cs = routing::path_for(Page::ListingDetail, Locale::Cs, Some(&villa.slug.cs));
    assert_eq!(cs, "/cs/nemovitosti/vila-s-vyhledem-na-more-altea");

    let matched = routing::resolve(&cs).unwrap();
    assert_eq!(matched.page, Page::ListingDetail);
    assert_eq!(matched.param.as_deref(), Some(villa.slug.cs.as_str()));

    let sorted = run(
        ListingQuery {
            sort: Some(ListingSort::Featured.as_str().into()),
            ..Default::default()
        },
        Locale::En,
        listings.clone(),
    );
    assert!(sorted[..3].contains(&villa.slug.en));
}
