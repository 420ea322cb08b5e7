//! Static translation tables.
//!
//! Every key maps to an `(en, cs)` pair. Lookups for a missing key fall back
//! to English and then to the key itself, so a forgotten translation never
//! renders as an empty label.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;

use crate::{
    filter::ListingSort,
    locale::Locale,
    model::{Category, Currency, Feature, SubmissionStatus, Transaction},
};

const MESSAGES: &[(&str, &str, &str)] = &[
    // Navigation
    ("nav.home", "Home", "Domů"),
    ("nav.listings", "Properties", "Nemovitosti"),
    ("nav.destinations", "Destinations", "Destinace"),
    ("nav.agents", "Our agents", "Naši makléři"),
    ("nav.offices", "Offices", "Pobočky"),
    ("nav.contact", "Contact", "Kontakt"),
    ("nav.sell", "Sell your property", "Prodejte nemovitost"),
    ("nav.about", "About us", "O nás"),
    ("nav.privacy", "Privacy policy", "Ochrana osobních údajů"),
    // Categories
    ("category.apartment", "Apartment", "Byt"),
    ("category.house", "House", "Dům"),
    ("category.villa", "Villa", "Vila"),
    ("category.land", "Land", "Pozemek"),
    ("category.commercial", "Commercial", "Komerční"),
    ("category.cottage", "Cottage", "Chata"),
    // Transactions
    ("transaction.sale", "For sale", "Prodej"),
    ("transaction.rent", "For rent", "Pronájem"),
    // Features
    ("feature.balcony", "Balcony", "Balkon"),
    ("feature.terrace", "Terrace", "Terasa"),
    ("feature.garden", "Garden", "Zahrada"),
    ("feature.garage", "Garage", "Garáž"),
    ("feature.parking", "Parking", "Parkování"),
    ("feature.elevator", "Elevator", "Výtah"),
    ("feature.pool", "Swimming pool", "Bazén"),
    ("feature.cellar", "Cellar", "Sklep"),
    ("feature.furnished", "Furnished", "Vybaveno"),
    ("feature.air_conditioning", "Air conditioning", "Klimatizace"),
    ("feature.sea_view", "Sea view", "Výhled na moře"),
    ("feature.fireplace", "Fireplace", "Krb"),
    // Listing detail
    ("listing.price_on_request", "Price on request", "Cena na vyžádání"),
    ("listing.bedrooms", "Bedrooms", "Ložnice"),
    ("listing.bathrooms", "Bathrooms", "Koupelny"),
    ("listing.area", "Floor area", "Užitná plocha"),
    ("listing.reserved", "Reserved", "Rezervováno"),
    ("listing.similar", "Similar properties", "Podobné nemovitosti"),
    (
        "listing.none_found",
        "No properties match your filters.",
        "Vašim filtrům neodpovídají žádné nemovitosti.",
    ),
    // Sorting
    ("sort.newest", "Newest first", "Od nejnovějších"),
    ("sort.oldest", "Oldest first", "Od nejstarších"),
    ("sort.price_asc", "Price: low to high", "Cena: od nejnižší"),
    ("sort.price_desc", "Price: high to low", "Cena: od nejvyšší"),
    ("sort.area_asc", "Area: smallest first", "Plocha: od nejmenší"),
    ("sort.area_desc", "Area: largest first", "Plocha: od největší"),
    ("sort.featured", "Featured", "Doporučené"),
    // Submission statuses
    ("status.new", "New", "Nová"),
    ("status.in_progress", "In progress", "Řeší se"),
    ("status.closed", "Closed", "Uzavřeno"),
    // Forms
    ("form.name", "Full name", "Jméno a příjmení"),
    ("form.email", "E-mail", "E-mail"),
    ("form.phone", "Phone", "Telefon"),
    ("form.message", "Message", "Zpráva"),
    (
        "form.consent",
        "I agree to the processing of my personal data",
        "Souhlasím se zpracováním osobních údajů",
    ),
    ("form.submit", "Send", "Odeslat"),
    ("form.sent", "Thank you, we will get back to you shortly.", "Děkujeme, brzy se vám ozveme."),
    // Validation
    ("validation.required", "This field is required.", "Toto pole je povinné."),
    ("validation.too_long", "The value is too long.", "Hodnota je příliš dlouhá."),
    ("validation.too_short", "The value is too short.", "Hodnota je příliš krátká."),
    ("validation.email", "Enter a valid e-mail address.", "Zadejte platnou e-mailovou adresu."),
    ("validation.phone", "Enter a valid phone number.", "Zadejte platné telefonní číslo."),
    (
        "validation.postal_code",
        "Enter a postal code in the form 123 45.",
        "Zadejte PSČ ve tvaru 123 45.",
    ),
    (
        "validation.positive",
        "The value must be greater than zero.",
        "Hodnota musí být větší než nula.",
    ),
    (
        "validation.range",
        "The minimum must not exceed the maximum.",
        "Minimum nesmí být větší než maximum.",
    ),
    (
        "validation.slug",
        "Use lowercase letters, digits and dashes only.",
        "Použijte jen malá písmena, číslice a pomlčky.",
    ),
    ("validation.consent", "Your consent is required.", "Souhlas je povinný."),
    ("validation.unknown_value", "Unknown value.", "Neznámá hodnota."),
    // Errors
    ("error.not_found", "Page not found.", "Stránka nenalezena."),
    ("error.unauthorized", "Please sign in.", "Přihlaste se prosím."),
    ("error.internal", "Something went wrong.", "Něco se pokazilo."),
    ("error.validation", "Please correct the highlighted fields.", "Opravte prosím označená pole."),
];

lazy_static! {
    static ref CATALOG: HashMap<&'static str, (&'static str, &'static str)> = MESSAGES
        .iter()
        .map(|(key, en, cs)| (*key, (*en, *cs)))
        .collect();
}

/// Translates `key` into `locale`.
pub fn t(locale: Locale, key: &str) -> &str {
    match CATALOG.get(key) {
        Some(&(en, cs)) => {
            let text = match locale {
                Locale::En => en,
                Locale::Cs => cs,
            };
            if text.is_empty() {
                en
            } else {
                text
            }
        }
        None => key,
    }
}

pub fn contains_key(key: &str) -> bool {
    CATALOG.contains_key(key)
}

/// The whole catalog resolved for one locale, ordered by key.
pub fn catalog(locale: Locale) -> BTreeMap<&'static str, &'static str> {
    MESSAGES
        .iter()
        .map(|(key, en, cs)| {
            let text = match locale {
                Locale::Cs if !cs.is_empty() => *cs,
                _ => *en,
            };
            (*key, text)
        })
        .collect()
}

pub fn category_label(category: Category, locale: Locale) -> &'static str {
    static_t(locale, &format!("category.{}", category.as_str()))
}

pub fn transaction_label(transaction: Transaction, locale: Locale) -> &'static str {
    static_t(locale, &format!("transaction.{}", transaction.as_str()))
}

pub fn feature_label(feature: Feature, locale: Locale) -> &'static str {
    static_t(locale, &format!("feature.{}", feature.as_str()))
}

pub fn status_label(status: SubmissionStatus, locale: Locale) -> &'static str {
    static_t(locale, &format!("status.{}", status.as_str()))
}

pub fn sort_label(sort: ListingSort, locale: Locale) -> &'static str {
    static_t(locale, &format!("sort.{}", sort.as_str()))
}

// Labels built from enum names always exist in the catalog; the empty string
// only shows up if a variant is added without a translation.
fn static_t(locale: Locale, key: &str) -> &'static str {
    CATALOG
        .get(key)
        .map(|&(en, cs)| match locale {
            Locale::Cs if !cs.is_empty() => cs,
            _ => en,
        })
        .unwrap_or("")
}

/// Formats a price the way each locale writes money:
/// `CZK 4,500,000` in English, `4 500 000 Kč` in Czech.
pub fn format_price(amount: u64, currency: Currency, locale: Locale) -> String {
    match locale {
        Locale::En => {
            let symbol = match currency {
                Currency::Czk => "CZK ",
                Currency::Eur => "€",
            };
            format!("{symbol}{}", group_digits(amount, ','))
        }
        Locale::Cs => {
            let symbol = match currency {
                Currency::Czk => "Kč",
                Currency::Eur => "EUR",
            };
            format!("{} {symbol}", group_digits(amount, ' '))
        }
    }
}

fn group_digits(amount: u64, separator: char) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_both_languages() {
        for (key, en, cs) in MESSAGES {
            assert!(!en.is_empty(), "{key} missing English");
            assert!(!cs.is_empty(), "{key} missing Czech");
        }
        assert_eq!(CATALOG.len(), MESSAGES.len(), "duplicate keys in catalog");
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        assert_eq!(t(Locale::Cs, "nav.listings"), "Nemovitosti");
        assert_eq!(t(Locale::En, "nav.listings"), "Properties");
        assert_eq!(t(Locale::Cs, "no.such.key"), "no.such.key");
    }

    #[test]
    fn every_enum_variant_is_labelled() {
        for locale in Locale::ALL {
            for c in Category::ALL {
                assert!(!category_label(*c, locale).is_empty());
            }
            for f in Feature::ALL {
                assert!(!feature_label(*f, locale).is_empty());
            }
            for tr in Transaction::ALL {
                assert!(!transaction_label(*tr, locale).is_empty());
            }
            for s in SubmissionStatus::ALL {
                assert!(!status_label(*s, locale).is_empty());
            }
            for sort in ListingSort::ALL {
                assert!(!sort_label(sort, locale).is_empty());
            }
        }
    }

    #[test]
    fn prices_follow_locale_conventions() {
        assert_eq!(format_price(4_500_000, Currency::Czk, Locale::En), "CZK 4,500,000");
        assert_eq!(format_price(4_500_000, Currency::Czk, Locale::Cs), "4 500 000 Kč");
        assert_eq!(format_price(950, Currency::Eur, Locale::En), "€950");
        assert_eq!(format_price(1_000, Currency::Eur, Locale::Cs), "1 000 EUR");
    }

    #[test]
    fn catalog_is_resolved_per_locale() {
        let cs = catalog(Locale::Cs);
        assert_eq!(cs.get("nav.contact"), Some(&"Kontakt"));
        assert_eq!(cs.len(), MESSAGES.len());
    }
}
