//! Payloads accepted from the public forms and the admin panel, with the
//! rules they must pass before anything is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    locale::Locale,
    model::{
        Agent, Category, ContactSubmission, Currency, Destination, Feature, Listing,
        ListingStatus, Localized, Office, PropertyIntake, RecordId, SubmissionStatus, Transaction,
    },
    validation::{slugify, Rules, Validate, ValidationErrors},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub listing_id: Option<RecordId>,
    #[serde(default)]
    pub consent: bool,
}

impl Validate for ContactForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .required("name", &self.name)
            .length("name", &self.name, 2, 120)
            .required("email", &self.email)
            .email("email", &self.email)
            .phone("phone", &self.phone)
            .required("message", &self.message)
            .length("message", &self.message, 10, 5000)
            .consent("consent", self.consent)
            .finish()
    }
}

impl ContactForm {
    pub fn into_submission(self, locale: Locale, now: DateTime<Utc>) -> ContactSubmission {
        ContactSubmission {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            message: self.message.trim().to_string(),
            listing_id: self.listing_id,
            locale,
            status: SubmissionStatus::New,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyIntakeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub category: Category,
    pub transaction: Transaction,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub asking_price: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub consent: bool,
}

impl Validate for PropertyIntakeForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .required("name", &self.name)
            .length("name", &self.name, 2, 120)
            .required("email", &self.email)
            .email("email", &self.email)
            .required("phone", &self.phone)
            .phone("phone", &self.phone)
            .required("city", &self.city)
            .length("city", &self.city, 1, 120)
            .postal_code("postal_code", &self.postal_code)
            .positive("area_m2", self.area_m2)
            .length("description", &self.description, 0, 5000)
            .consent("consent", self.consent)
            .finish()
    }
}

impl PropertyIntakeForm {
    pub fn into_intake(self, locale: Locale, now: DateTime<Utc>) -> PropertyIntake {
        PropertyIntake {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            category: self.category,
            transaction: self.transaction,
            city: self.city.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            area_m2: self.area_m2,
            asking_price: self.asking_price,
            description: self.description.trim().to_string(),
            locale,
            status: SubmissionStatus::New,
            created_at: now,
        }
    }
}

/// Status change sent by the admin for a contact or intake submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: SubmissionStatus,
}

/// Fills blank slugs from the text they should be derived from.
fn localized_slug(slug: Option<Localized>, source: &Localized) -> Localized {
    let mut slug = slug.unwrap_or_default();
    for locale in Locale::ALL {
        if slug.exact(locale).trim().is_empty() {
            slug.set(locale, slugify(source.get(locale)));
        }
    }
    slug
}

fn plain_slug(slug: Option<String>, source: &str) -> String {
    slug.filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| slugify(source))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingInput {
    #[serde(default)]
    pub slug: Option<Localized>,
    #[serde(default)]
    pub title: Localized,
    #[serde(default)]
    pub description: Localized,
    pub category: Category,
    pub transaction: Transaction,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub destination_id: Option<RecordId>,
    #[serde(default)]
    pub agent_id: Option<RecordId>,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

impl Validate for ListingInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut rules = Rules::new();
        if self.title.is_blank() {
            rules.required("title", "");
        }
        rules
            .length("title.en", &self.title.en, 3, 200)
            .length("title.cs", &self.title.cs, 3, 200)
            .required("city", &self.city)
            .postal_code("postal_code", &self.postal_code)
            .positive("area_m2", self.area_m2);
        if let Some(slug) = &self.slug {
            rules.slug("slug.en", &slug.en).slug("slug.cs", &slug.cs);
        }
        rules.finish()
    }
}

impl ListingInput {
    pub fn into_listing(self, now: DateTime<Utc>) -> Listing {
        let mut listing = Listing {
            id: Uuid::new_v4(),
            slug: Localized::default(),
            title: Localized::default(),
            description: Localized::default(),
            category: self.category,
            transaction: self.transaction,
            status: self.status,
            price: None,
            currency: self.currency,
            city: String::new(),
            address: String::new(),
            postal_code: String::new(),
            destination_id: None,
            agent_id: None,
            bedrooms: 0,
            bathrooms: 0,
            area_m2: None,
            features: Vec::new(),
            images: Vec::new(),
            featured: false,
            created_at: now,
            updated_at: now,
        };
        self.apply_to(&mut listing, now);
        listing
    }

    /// Overwrites every editable field of `listing`, keeping id and
    /// creation time.
    pub fn apply_to(self, listing: &mut Listing, now: DateTime<Utc>) {
        listing.slug = localized_slug(self.slug, &self.title);
        listing.title = self.title;
        listing.description = self.description;
        listing.category = self.category;
        listing.transaction = self.transaction;
        listing.status = self.status;
        listing.price = self.price;
        listing.currency = self.currency;
        listing.city = self.city.trim().to_string();
        listing.address = self.address.trim().to_string();
        listing.postal_code = self.postal_code.trim().to_string();
        listing.destination_id = self.destination_id;
        listing.agent_id = self.agent_id;
        listing.bedrooms = self.bedrooms;
        listing.bathrooms = self.bathrooms;
        listing.area_m2 = self.area_m2;
        let mut features = self.features;
        features.sort();
        features.dedup();
        listing.features = features;
        listing.images = self.images;
        listing.featured = self.featured;
        listing.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInput {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub title: Localized,
    #[serde(default)]
    pub bio: Localized,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub office_id: Option<RecordId>,
    #[serde(default)]
    pub languages: Vec<Locale>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Validate for AgentInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .required("name", &self.name)
            .length("name", &self.name, 2, 120)
            .required("email", &self.email)
            .email("email", &self.email)
            .phone("phone", &self.phone)
            .slug("slug", self.slug.as_deref().unwrap_or(""))
            .finish()
    }
}

impl AgentInput {
    pub fn into_agent(self, now: DateTime<Utc>) -> Agent {
        let mut agent = Agent {
            id: Uuid::new_v4(),
            slug: String::new(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            title: Localized::default(),
            bio: Localized::default(),
            photo: None,
            office_id: None,
            languages: Vec::new(),
            active: true,
            created_at: now,
        };
        self.apply_to(&mut agent);
        agent
    }

    pub fn apply_to(self, agent: &mut Agent) {
        agent.slug = plain_slug(self.slug, &self.name);
        agent.name = self.name.trim().to_string();
        agent.email = self.email.trim().to_string();
        agent.phone = self.phone.trim().to_string();
        agent.title = self.title;
        agent.bio = self.bio;
        agent.photo = self.photo;
        agent.office_id = self.office_id;
        agent.languages = self.languages;
        agent.active = self.active;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeInput {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub opening_hours: Localized,
}

impl Validate for OfficeInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .required("name", &self.name)
            .required("address", &self.address)
            .required("city", &self.city)
            .postal_code("postal_code", &self.postal_code)
            .email("email", &self.email)
            .phone("phone", &self.phone)
            .slug("slug", self.slug.as_deref().unwrap_or(""))
            .finish()
    }
}

impl OfficeInput {
    pub fn into_office(self, now: DateTime<Utc>) -> Office {
        let mut office = Office {
            id: Uuid::new_v4(),
            slug: String::new(),
            name: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
            email: String::new(),
            phone: String::new(),
            opening_hours: Localized::default(),
            created_at: now,
        };
        self.apply_to(&mut office);
        office
    }

    pub fn apply_to(self, office: &mut Office) {
        office.slug = plain_slug(self.slug, &self.name);
        office.name = self.name.trim().to_string();
        office.address = self.address.trim().to_string();
        office.city = self.city.trim().to_string();
        office.postal_code = self.postal_code.trim().to_string();
        office.email = self.email.trim().to_string();
        office.phone = self.phone.trim().to_string();
        office.opening_hours = self.opening_hours;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationInput {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Localized,
    #[serde(default)]
    pub description: Localized,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Validate for DestinationInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut rules = Rules::new();
        if self.name.is_blank() {
            rules.required("name", "");
        }
        rules
            .length("name.en", &self.name.en, 2, 120)
            .length("name.cs", &self.name.cs, 2, 120)
            .slug("slug", self.slug.as_deref().unwrap_or(""))
            .finish()
    }
}

impl DestinationInput {
    pub fn into_destination(self, now: DateTime<Utc>) -> Destination {
        let mut destination = Destination {
            id: Uuid::new_v4(),
            slug: String::new(),
            name: Localized::default(),
            description: Localized::default(),
            country: String::new(),
            image: None,
            created_at: now,
        };
        self.apply_to(&mut destination);
        destination
    }

    pub fn apply_to(self, destination: &mut Destination) {
        // Destination URLs are shared by both locales, so the slug follows
        // the English name.
        destination.slug = plain_slug(self.slug, self.name.get(Locale::En));
        destination.name = self.name;
        destination.description = self.description;
        destination.country = self.country.trim().to_string();
        destination.image = self.image;
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactForm {
        ContactForm {
            name: "Jana Nováková".into(),
            email: "jana@example.cz".into(),
            phone: "+420 777 123 456".into(),
            message: "Mám zájem o prohlídku bytu.".into(),
            listing_id: None,
            consent: true,
        }
    }

    fn listing_input() -> ListingInput {
        ListingInput {
            slug: None,
            title: Localized::new("Sunny flat in Vinohrady", "Slunný byt na Vinohradech"),
            description: Localized::default(),
            category: Category::Apartment,
            transaction: Transaction::Sale,
            status: ListingStatus::Active,
            price: Some(7_900_000),
            currency: Currency::Czk,
            city: " Praha ".into(),
            address: String::new(),
            postal_code: "120 00".into(),
            destination_id: None,
            agent_id: None,
            bedrooms: 2,
            bathrooms: 1,
            area_m2: Some(64.0),
            features: vec![Feature::Elevator, Feature::Balcony, Feature::Elevator],
            images: vec![],
            featured: false,
        }
    }

    #[test]
    fn valid_contact_form_passes_and_trims() {
        let form = contact();
        form.validate().unwrap();
        let submission = form.into_submission(Locale::Cs, Utc::now());
        assert_eq!(submission.status, SubmissionStatus::New);
        assert_eq!(submission.locale, Locale::Cs);
    }

    #[test]
    fn contact_form_requires_consent_and_message() {
        let mut form = contact();
        form.consent = false;
        form.message = "hi".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.has_field("consent"));
        assert!(errors.has_field("message"));
    }

    #[test]
    fn omitted_fields_are_reported_as_required() {
        let form: ContactForm = serde_json::from_str(
            r#"{"email":"a@b.cz","message":"Hello there friend","consent":true}"#,
        )
        .unwrap();
        let errors = form.validate().unwrap_err();
        let codes: Vec<(&str, &str)> = errors
            .iter()
            .map(|e| (e.field.as_str(), e.code.as_str()))
            .collect();
        assert_eq!(codes, [("name", "validation.required")]);

        let intake: PropertyIntakeForm = serde_json::from_str(
            r#"{"category":"house","transaction":"sale","consent":true}"#,
        )
        .unwrap();
        let errors = intake.validate().unwrap_err();
        for field in ["name", "email", "phone", "city"] {
            assert!(errors.has_field(field), "{field}");
        }

        let office: OfficeInput = serde_json::from_str("{}").unwrap();
        assert!(office.validate().unwrap_err().has_field("address"));
    }

    #[test]
    fn listing_slugs_are_generated_per_locale() {
        let listing = listing_input().into_listing(Utc::now());
        assert_eq!(listing.slug.en, "sunny-flat-in-vinohrady");
        assert_eq!(listing.slug.cs, "slunny-byt-na-vinohradech");
        assert_eq!(listing.city, "Praha");
        assert_eq!(listing.features, vec![Feature::Balcony, Feature::Elevator]);
    }

    #[test]
    fn explicit_slug_is_kept_and_blank_one_filled() {
        let mut input = listing_input();
        input.slug = Some(Localized::new("custom", ""));
        let listing = input.into_listing(Utc::now());
        assert_eq!(listing.slug.en, "custom");
        assert_eq!(listing.slug.cs, "slunny-byt-na-vinohradech");
    }

    #[test]
    fn listing_input_rejects_bad_slug_and_area() {
        let mut input = listing_input();
        input.slug = Some(Localized::new("Not A Slug", ""));
        input.area_m2 = Some(-5.0);
        let errors = input.validate().unwrap_err();
        assert!(errors.has_field("slug.en"));
        assert!(errors.has_field("area_m2"));
    }

    #[test]
    fn update_keeps_identity() {
        let now = Utc::now();
        let mut listing = listing_input().into_listing(now);
        let id = listing.id;
        let mut input = listing_input();
        input.price = None;
        input.apply_to(&mut listing, now + chrono::Duration::hours(1));
        assert_eq!(listing.id, id);
        assert_eq!(listing.created_at, now);
        assert_eq!(listing.price, None);
        assert!(listing.updated_at > now);
    }

    #[test]
    fn agent_slug_comes_from_name() {
        let input = AgentInput {
            slug: None,
            name: "Petr Dvořák".into(),
            email: "petr@example.cz".into(),
            phone: String::new(),
            title: Localized::default(),
            bio: Localized::default(),
            photo: None,
            office_id: None,
            languages: vec![Locale::Cs, Locale::En],
            active: true,
        };
        input.validate().unwrap();
        assert_eq!(input.into_agent(Utc::now()).slug, "petr-dvorak");
    }
}
