use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::locale::Locale;

pub type RecordId = Uuid;

/// A row persisted in one table of the hosted database.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table name in the database.
    const TABLE: &'static str;
    /// Human readable entity name used in errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> RecordId;
}

/// Text published in both site languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub cs: String,
}

impl Localized {
    pub fn new(en: impl Into<String>, cs: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            cs: cs.into(),
        }
    }

    /// Text for `locale`, or the other language when that one is blank.
    pub fn get(&self, locale: Locale) -> &str {
        let (preferred, fallback) = match locale {
            Locale::En => (&self.en, &self.cs),
            Locale::Cs => (&self.cs, &self.en),
        };
        if preferred.trim().is_empty() {
            fallback
        } else {
            preferred
        }
    }

    /// Text for `locale` without falling back.
    pub fn exact(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Cs => &self.cs,
        }
    }

    pub fn set(&mut self, locale: Locale, value: String) {
        match locale {
            Locale::En => self.en = value,
            Locale::Cs => self.cs = value,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.en.trim().is_empty() && self.cs.trim().is_empty()
    }
}

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("unknown {}: {}", stringify!($name), s))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Apartment,
    House,
    Villa,
    Land,
    Commercial,
    Cottage,
}

string_enum!(Category {
    Apartment => "apartment",
    House => "house",
    Villa => "villa",
    Land => "land",
    Commercial => "commercial",
    Cottage => "cottage",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transaction {
    Sale,
    Rent,
}

string_enum!(Transaction {
    Sale => "sale",
    Rent => "rent",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Draft,
    Active,
    Reserved,
    Sold,
}

string_enum!(ListingStatus {
    Draft => "draft",
    Active => "active",
    Reserved => "reserved",
    Sold => "sold",
});

impl ListingStatus {
    /// Whether visitors may see a listing in this state.
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Active | Self::Reserved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Balcony,
    Terrace,
    Garden,
    Garage,
    Parking,
    Elevator,
    Pool,
    Cellar,
    Furnished,
    AirConditioning,
    SeaView,
    Fireplace,
}

string_enum!(Feature {
    Balcony => "balcony",
    Terrace => "terrace",
    Garden => "garden",
    Garage => "garage",
    Parking => "parking",
    Elevator => "elevator",
    Pool => "pool",
    Cellar => "cellar",
    Furnished => "furnished",
    AirConditioning => "air_conditioning",
    SeaView => "sea_view",
    Fireplace => "fireplace",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Czk,
    Eur,
}

string_enum!(Currency {
    Czk => "CZK",
    Eur => "EUR",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    New,
    InProgress,
    Closed,
}

string_enum!(SubmissionStatus {
    New => "new",
    InProgress => "in_progress",
    Closed => "closed",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: RecordId,
    pub slug: Localized,
    pub title: Localized,
    #[serde(default)]
    pub description: Localized,
    pub category: Category,
    pub transaction: Transaction,
    #[serde(default)]
    pub status: ListingStatus,
    /// `None` means "price on request".
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub currency: Currency,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

impl Record for Listing {
    const TABLE: &'static str = "listings";
    const ENTITY: &'static str = "Listing";

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: RecordId,
    pub slug: String,
    pub name: Localized,
    #[serde(default)]
    pub description: Localized,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Destination {
    const TABLE: &'static str = "destinations";
    const ENTITY: &'static str = "Destination";

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: RecordId,
    pub slug: String,
    pub name: String,
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
    pub created_at: DateTime<Utc>,
}

impl Record for Agent {
    const TABLE: &'static str = "agents";
    const ENTITY: &'static str = "Agent";

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Office {
    pub id: RecordId,
    pub slug: String,
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub opening_hours: Localized,
    pub created_at: DateTime<Utc>,
}

impl Record for Office {
    const TABLE: &'static str = "offices";
    const ENTITY: &'static str = "Office";

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub message: String,
    #[serde(default)]
    pub listing_id: Option<RecordId>,
    pub locale: Locale,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for ContactSubmission {
    const TABLE: &'static str = "contact_submissions";
    const ENTITY: &'static str = "Contact submission";

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyIntake {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub category: Category,
    pub transaction: Transaction,
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub asking_price: Option<u64>,
    #[serde(default)]
    pub description: String,
    pub locale: Locale,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for PropertyIntake {
    const TABLE: &'static str = "property_intakes";
    const ENTITY: &'static str = "Property intake";

    fn id(&self) -> RecordId {
        self.id
    }
}

fn default_true() -> bool {
    true
}
