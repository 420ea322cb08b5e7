pub mod config;
pub mod error;
pub mod filter;
pub mod forms;
pub mod i18n;
pub mod locale;
pub mod model;
pub mod routing;
pub mod seed;
pub mod store;
pub mod text;
pub mod validation;

pub use config::{
    AdminConfig, ConfigManager, DatabaseBackend, DatabaseConfig, LoggingConfig, RestConfig,
    SecretsConfig, SecurityConfig, ServerConfig, Settings, SiteConfig,
};
pub use error::*;
pub use filter::{Facets, ListingFilter, ListingQuery, ListingSort};
pub use forms::{
    AgentInput, ContactForm, DestinationInput, ListingInput, OfficeInput, PropertyIntakeForm,
    StatusUpdate,
};
pub use locale::Locale;
pub use model::*;
pub use routing::{Page, RouteMatch};
pub use seed::SeedData;
pub use store::{MemoryRepository, Repository, RestRepository, Store};
pub use validation::{FieldError, Validate, ValidationErrors};
