//! Persistence behind one repository per table.
//!
//! The production backend is the hosted Postgres service reached through its
//! REST gateway; the in-memory backend serves development and tests. Neither
//! filters server side: pages fetch rows and run the listing pipeline over
//! them.

mod memory;
mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

pub use memory::MemoryRepository;
pub use rest::RestRepository;

use crate::{
    config::{DatabaseBackend, DatabaseConfig, RestConfig},
    error::{RealtyError, Result},
    model::{
        Agent, ContactSubmission, Destination, Listing, Office, PropertyIntake, Record, RecordId,
    },
};

#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>>;
    async fn get(&self, id: RecordId) -> Result<Option<T>>;
    async fn insert(&self, record: T) -> Result<T>;
    /// Replaces the stored row with the same id; `NotFound` when absent.
    async fn update(&self, record: T) -> Result<T>;
    /// `NotFound` when absent.
    async fn delete(&self, id: RecordId) -> Result<()>;

    async fn require(&self, id: RecordId) -> Result<T> {
        self.get(id)
            .await?
            .ok_or_else(|| RealtyError::not_found(T::ENTITY, id))
    }
}

#[derive(Clone)]
pub struct Store {
    pub listings: Arc<dyn Repository<Listing>>,
    pub destinations: Arc<dyn Repository<Destination>>,
    pub agents: Arc<dyn Repository<Agent>>,
    pub offices: Arc<dyn Repository<Office>>,
    pub contacts: Arc<dyn Repository<ContactSubmission>>,
    pub intakes: Arc<dyn Repository<PropertyIntake>>,
}

impl Store {
    pub fn memory() -> Self {
        Self {
            listings: Arc::new(MemoryRepository::new()),
            destinations: Arc::new(MemoryRepository::new()),
            agents: Arc::new(MemoryRepository::new()),
            offices: Arc::new(MemoryRepository::new()),
            contacts: Arc::new(MemoryRepository::new()),
            intakes: Arc::new(MemoryRepository::new()),
        }
    }

    pub fn rest(config: &RestConfig) -> Result<Self> {
        let client = rest::build_client(config)?;
        Ok(Self {
            listings: Arc::new(RestRepository::new(client.clone(), config)?),
            destinations: Arc::new(RestRepository::new(client.clone(), config)?),
            agents: Arc::new(RestRepository::new(client.clone(), config)?),
            offices: Arc::new(RestRepository::new(client.clone(), config)?),
            contacts: Arc::new(RestRepository::new(client.clone(), config)?),
            intakes: Arc::new(RestRepository::new(client, config)?),
        })
    }

    pub fn from_settings(config: &DatabaseConfig) -> Result<Self> {
        match config.backend {
            DatabaseBackend::Memory => {
                info!("Using in-memory store");
                Ok(Self::memory())
            }
            DatabaseBackend::Rest => {
                info!("Using hosted database at {}", config.rest.url);
                Self::rest(&config.rest)
            }
        }
    }
}
