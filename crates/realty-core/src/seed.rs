use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::Result,
    model::{Agent, Destination, Listing, Office},
    store::Store,
};

/// Catalogue rows loaded into an empty store, typically the in-memory one
/// used for local development.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub offices: Vec<Office>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

impl SeedData {
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn len(&self) -> usize {
        self.destinations.len() + self.offices.len() + self.agents.len() + self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts every row, parents before children.
    pub async fn apply(self, store: &Store) -> Result<usize> {
        let total = self.len();
        for destination in self.destinations {
            store.destinations.insert(destination).await?;
        }
        for office in self.offices {
            store.offices.insert(office).await?;
        }
        for agent in self.agents {
            store.agents.insert(agent).await?;
        }
        for listing in self.listings {
            store.listings.insert(listing).await?;
        }
        info!(rows = total, "Seed data applied");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_and_applies_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"{
                "offices": [{
                    "id": "7d0b1c2e-6a7b-4e52-9a51-0c7f6b0c1a01",
                    "slug": "praha-vinohrady",
                    "name": "Praha Vinohrady",
                    "address": "Vinohradská 12",
                    "city": "Praha",
                    "created_at": "2026-01-05T09:00:00Z"
                }]
            }"#,
        )
        .unwrap();

        let seed = SeedData::from_file(&path).await.unwrap();
        assert_eq!(seed.len(), 1);

        let store = Store::memory();
        assert_eq!(seed.apply(&store).await.unwrap(), 1);
        let offices = store.offices.list().await.unwrap();
        assert_eq!(offices[0].slug, "praha-vinohrady");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = SeedData::from_file(Path::new("/definitely/not/here.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::RealtyError::Io(_)));
    }
}
