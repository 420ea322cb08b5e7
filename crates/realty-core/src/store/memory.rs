use async_trait::async_trait;
use dashmap::DashMap;

use super::Repository;
use crate::{
    error::{RealtyError, Result},
    model::{Record, RecordId},
};

pub struct MemoryRepository<T: Record> {
    rows: DashMap<RecordId, T>,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn list(&self) -> Result<Vec<T>> {
        Ok(self.rows.iter().map(|row| row.value().clone()).collect())
    }

    async fn get(&self, id: RecordId) -> Result<Option<T>> {
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    async fn insert(&self, record: T) -> Result<T> {
        use dashmap::mapref::entry::Entry;

        match self.rows.entry(record.id()) {
            Entry::Occupied(_) => Err(RealtyError::Conflict(format!(
                "{} {} already exists",
                T::ENTITY,
                record.id()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update(&self, record: T) -> Result<T> {
        match self.rows.get_mut(&record.id()) {
            Some(mut row) => {
                *row = record.clone();
                Ok(record)
            }
            None => Err(RealtyError::not_found(T::ENTITY, record.id())),
        }
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RealtyError::not_found(T::ENTITY, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Destination, Localized};
    use chrono::Utc;
    use uuid::Uuid;

    fn destination(slug: &str) -> Destination {
        Destination {
            id: Uuid::new_v4(),
            slug: slug.into(),
            name: Localized::new(slug, slug),
            description: Localized::default(),
            country: "CZ".into(),
            image: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_get_update_delete() {
        let repo = MemoryRepository::<Destination>::new();
        let mut row = repo.insert(destination("sumava")).await.unwrap();
        assert_eq!(repo.get(row.id).await.unwrap().unwrap().slug, "sumava");

        row.country = "Czechia".into();
        repo.update(row.clone()).await.unwrap();
        assert_eq!(repo.require(row.id).await.unwrap().country, "Czechia");

        repo.delete(row.id).await.unwrap();
        assert!(repo.get(row.id).await.unwrap().is_none());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let repo = MemoryRepository::<Destination>::new();
        let row = repo.insert(destination("krkonose")).await.unwrap();
        let err = repo.insert(row).await.unwrap_err();
        assert!(matches!(err, RealtyError::Conflict(_)));
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let repo = MemoryRepository::<Destination>::new();
        let ghost = destination("ghost");
        assert!(matches!(
            repo.update(ghost.clone()).await,
            Err(RealtyError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete(ghost.id).await,
            Err(RealtyError::NotFound { .. })
        ));
        assert!(matches!(
            repo.require(ghost.id).await,
            Err(RealtyError::NotFound { entity: "Destination", .. })
        ));
    }
}
