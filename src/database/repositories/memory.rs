use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Location, Shift};
use crate::database::repositories::{LocationDirectory, ShiftStore};

/// Process-local shift store. Every conditional write happens under one write lock.
#[derive(Clone, Default)]
pub struct InMemoryShiftStore {
    shifts: Arc<RwLock<HashMap<Uuid, Shift>>>,
}

impl InMemoryShiftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.shifts.read().await.len()
    }
}

#[async_trait]
impl ShiftStore for InMemoryShiftStore {
    async fn insert(&self, shift: &Shift) -> Result<Shift> {
        let mut shifts = self.shifts.write().await;
        if shifts.contains_key(&shift.id) {
            return Err(anyhow!("Shift {} already exists", shift.id));
        }
        shifts.insert(shift.id, shift.clone());
        Ok(shift.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>> {
        Ok(self.shifts.read().await.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Shift>> {
        let mut owned: Vec<Shift> = self
            .shifts
            .read()
            .await
            .values()
            .filter(|shift| shift.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|shift| (shift.date, shift.start_time));
        Ok(owned)
    }

    async fn save_if_version(
        &self,
        shift: &Shift,
        expected_version: i64,
    ) -> Result<Option<Shift>> {
        let mut shifts = self.shifts.write().await;
        let Some(current) = shifts.get_mut(&shift.id) else {
            return Ok(None);
        };
        if current.version != expected_version {
            return Ok(None);
        }

        let mut saved = shift.clone();
        saved.version = expected_version + 1;
        // Identity fields are fixed at creation.
        saved.owner_user_id = current.owner_user_id;
        saved.created_at = current.created_at;
        *current = saved.clone();

        Ok(Some(saved))
    }

    async fn delete_if_version(&self, id: Uuid, expected_version: i64) -> Result<bool> {
        let mut shifts = self.shifts.write().await;
        match shifts.get(&id) {
            Some(current) if current.version == expected_version => {
                shifts.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryLocationDirectory {
    locations: Arc<RwLock<HashMap<Uuid, Location>>>,
}

impl InMemoryLocationDirectory {
    pub fn with_locations(locations: impl IntoIterator<Item = Location>) -> Self {
        let map = locations
            .into_iter()
            .map(|location| (location.id, location))
            .collect();
        Self {
            locations: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn add(&self, location: Location) {
        self.locations.write().await.insert(location.id, location);
    }
}

#[async_trait]
impl LocationDirectory for InMemoryLocationDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>> {
        Ok(self.locations.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Location>> {
        let mut locations: Vec<Location> =
            self.locations.read().await.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}
