//! In-memory car store
//!
//! Iteration order is insertion order. Replacing a car keeps its slot;
//! deleting frees it. A create batch probes and inserts under a single
//! write lock, so concurrent creates never hand out the same identifier.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::schema::{Car, CarPatch};

use super::errors::{StoreError, StoreResult};
use super::CarId;

#[derive(Debug, Default)]
struct Inner {
    cars: HashMap<CarId, Car>,
    order: Vec<CarId>,
}

impl Inner {
    fn insert(&mut self, id: CarId, car: Car) {
        if self.cars.insert(id, car).is_none() {
            self.order.push(id);
        }
    }
}

/// Process-lifetime store of cars keyed by identifier.
#[derive(Debug, Default)]
pub struct CarStore {
    inner: RwLock<Inner>,
}

impl CarStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }

    /// Number of stored cars
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.order.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn contains(&self, id: CarId) -> StoreResult<bool> {
        Ok(self.read()?.cars.contains_key(&id))
    }

    /// Look up a single car
    pub fn get(&self, id: CarId) -> StoreResult<Car> {
        self.read()?
            .cars
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// The first `limit` cars in insertion order
    pub fn list(&self, limit: usize) -> StoreResult<Vec<(CarId, Car)>> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .take(limit)
            .filter_map(|id| inner.cars.get(id).map(|car| (*id, car.clone())))
            .collect())
    }

    /// Insert or replace the car at `id`
    pub fn set(&self, id: CarId, car: Car) -> StoreResult<()> {
        self.write()?.insert(id, car);
        Ok(())
    }

    /// Insert a batch of cars, returning the identifiers assigned in order.
    ///
    /// The probe cursor starts at `len + min_id` (floored at zero). Each car
    /// takes the first free identifier at or above the cursor, and the cursor
    /// then moves one past it.
    pub fn insert_batch(&self, cars: Vec<Car>, min_id: i64) -> StoreResult<Vec<CarId>> {
        if cars.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let mut inner = self.write()?;
        let start = (inner.order.len() as i64).saturating_add(min_id).max(0);
        let mut cursor = start as CarId;
        let mut ids = Vec::with_capacity(cars.len());

        for car in cars {
            while inner.cars.contains_key(&cursor) {
                cursor = cursor
                    .checked_add(1)
                    .ok_or(StoreError::IdsExhausted(start as CarId))?;
            }
            inner.insert(cursor, car);
            ids.push(cursor);
            cursor = cursor.saturating_add(1);
        }

        Ok(ids)
    }

    /// Merge `patch` into the stored car and return the result.
    pub fn update(&self, id: CarId, patch: CarPatch) -> StoreResult<Car> {
        let mut inner = self.write()?;
        let stored = inner.cars.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let merged = stored.clone().apply(patch);
        *stored = merged.clone();
        Ok(merged)
    }

    /// Remove a car, returning it.
    pub fn delete(&self, id: CarId) -> StoreResult<Car> {
        let mut inner = self.write()?;
        let car = inner.cars.remove(&id).ok_or(StoreError::NotFound(id))?;
        inner.order.retain(|existing| *existing != id);
        Ok(car)
    }
}
