//! Session cache over principal lookups.
//!
//! The cache is the only mutable shared state in the process. Three rules
//! govern it:
//!
//! 1. Single-flight: concurrent refreshes for the same principal serialize on
//!    a per-principal async mutex; the latecomer re-checks the cache after
//!    acquiring and reuses the first caller's result instead of hitting the
//!    store again.
//! 2. Last-request-wins: `invalidate`/`sign_out` bump a per-principal
//!    generation; a refresh that started before the bump discards its result
//!    instead of resurrecting stale data.
//! 3. Sign-out is synchronous: the entry is gone before `sign_out` returns,
//!    so no read observes a signed-out principal afterwards.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, instrument};

use formline_models::ids::UserId;
use formline_models::roles::Principal;

use crate::store::{PrincipalStore, StoreError};

struct CacheEntry {
    principal: Principal,
    fetched_at: Instant,
}

pub struct SessionCache {
    ttl: Duration,
    entries: RwLock<HashMap<UserId, CacheEntry>>,
    generations: RwLock<HashMap<UserId, u64>>,
    flights: Mutex<HashMap<UserId, std::sync::Arc<AsyncMutex<()>>>>,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            generations: RwLock::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Cached principal, only while fresh.
    pub fn current(&self, id: UserId) -> Option<Principal> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&id)?;
        if entry.fetched_at.elapsed() <= self.ttl {
            Some(entry.principal.clone())
        } else {
            None
        }
    }

    /// Refresh from the store, deduplicating concurrent calls.
    ///
    /// Returns `None` when the principal no longer exists in the store, or
    /// when the result was superseded by an `invalidate`/`sign_out` that
    /// landed while the lookup was in flight.
    #[instrument(skip(self, store))]
    pub async fn refresh(
        &self,
        store: &dyn PrincipalStore,
        id: UserId,
        force: bool,
    ) -> Result<Option<Principal>, StoreError> {
        if !force {
            if let Some(principal) = self.current(id) {
                return Ok(Some(principal));
            }
        }

        let flight = self.flight(id);
        let _guard = flight.lock().await;

        // Another caller may have refreshed while we waited for the flight.
        if !force {
            if let Some(principal) = self.current(id) {
                debug!("Refresh satisfied by concurrent flight");
                return Ok(Some(principal));
            }
        }

        let generation_before = self.generation(id);
        let looked_up = store.principal(id).await?;
        let fetched_at = Instant::now();

        if self.generation(id) != generation_before {
            debug!("Discarding superseded refresh result");
            return Ok(None);
        }

        match looked_up {
            Some(principal) => {
                if let Ok(mut entries) = self.entries.write() {
                    entries.insert(
                        id,
                        CacheEntry {
                            principal: principal.clone(),
                            fetched_at,
                        },
                    );
                }
                Ok(Some(principal))
            }
            None => {
                if let Ok(mut entries) = self.entries.write() {
                    entries.remove(&id);
                }
                Ok(None)
            }
        }
    }

    /// Drop the cached entry and invalidate any in-flight refresh.
    pub fn invalidate(&self, id: UserId) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(&id);
        }
        if let Ok(mut generations) = self.generations.write() {
            *generations.entry(id).or_insert(0) += 1;
        }
    }

    /// Terminal invalidation. The entry is removed before this returns.
    pub fn sign_out(&self, id: UserId) {
        self.invalidate(id);
        if let Ok(mut flights) = self.flights.lock() {
            flights.remove(&id);
        }
    }

    fn flight(&self, id: UserId) -> std::sync::Arc<AsyncMutex<()>> {
        let mut flights = match self.flights.lock() {
            Ok(flights) => flights,
            Err(poisoned) => poisoned.into_inner(),
        };
        flights
            .entry(id)
            .or_insert_with(|| std::sync::Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn generation(&self, id: UserId) -> u64 {
        self.generations
            .read()
            .ok()
            .and_then(|g| g.get(&id).copied())
            .unwrap_or(0)
    }
}
