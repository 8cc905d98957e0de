use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Keeps the registry from accumulating one entry per calendar day
/// forever; idle entries are swept once the map grows past this.
const SWEEP_THRESHOLD: usize = 1024;

/// One async mutex per (doctor, date) pair. Holding the guard
/// serializes the read-check-insert window of every booking that
/// touches that doctor's day, which is what closes the double-booking
/// race between two concurrent requests for the same slot.
///
/// This covers a single process. Horizontal scaling needs the
/// exclusion moved into the store itself.
#[derive(Default)]
pub struct SlotLockRegistry {
    locks: Mutex<HashMap<(Uuid, NaiveDate), Arc<AsyncMutex<()>>>>,
}

impl SlotLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, doctor_id: Uuid, date: NaiveDate) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self
                .locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if map.len() > SWEEP_THRESHOLD {
                map.retain(|_, l| Arc::strong_count(l) > 1);
            }

            map.entry((doctor_id, date))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
