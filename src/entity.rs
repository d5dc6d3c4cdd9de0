use chrono::{DateTime, Local};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::store::Persistence;
use crate::validation::ValidationError;

/// A record kept in an [`EntityList`]: persisted under `LIST_KEY`, with its
/// id counter under `COUNTER_KEY`.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    const LIST_KEY: &'static str;
    const COUNTER_KEY: &'static str;

    /// Fields supplied by the user when creating a record
    type Draft;
    /// Changes merged into an existing record
    type Patch;

    fn validate(draft: &Self::Draft) -> Result<(), ValidationError>;

    fn validate_patch(_patch: &Self::Patch) -> Result<(), ValidationError> {
        Ok(())
    }

    fn build(id: u64, draft: Self::Draft, now: DateTime<Local>) -> Self;

    fn id(&self) -> u64;

    fn apply(&mut self, patch: Self::Patch, now: DateTime<Local>);
}

/// Whether a save creates a new record or overwrites an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Edit(u64),
}

/// Ordered, persisted records with monotonically increasing ids.
///
/// Every mutation writes the whole list and the counter in one batch.
pub struct EntityList<T: Entity> {
    items: Vec<T>,
    next_id: u64,
    persistence: Persistence,
}

impl<T: Entity> EntityList<T> {
    /// Load the list and counter from storage, falling back to an empty list
    pub fn load(persistence: Persistence) -> Self {
        let items: Vec<T> = persistence.load(T::LIST_KEY).unwrap_or_default();
        let stored_next: u64 = persistence.load(T::COUNTER_KEY).unwrap_or(1);

        // Never hand out an id that is already taken, even if the counter was lost
        let max_id = items.iter().map(Entity::id).max().unwrap_or(0);
        let next_id = stored_next.max(max_id + 1);

        Self {
            items,
            next_id,
            persistence,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The id the next created record will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn is_degraded(&self) -> bool {
        self.persistence.is_degraded()
    }

    /// Validate, assign the next id, append and persist
    pub fn create(
        &mut self,
        draft: T::Draft,
        now: DateTime<Local>,
    ) -> Result<u64, ValidationError> {
        T::validate(&draft)?;

        let id = self.next_id;
        self.next_id += 1;
        self.items.push(T::build(id, draft, now));
        self.persist();

        Ok(id)
    }

    /// Merge a patch into the record with `id`. Returns `false` when no such record exists.
    pub fn update(
        &mut self,
        id: u64,
        patch: T::Patch,
        now: DateTime<Local>,
    ) -> Result<bool, ValidationError> {
        T::validate_patch(&patch)?;

        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            debug!(key = T::LIST_KEY, id, "update of missing record ignored");
            return Ok(false);
        };
        item.apply(patch, now);
        self.persist();

        Ok(true)
    }

    /// Single entry point for the create and edit forms
    pub fn save(
        &mut self,
        mode: SaveMode,
        draft: T::Draft,
        now: DateTime<Local>,
    ) -> Result<Option<u64>, ValidationError>
    where
        T::Patch: From<T::Draft>,
    {
        match mode {
            SaveMode::Create => self.create(draft, now).map(Some),
            SaveMode::Edit(id) => {
                T::validate(&draft)?;
                let updated = self.update(id, T::Patch::from(draft), now)?;
                Ok(updated.then_some(id))
            }
        }
    }

    /// Remove the record with `id`. Returns `false` when no such record exists.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);

        if self.items.len() == before {
            debug!(key = T::LIST_KEY, id, "delete of missing record ignored");
            return false;
        }
        self.persist();
        true
    }

    pub fn find(&self, id: u64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Records matching `predicate`, in list order
    pub fn filter<P>(&self, predicate: P) -> Vec<&T>
    where
        P: Fn(&T) -> bool,
    {
        self.items.iter().filter(|item| predicate(*item)).collect()
    }

    /// Permute the records in place and persist the new order
    pub fn reorder<F>(&mut self, f: F)
    where
        F: FnOnce(&mut [T]),
    {
        f(&mut self.items);
        self.persist();
    }

    /// Install records when the list is empty. Returns `true` if anything was added.
    pub fn seed(&mut self, records: Vec<T>) -> bool {
        if !self.items.is_empty() || records.is_empty() {
            return false;
        }
        let max_id = records.iter().map(Entity::id).max().unwrap_or(0);
        self.items = records;
        self.next_id = self.next_id.max(max_id + 1);
        self.persist();
        true
    }

    fn persist(&self) {
        self.persistence.save_pair(
            (T::LIST_KEY, &self.items),
            (T::COUNTER_KEY, &self.next_id),
        );
    }
}
