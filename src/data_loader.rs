//! Request-scoped entity loading.
//!
//! A [`RequestLoader`] is built for each inbound request and dropped with it.
//! Within that lifetime repeated lookups of the same key hit the cache and
//! return the same `Arc`, concurrent lookups of one key share a single
//! fetch, and [`EntityLoader::load_many`] resolves every uncached key with
//! one query.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tokio::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

use crate::database::entities::{organization_users, team_members, teams, users};
use crate::errors::{CoreError, CoreResult};

/// A model that can be fetched in batches by string primary key.
#[async_trait]
pub trait Loadable: Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn key(&self) -> &str;

    async fn fetch_many(db: &DatabaseConnection, ids: &[String]) -> Result<Vec<Self>, DbErr>;
}

type Slot<T> = Arc<OnceCell<Option<Arc<T>>>>;

pub struct EntityLoader<T: Loadable> {
    db: DatabaseConnection,
    slots: Mutex<HashMap<String, Slot<T>>>,
    fetches: AtomicUsize,
}

impl<T: Loadable> EntityLoader<T> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            slots: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    fn slot(&self, id: &str) -> CoreResult<Slot<T>> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| CoreError::internal("Loader cache poisoned"))?;
        Ok(slots
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone())
    }

    pub async fn load(&self, id: &str) -> CoreResult<Option<Arc<T>>> {
        let slot = self.slot(id)?;
        let value = slot
            .get_or_try_init(|| async {
                self.fetches.fetch_add(1, Ordering::Relaxed);
                let mut rows = T::fetch_many(&self.db, &[id.to_string()])
                    .await
                    .map_err(|e| CoreError::database(T::COLLECTION, e))?;
                Ok::<_, CoreError>(rows.pop().map(Arc::new))
            })
            .await?;
        Ok(value.clone())
    }

    /// Results in the order of `ids`; missing rows are `None`.
    pub async fn load_many(&self, ids: &[String]) -> CoreResult<Vec<Option<Arc<T>>>> {
        let slots = ids
            .iter()
            .map(|id| self.slot(id).map(|slot| (id, slot)))
            .collect::<CoreResult<Vec<_>>>()?;

        let mut missing: Vec<String> = Vec::new();
        for (id, slot) in &slots {
            if !slot.initialized() && !missing.contains(*id) {
                missing.push((*id).clone());
            }
        }

        if !missing.is_empty() {
            debug!("Batch loading {} {}", missing.len(), T::COLLECTION);
            self.fetches.fetch_add(1, Ordering::Relaxed);
            let rows = T::fetch_many(&self.db, &missing)
                .await
                .map_err(|e| CoreError::database(T::COLLECTION, e))?;
            let mut by_key: HashMap<String, Arc<T>> = rows
                .into_iter()
                .map(|row| (row.key().to_string(), Arc::new(row)))
                .collect();
            for (id, slot) in &slots {
                if !slot.initialized() {
                    // A concurrent load may have filled the slot meanwhile
                    let _ = slot.set(by_key.remove(id.as_str()));
                }
            }
        }

        let mut results = Vec::with_capacity(slots.len());
        for (id, slot) in &slots {
            match slot.get() {
                Some(value) => results.push(value.clone()),
                None => results.push(self.load(id).await?),
            }
        }
        Ok(results)
    }

    /// Seed the cache with a row that was just written.
    pub fn prime(&self, row: T) {
        let key = row.key().to_string();
        if let Ok(mut slots) = self.slots.lock() {
            let slot = OnceCell::new_with(Some(Some(Arc::new(row))));
            slots.insert(key, Arc::new(slot));
        }
    }

    /// Forget `id` so the next load reads the store again.
    pub fn clear(&self, id: &str) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.remove(id);
        }
    }

    /// Number of queries issued so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Loadable for users::Model {
    const COLLECTION: &'static str = "users";

    fn key(&self) -> &str {
        &self.id
    }

    async fn fetch_many(db: &DatabaseConnection, ids: &[String]) -> Result<Vec<Self>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(db)
            .await
    }
}

#[async_trait]
impl Loadable for teams::Model {
    const COLLECTION: &'static str = "teams";

    fn key(&self) -> &str {
        &self.id
    }

    async fn fetch_many(db: &DatabaseConnection, ids: &[String]) -> Result<Vec<Self>, DbErr> {
        teams::Entity::find()
            .filter(teams::Column::Id.is_in(ids.to_vec()))
            .all(db)
            .await
    }
}

#[async_trait]
impl Loadable for team_members::Model {
    const COLLECTION: &'static str = "team_members";

    fn key(&self) -> &str {
        &self.id
    }

    async fn fetch_many(db: &DatabaseConnection, ids: &[String]) -> Result<Vec<Self>, DbErr> {
        team_members::Entity::find()
            .filter(team_members::Column::Id.is_in(ids.to_vec()))
            .all(db)
            .await
    }
}

#[async_trait]
impl Loadable for organization_users::Model {
    const COLLECTION: &'static str = "organization_users";

    fn key(&self) -> &str {
        &self.id
    }

    async fn fetch_many(db: &DatabaseConnection, ids: &[String]) -> Result<Vec<Self>, DbErr> {
        organization_users::Entity::find()
            .filter(organization_users::Column::Id.is_in(ids.to_vec()))
            .all(db)
            .await
    }
}

/// The per-request bundle of loaders plus the request's operation id.
pub struct RequestLoader {
    operation_id: OnceLock<String>,
    users: EntityLoader<users::Model>,
    teams: EntityLoader<teams::Model>,
    team_members: EntityLoader<team_members::Model>,
    organization_users: EntityLoader<organization_users::Model>,
}

impl RequestLoader {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            operation_id: OnceLock::new(),
            users: EntityLoader::new(db.clone()),
            teams: EntityLoader::new(db.clone()),
            team_members: EntityLoader::new(db.clone()),
            organization_users: EntityLoader::new(db),
        }
    }

    /// Correlation id for every event this request publishes. Stable for
    /// the loader's lifetime.
    pub fn share(&self) -> &str {
        self.operation_id
            .get_or_init(|| Uuid::new_v4().to_string())
            .as_str()
    }

    pub fn users(&self) -> &EntityLoader<users::Model> {
        &self.users
    }

    pub fn teams(&self) -> &EntityLoader<teams::Model> {
        &self.teams
    }

    pub fn team_members(&self) -> &EntityLoader<team_members::Model> {
        &self.team_members
    }

    pub fn organization_users(&self) -> &EntityLoader<organization_users::Model> {
        &self.organization_users
    }

    pub fn fetch_count(&self) -> usize {
        self.users.fetch_count()
            + self.teams.fetch_count()
            + self.team_members.fetch_count()
            + self.organization_users.fetch_count()
    }
}
