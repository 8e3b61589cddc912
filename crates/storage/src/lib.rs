#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use std::{cell::RefCell, collections::BTreeMap, fmt::Display};

use chrono::{DateTime, SubsecRound, Utc};
use log::warn;
use minigym_domain::{self as domain, Publisher, Subscription};
use minigym_web_app::{Settings, sync::Refresh};
use serde::{Serialize, de::DeserializeOwned};
use strum::AsRefStr;

pub mod fallback;
#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
pub mod memory;
pub mod records;
pub mod rest;


use fallback::Fallback;
use local_storage::LocalStorage;
use rest::{GlooNetSendRequest, REST};

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Workouts,
    Sessions,
}

/// Persisted state of a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub records: Vec<serde_json::Value>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Returns `None` if the collection has never been written.
    async fn read(&self, collection: Collection) -> Result<Option<Document>, domain::StorageError>;
    async fn write(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), domain::StorageError>;
}

/// Persistent marker of the one-time migration of local data.
pub trait MigrationLog {
    fn migrated(&self) -> bool;
    fn set_migrated(&self) -> Result<(), domain::StorageError>;
}

/// Domain repository on top of a document store.
///
/// Every successful write and every refresh that observes changed content is
/// published to the subscribers of the collection.
///
/// Records that could not be converted into domain values on the last read are
/// retained as they are and written back with every write of their collection.
pub struct Repository<D> {
    store: D,
    workouts: Publisher<Vec<domain::Workout>>,
    sessions: Publisher<Vec<domain::WorkoutSession>>,
    retained: RefCell<BTreeMap<Collection, Vec<serde_json::Value>>>,
}

impl<D> Repository<D> {
    pub fn new(store: D) -> Self {
        Self {
            store,
            workouts: Publisher::default(),
            sessions: Publisher::default(),
            retained: RefCell::default(),
        }
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// Records of a collection that could not be converted on the last read.
    pub fn retained(&self, collection: Collection) -> Vec<serde_json::Value> {
        self.retained
            .borrow()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

impl<D: DocumentStore> Repository<D> {
    async fn read_records<R, T>(&self, collection: Collection) -> Result<Vec<T>, domain::StorageError>
    where
        R: DeserializeOwned,
        T: TryFrom<R>,
        T::Error: Display,
    {
        let records = self
            .store
            .read(collection)
            .await?
            .map(|document| document.records)
            .unwrap_or_default();
        let (items, retained) = decode::<R, T>(collection, records);
        self.retained.borrow_mut().insert(collection, retained);
        Ok(items)
    }

    async fn write_records<R: Serialize>(
        &self,
        collection: Collection,
        records: &[R],
    ) -> Result<(), domain::StorageError> {
        let mut records = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| domain::StorageError::Other(err.into()))?;
        records.extend(self.retained(collection));
        self.store
            .write(
                collection,
                &Document {
                    records,
                    updated_at: Some(Utc::now().trunc_subsecs(3)),
                },
            )
            .await
    }
}

/// Convert records. Returns the converted records and the records that are
/// not valid, unchanged.
fn decode<R, T>(
    collection: Collection,
    records: Vec<serde_json::Value>,
) -> (Vec<T>, Vec<serde_json::Value>)
where
    R: DeserializeOwned,
    T: TryFrom<R>,
    T::Error: Display,
{
    let mut items = vec![];
    let mut retained = vec![];

    for value in records {
        let result = R::deserialize(&value)
            .map_err(|err| err.to_string())
            .and_then(|record| T::try_from(record).map_err(|err| err.to_string()));
        match result {
            Ok(item) => items.push(item),
            Err(err) => {
                warn!(
                    "keeping invalid record in {} unchanged: {err}",
                    collection.as_ref()
                );
                retained.push(value);
            }
        }
    }

    (items, retained)
}

impl<D: DocumentStore> domain::WorkoutRepository for Repository<D> {
    async fn read_workouts(&self) -> Result<Vec<domain::Workout>, domain::ReadError> {
        let workouts = self
            .read_records::<records::Workout, _>(Collection::Workouts)
            .await?;
        self.workouts.publish(workouts.clone());
        Ok(workouts)
    }

    async fn write_workouts(&self, workouts: &[domain::Workout]) -> Result<(), domain::WriteError> {
        let records = workouts.iter().map(records::Workout::from).collect::<Vec<_>>();
        self.write_records(Collection::Workouts, &records).await?;
        self.workouts.publish(workouts.to_vec());
        Ok(())
    }

    fn subscribe_workouts(&self) -> Subscription<Vec<domain::Workout>> {
        self.workouts.subscribe()
    }
}

impl<D: DocumentStore> domain::WorkoutSessionRepository for Repository<D> {
    async fn read_workout_sessions(&self) -> Result<Vec<domain::WorkoutSession>, domain::ReadError> {
        let sessions = self
            .read_records::<records::WorkoutSession, _>(Collection::Sessions)
            .await?;
        self.sessions.publish(sessions.clone());
        Ok(sessions)
    }

    async fn write_workout_sessions(
        &self,
        sessions: &[domain::WorkoutSession],
    ) -> Result<(), domain::WriteError> {
        let records = sessions
            .iter()
            .map(records::WorkoutSession::from)
            .collect::<Vec<_>>();
        self.write_records(Collection::Sessions, &records).await?;
        self.sessions.publish(sessions.to_vec());
        Ok(())
    }

    fn subscribe_workout_sessions(&self) -> Subscription<Vec<domain::WorkoutSession>> {
        self.sessions.subscribe()
    }
}

impl<D: DocumentStore> Refresh for Repository<D> {
    async fn refresh(&self) -> Result<bool, domain::ReadError> {
        let workouts = self
            .read_records::<records::Workout, domain::Workout>(Collection::Workouts)
            .await?;
        let sessions = self
            .read_records::<records::WorkoutSession, domain::WorkoutSession>(Collection::Sessions)
            .await?;
        let workouts_changed = self.workouts.publish(workouts);
        let sessions_changed = self.sessions.publish(sessions);
        Ok(workouts_changed || sessions_changed)
    }
}

pub type BrowserRepository = Repository<Fallback<REST<GlooNetSendRequest>, LocalStorage>>;

/// Create the repository used by the browser application.
///
/// If a remote store is configured, local data is copied to it once.
pub async fn open(settings: &Settings) -> BrowserRepository {
    let remote = settings
        .remote()
        .map(|config| REST::new(config.clone(), GlooNetSendRequest));
    let store = Fallback::new(remote, LocalStorage);
    if store.has_remote() {
        if let Err(err) = store.migrate().await {
            warn!("failed to migrate local data: {err}");
        }
    }
    Repository::new(store)
}
