use std::collections::VecDeque;

use gloo_storage::{Storage as GlooStorage, errors::StorageError};
use minigym_domain as domain;
use minigym_web_app::{Settings, SettingsRepository, log};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Collection, Document, DocumentStore, MigrationLog,
    records::{format_timestamp, parse_timestamp},
};

/// Browser local storage.
///
/// Collections are stored as plain JSON arrays under their name, their
/// timestamp under the name followed by ` updated`.
#[derive(Debug, Clone, Copy)]
pub struct LocalStorage;

const KEY_SETTINGS: &str = "settings";
const KEY_MIGRATED: &str = "migrated";

fn timestamp_key(collection: Collection) -> String {
    format!("{} updated", collection.as_ref())
}

fn get<T: DeserializeOwned>(key: &str) -> Result<Option<T>, StorageError> {
    match gloo_storage::LocalStorage::get(key) {
        Ok(value) => Ok(Some(value)),
        Err(StorageError::KeyNotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

fn set<T: Serialize>(key: &str, value: T) -> Result<(), domain::StorageError> {
    gloo_storage::LocalStorage::set(key, value).map_err(|err| domain::StorageError::Other(err.into()))
}

impl DocumentStore for LocalStorage {
    async fn read(&self, collection: Collection) -> Result<Option<Document>, domain::StorageError> {
        let records = get::<Vec<serde_json::Value>>(collection.as_ref())
            .map_err(|err| domain::StorageError::Other(err.into()))?;
        let Some(records) = records else {
            return Ok(None);
        };
        let updated_at = get::<String>(&timestamp_key(collection))
            .ok()
            .flatten()
            .and_then(|timestamp| parse_timestamp(&timestamp).ok());
        Ok(Some(Document {
            records,
            updated_at,
        }))
    }

    async fn write(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), domain::StorageError> {
        set(collection.as_ref(), &document.records)?;
        match document.updated_at {
            Some(updated_at) => set(&timestamp_key(collection), format_timestamp(updated_at)),
            None => {
                gloo_storage::LocalStorage::delete(timestamp_key(collection));
                Ok(())
            }
        }
    }
}

impl MigrationLog for LocalStorage {
    fn migrated(&self) -> bool {
        matches!(get::<bool>(KEY_MIGRATED), Ok(Some(true)))
    }

    fn set_migrated(&self) -> Result<(), domain::StorageError> {
        set(KEY_MIGRATED, true)
    }
}

impl SettingsRepository for LocalStorage {
    async fn read_settings(&self) -> Result<Settings, String> {
        get(KEY_SETTINGS)
            .map(Option::unwrap_or_default)
            .map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        gloo_storage::LocalStorage::set(KEY_SETTINGS, settings).map_err(|err| err.to_string())
    }
}

pub struct Log;

const KEY_LOG: &str = "log";

impl log::Repository for Log {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        get(KEY_LOG)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::push_entry(&mut entries, entry);
        gloo_storage::LocalStorage::set(KEY_LOG, entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
