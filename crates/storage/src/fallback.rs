use log::{info, warn};
use minigym_domain as domain;

use crate::{Collection, Document, DocumentStore, MigrationLog};

const COLLECTIONS: [Collection; 2] = [Collection::Workouts, Collection::Sessions];

/// Remote document store backed by a local one.
///
/// Reads and writes go to the remote store if one is configured and fall back
/// to the local store if the remote store fails.
pub struct Fallback<R, L> {
    remote: Option<R>,
    local: L,
}

impl<R, L> Fallback<R, L> {
    pub fn new(remote: Option<R>, local: L) -> Self {
        Self { remote, local }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote(&self) -> Option<&R> {
        self.remote.as_ref()
    }

    pub fn local(&self) -> &L {
        &self.local
    }
}

impl<R, L> Fallback<R, L>
where
    R: DocumentStore,
    L: DocumentStore + MigrationLog,
{
    /// Copy the local collections to the remote store, once.
    ///
    /// A collection is copied if it is not empty and the remote store either
    /// lacks the collection or holds an older version of it. A local
    /// collection without timestamp is older than any existing remote one.
    /// Returns the copied collections.
    ///
    /// The migration is only marked as completed if all collections were
    /// handled, so a failed migration is retried on the next call.
    pub async fn migrate(&self) -> Result<Vec<Collection>, domain::StorageError> {
        let Some(remote) = &self.remote else {
            return Err(domain::StorageError::NotConfigured);
        };

        if self.local.migrated() {
            return Ok(vec![]);
        }

        let mut migrated = vec![];

        for collection in COLLECTIONS {
            let Some(local) = self.local.read(collection).await? else {
                continue;
            };
            if local.records.is_empty() {
                continue;
            }
            let remote_document = remote.read(collection).await?;
            if !supersedes(&local, remote_document.as_ref()) {
                info!(
                    "remote {} are newer than local ones, skipping migration",
                    collection.as_ref()
                );
                continue;
            }
            remote.write(collection, &local).await?;
            info!(
                "migrated {} {} to remote store",
                local.records.len(),
                collection.as_ref()
            );
            migrated.push(collection);
        }

        self.local.set_migrated()?;

        Ok(migrated)
    }
}

fn supersedes(local: &Document, remote: Option<&Document>) -> bool {
    let Some(remote) = remote else {
        return true;
    };
    match (local.updated_at, remote.updated_at) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(local), Some(remote)) => local > remote,
    }
}

impl<R, L> DocumentStore for Fallback<R, L>
where
    R: DocumentStore,
    L: DocumentStore,
{
    async fn read(&self, collection: Collection) -> Result<Option<Document>, domain::StorageError> {
        if let Some(remote) = &self.remote {
            match remote.read(collection).await {
                Ok(document) => return Ok(document),
                Err(err) => warn!(
                    "failed to read {} from remote store, using local storage: {err}",
                    collection.as_ref()
                ),
            }
        }
        self.local.read(collection).await
    }

    async fn write(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), domain::StorageError> {
        if let Some(remote) = &self.remote {
            match remote.write(collection, document).await {
                Ok(()) => return Ok(()),
                Err(err) => warn!(
                    "failed to write {} to remote store, using local storage: {err}",
                    collection.as_ref()
                ),
            }
        }
        self.local.write(collection, document).await
    }
}
