use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use minigym_domain as domain;

use crate::{Collection, Document, DocumentStore, MigrationLog};

/// In-process document store.
///
/// Clones share their content. An unavailable store fails every operation
/// with [`domain::StorageError::NoConnection`].
#[derive(Debug, Clone)]
pub struct Memory {
    documents: Rc<RefCell<BTreeMap<Collection, Document>>>,
    migrated: Rc<Cell<bool>>,
    available: Rc<Cell<bool>>,
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Rc::default(),
            migrated: Rc::default(),
            available: Rc::new(Cell::new(true)),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    fn check_available(&self) -> Result<(), domain::StorageError> {
        if self.available.get() {
            Ok(())
        } else {
            Err(domain::StorageError::NoConnection)
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for Memory {
    async fn read(&self, collection: Collection) -> Result<Option<Document>, domain::StorageError> {
        self.check_available()?;
        Ok(self.documents.borrow().get(&collection).cloned())
    }

    async fn write(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), domain::StorageError> {
        self.check_available()?;
        self.documents
            .borrow_mut()
            .insert(collection, document.clone());
        Ok(())
    }
}

impl MigrationLog for Memory {
    fn migrated(&self) -> bool {
        self.migrated.get()
    }

    fn set_migrated(&self) -> Result<(), domain::StorageError> {
        self.check_available()?;
        self.migrated.set(true);
        Ok(())
    }
}
