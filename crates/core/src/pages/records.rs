use std::{fmt, sync::Arc};

use parking_lot::RwLock;

/// Shared, cheaply clonable list of records shown by a page.
///
/// The lock is only taken for the duration of each call.
pub struct Records<T> {
    inner: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for Records<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Records<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Records<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.read().iter()).finish()
    }
}

impl<T: Clone> Records<T> {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.read().clone()
    }

    /// Replace the whole list.
    pub fn replace(&self, records: Vec<T>) {
        *self.inner.write() = records;
    }

    /// Append one record.
    pub fn push(&self, record: T) {
        self.inner.write().push(record);
    }

    /// First record matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.inner.read().iter().find(|record| predicate(record)).cloned()
    }

    /// Apply `change` to the first record matching `predicate`.
    pub fn update(&self, predicate: impl Fn(&T) -> bool, change: impl FnOnce(&mut T)) -> bool {
        let mut records = self.inner.write();
        match records.iter_mut().find(|record| predicate(record)) {
            Some(record) => {
                change(record);
                true
            }
            None => false,
        }
    }

    /// Drop every record matching `predicate`, returning how many went.
    pub fn remove(&self, predicate: impl Fn(&T) -> bool) -> usize {
        let mut records = self.inner.write();
        let before = records.len();
        records.retain(|record| !predicate(record));
        before - records.len()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
