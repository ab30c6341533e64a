//! Read cache keyed by operation name and parameters.
//!
//! Identical reads that overlap share one in-flight future; a settled read is
//! served from memory until its operation is invalidated.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ApiError;

pub type Loaded = Result<Value, ApiError>;

type SharedLoad = Shared<LocalBoxFuture<'static, Loaded>>;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryKey {
    operation: String,
    params: Value,
}

impl QueryKey {
    pub fn new<P: Serialize>(operation: &str, params: &P) -> Result<Self, ApiError> {
        let params = serde_json::to_value(params).map_err(ApiError::decode)?;
        Ok(Self {
            operation: operation.to_string(),
            params,
        })
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    /// serde_json objects serialize with sorted keys, so equal parameter
    /// objects always produce the same key.
    fn slot_key(&self) -> String {
        format!("{}:{}", self.operation, self.params)
    }
}

enum Slot {
    Ready(Value),
    Loading(SharedLoad),
}

struct Entry {
    key: QueryKey,
    generation: u64,
    slot: Slot,
}

#[derive(Default)]
pub struct QueryCache {
    entries: RefCell<HashMap<String, Entry>>,
    generation: Cell<u64>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, joins a matching in-flight read, or
    /// starts `load`. Failed reads are not cached.
    pub async fn fetch<F>(&self, key: &QueryKey, load: F) -> Loaded
    where
        F: FnOnce() -> LocalBoxFuture<'static, Loaded>,
    {
        let slot_key = key.slot_key();
        let (pending, generation) = {
            let mut entries = self.entries.borrow_mut();
            match entries.get(&slot_key) {
                Some(Entry {
                    slot: Slot::Ready(value),
                    ..
                }) => {
                    trace!(operation = key.operation(), "cache hit");
                    return Ok(value.clone());
                }
                Some(Entry {
                    slot: Slot::Loading(pending),
                    generation,
                    ..
                }) => {
                    debug!(operation = key.operation(), "joining in-flight read");
                    (pending.clone(), *generation)
                }
                None => {
                    let generation = self.generation.get() + 1;
                    self.generation.set(generation);
                    let pending = load().shared();
                    entries.insert(
                        slot_key.clone(),
                        Entry {
                            key: key.clone(),
                            generation,
                            slot: Slot::Loading(pending.clone()),
                        },
                    );
                    (pending, generation)
                }
            }
        };

        let result = pending.await;

        let mut entries = self.entries.borrow_mut();
        let current = entries
            .get(&slot_key)
            .is_some_and(|entry| entry.generation == generation);
        if current {
            match &result {
                Ok(value) => {
                    if let Some(entry) = entries.get_mut(&slot_key) {
                        entry.slot = Slot::Ready(value.clone());
                    }
                }
                Err(_) => {
                    entries.remove(&slot_key);
                }
            }
        } else {
            debug!(operation = key.operation(), "read was invalidated while in flight; not caching");
        }
        result
    }

    /// Drops every entry of `operation`, or only the one whose parameters
    /// equal `params`. In-flight reads that get dropped still resolve for
    /// their callers but are not written back.
    pub fn invalidate(&self, operation: &str, params: Option<&Value>) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, entry| {
            let matches = entry.key.operation == operation
                && params.is_none_or(|params| &entry.key.params == params);
            !matches
        });
        let removed = before - entries.len();
        debug!(operation, removed, "invalidated cached reads");
        removed
    }

    #[cfg(test)]
    pub(crate) fn peek(&self, key: &QueryKey) -> Option<Value> {
        match self.entries.borrow().get(&key.slot_key()) {
            Some(Entry {
                slot: Slot::Ready(value),
                ..
            }) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
