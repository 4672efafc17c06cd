use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Mutex, PoisonError,
    },
};

use chrono::{DateTime, Utc};
use log::debug;
use serde_json::{Map, Value};

use crate::post::{Post, Vote};

use super::{Direction, Query, Record, RemoteStore, StoreError};

type Collections = HashMap<&'static str, Vec<Map<String, Value>>>;

/// In-process `RemoteStore`
///
/// Vote writes keep the referenced post's `upvotes`/`downvotes` in step, the way the
/// hosted backend maintains those aggregates. `set_reachable(false)` makes every call
/// fail with [`StoreError::Unreachable`].
#[derive(Debug)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    reachable: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            reachable: AtomicBool::new(true),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, AtomicOrdering::SeqCst);
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable.load(AtomicOrdering::SeqCst)
    }

    /// Number of records in `T`'s collection
    pub fn count<T: Record>(&self) -> usize {
        self.lock().get(T::COLLECTION).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collections> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_reachable(&self) -> Result<(), StoreError> {
        if self.is_reachable() {
            Ok(())
        } else {
            Err(StoreError::Unreachable)
        }
    }
}

impl RemoteStore for MemoryStore {
    async fn list<T: Record>(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        self.ensure_reachable()?;
        let mut rows: Vec<Map<String, Value>> = {
            let collections = self.lock();
            collections
                .get(T::COLLECTION)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| {
                            query
                                .filter
                                .iter()
                                .all(|(field, value)| row.get(field) == Some(value))
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        if let Some(order) = &query.order_by {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.field), b.get(&order.field));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        rows.into_iter()
            .map(|row| serde_json::from_value(Value::Object(row)).map_err(StoreError::from))
            .collect()
    }

    async fn create<T: Record>(&self, record: &T) -> Result<T, StoreError> {
        self.ensure_reachable()?;
        let row = match serde_json::to_value(record)? {
            Value::Object(row) => row,
            _ => return Err(StoreError::Json(serde::ser::Error::custom("record is not an object"))),
        };

        let mut collections = self.lock();
        if T::COLLECTION == Vote::COLLECTION {
            if let (Some(post_id), Some(counter)) = (str_field(&row, "postId"), counter_of(&row)) {
                adjust_counter(&mut collections, &post_id, counter, 1);
            }
        }
        debug!("created {}/{}", T::COLLECTION, record.id());
        collections.entry(T::COLLECTION).or_default().push(row);

        Ok(record.clone())
    }

    async fn update<T: Record>(&self, id: &str, patch: Value) -> Result<(), StoreError> {
        self.ensure_reachable()?;
        let mut collections = self.lock();
        let row = find_mut(&mut collections, T::COLLECTION, id)
            .ok_or_else(|| not_found(T::COLLECTION, id))?;

        let before = counter_of(row);
        if let Value::Object(patch) = patch {
            row.extend(patch);
        }
        let after = counter_of(row);
        let post_id = str_field(row, "postId");

        if T::COLLECTION == Vote::COLLECTION && before != after {
            if let Some(post_id) = post_id {
                if let Some(counter) = before {
                    adjust_counter(&mut collections, &post_id, counter, -1);
                }
                if let Some(counter) = after {
                    adjust_counter(&mut collections, &post_id, counter, 1);
                }
            }
        }
        Ok(())
    }

    async fn delete<T: Record>(&self, id: &str) -> Result<(), StoreError> {
        self.ensure_reachable()?;
        let mut collections = self.lock();
        let rows = collections
            .get_mut(T::COLLECTION)
            .ok_or_else(|| not_found(T::COLLECTION, id))?;
        let index = rows
            .iter()
            .position(|row| row.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| not_found(T::COLLECTION, id))?;
        let row = rows.remove(index);

        if T::COLLECTION == Vote::COLLECTION {
            if let (Some(post_id), Some(counter)) = (str_field(&row, "postId"), counter_of(&row)) {
                adjust_counter(&mut collections, &post_id, counter, -1);
            }
        }
        Ok(())
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

fn find_mut<'a>(
    collections: &'a mut Collections,
    collection: &str,
    id: &str,
) -> Option<&'a mut Map<String, Value>> {
    collections
        .get_mut(collection)?
        .iter_mut()
        .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
}

fn str_field(row: &Map<String, Value>, field: &str) -> Option<String> {
    row.get(field).and_then(Value::as_str).map(str::to_string)
}

/// The post counter a vote row contributes to
fn counter_of(row: &Map<String, Value>) -> Option<&'static str> {
    match row.get("voteType").and_then(Value::as_str)? {
        "upvote" => Some("upvotes"),
        "downvote" => Some("downvotes"),
        _ => None,
    }
}

fn adjust_counter(collections: &mut Collections, post_id: &str, counter: &str, delta: i64) {
    let Some(post) = find_mut(collections, Post::COLLECTION, post_id) else {
        return;
    };
    let current = post.get(counter).and_then(Value::as_i64).unwrap_or_default();
    post.insert(counter.to_string(), Value::from((current + delta).max(0)));
}

/// Numbers numerically, RFC 3339 timestamps chronologically, other strings lexically
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let (a, b) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (a.parse::<DateTime<Utc>>(), b.parse::<DateTime<Utc>>()) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
