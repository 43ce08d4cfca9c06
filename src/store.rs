// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;
use rusqlite::Connection;
use rusqlite::Transaction;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Fallible;

/// The persistence contract: an asynchronous string-keyed store of JSON
/// documents. Keys are versioned by the writing code.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Fallible<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Fallible<()>;
    async fn remove(&self, key: &str) -> Fallible<()>;
}

/// Typed access over a `KeyValueStore`.
#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn KeyValueStore>,
}

impl Store {
    pub fn new(inner: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Read and deserialize a record. A read failure or a malformed record
    /// yields the default: stored state is recoverable, never fatal.
    pub async fn read_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let raw = match self.inner.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Read of {key} failed, substituting the default record: {e}");
                return T::default();
            }
        };
        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Malformed record under {key}, substituting the default: {e}");
                    T::default()
                }
            },
            None => T::default(),
        }
    }

    /// Serialize and write a record. Write failures propagate to the
    /// caller; the record is never silently dropped.
    pub async fn write<T: Serialize>(&self, key: &str, value: &T) -> Fallible<()> {
        let raw = serde_json::to_string(value)?;
        self.inner.set(key, raw).await
    }
}

/// SQLite-backed store: a single table of key/JSON pairs.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Fallible<Option<String>> {
        let conn = self.acquire();
        let mut stmt = conn.prepare("select value from kv where key = ?;")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: String) -> Fallible<()> {
        let conn = self.acquire();
        let sql = "insert into kv (key, value) values (?, ?) on conflict (key) do update set value = excluded.value;";
        conn.execute(sql, (key, &value))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Fallible<()> {
        let conn = self.acquire();
        conn.execute("delete from kv where key = ?;", [key])?;
        Ok(())
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["kv"], |row| row.get(0))?;
    Ok(count > 0)
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Fallible<Option<String>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Fallible<()> {
        self.map.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Fallible<()> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::error::fail;

    #[tokio::test]
    async fn test_memory_store_set_get_remove() {
        let store = MemoryStore::default();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.sqlite3");
        let store = SqliteStore::new(path.to_str().unwrap()).unwrap();
        store.set("k", "{\"a\":1}".to_string()).await.unwrap();
        store.set("k", "{\"a\":2}".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("{\"a\":2}".to_string()));

        // Reopening the same file finds the existing schema and data.
        drop(store);
        let store = SqliteStore::new(path.to_str().unwrap()).unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("{\"a\":2}".to_string()));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_record_reads_as_default() {
        let inner = MemoryStore::default();
        inner.set("doc", "{not json".to_string()).await.unwrap();
        let store = Store::new(inner);
        let value: BTreeMap<String, u32> = store.read_or_default("doc").await;
        assert!(value.is_empty());
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Fallible<Option<String>> {
            fail("store is broken")
        }

        async fn set(&self, _key: &str, _value: String) -> Fallible<()> {
            fail("store is broken")
        }

        async fn remove(&self, _key: &str) -> Fallible<()> {
            fail("store is broken")
        }
    }

    #[tokio::test]
    async fn test_read_failure_reads_as_default() {
        let store = Store::new(BrokenStore);
        let value: BTreeMap<String, u32> = store.read_or_default("doc").await;
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let store = Store::new(BrokenStore);
        let result = store.write("doc", &1).await;
        assert!(result.is_err());
    }
}
