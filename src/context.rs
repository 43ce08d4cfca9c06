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

use std::env::current_dir;
use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::pins::PinRegistry;
use crate::progress::ProgressStore;
use crate::store::SqliteStore;
use crate::store::Store;

/// An opened data directory: the deck catalog and the persisted stores.
/// Every surface (CLI commands, the API server) starts from one of these.
pub struct Context {
    pub catalog: Catalog,
    pub progress: ProgressStore,
    pub pins: PinRegistry,
}

impl Context {
    /// Open the data directory: `progress.sqlite3` for state, `decks/` for
    /// the catalog. Defaults to the current directory.
    pub fn open(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let db_path: PathBuf = directory.join("progress.sqlite3");
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let store = Store::new(SqliteStore::new(db_path)?);

        let catalog = Catalog::load(&directory.join("decks"))?;
        log::debug!("Catalog loaded: {} decks.", catalog.decks().len());

        Ok(Self {
            catalog,
            progress: ProgressStore::new(store.clone()),
            pins: PinRegistry::new(store),
        })
    }

    /// The language an operation targets: the explicit argument if given,
    /// otherwise the configured language. An empty configured language
    /// (possible in a hand-edited record) resolves to the default deck.
    pub async fn resolve_language(&self, language: Option<String>) -> String {
        match language {
            Some(language) => language,
            None => {
                let settings = self.progress.settings().await;
                if settings.language_id.is_empty() {
                    self.catalog.default_deck_id().to_string()
                } else {
                    settings.language_id
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_on_non_existent_directory() {
        let result = Context::open(Some("./derpherp".to_string()));
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
    }

    #[tokio::test]
    async fn test_open_on_empty_directory_uses_the_starter_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let context = Context::open(Some(dir.path().display().to_string())).unwrap();
        assert_eq!(context.catalog.default_deck_id(), "es");
        assert_eq!(context.resolve_language(None).await, "es");
        assert_eq!(context.resolve_language(Some("fr".to_string())).await, "fr");
    }
}
