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

use std::path::Path;
use std::path::PathBuf;

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::Fallible;

/// The deck compiled into the binary, used when the deck directory has
/// nothing to offer.
const STARTER_DECK: &str = include_str!("starter.toml");

/// Everything except the URL-unreserved characters gets escaped in image
/// queries.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A single vocabulary card. Catalog cards are immutable; review state
/// lives in the progress record, keyed by card id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub term: String,
    pub translation: String,
    /// Search keywords, expanded into an image URL for display surfaces.
    pub image: String,
}

impl Card {
    pub fn image_url(&self) -> String {
        image_url(&self.image)
    }
}

/// A language deck: an ordered, read-only list of cards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LanguageDeck {
    pub id: String,
    pub name: String,
    pub from: String,
    pub to: String,
    pub level: String,
    pub cards: Vec<Card>,
}

/// The read-only catalog of language decks. Never empty: a catalog with no
/// operator decks holds the starter deck.
pub struct Catalog {
    decks: Vec<LanguageDeck>,
}

impl Catalog {
    /// Load all `*.toml` decks under the given directory. Files are visited
    /// in path order so deck order is deterministic across runs.
    pub fn load(directory: &Path) -> Fallible<Self> {
        if !directory.exists() {
            log::debug!("No deck directory at {directory:?}, using the starter catalog.");
            return Self::builtin();
        }
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path.to_path_buf());
            }
        }
        let mut decks = Vec::new();
        for path in paths {
            let contents = std::fs::read_to_string(&path)?;
            let deck: LanguageDeck = toml::from_str(&contents)?;
            log::debug!("Loaded deck {} ({} cards).", deck.id, deck.cards.len());
            decks.push(deck);
        }
        if decks.is_empty() {
            return Self::builtin();
        }
        Ok(Self { decks })
    }

    /// The catalog shipped with the binary: just the starter deck.
    pub fn builtin() -> Fallible<Self> {
        let deck: LanguageDeck = toml::from_str(STARTER_DECK)?;
        Ok(Self { decks: vec![deck] })
    }

    pub fn decks(&self) -> &[LanguageDeck] {
        &self.decks
    }

    /// Look up a deck. Unknown ids fall back to the default deck rather
    /// than failing.
    pub fn deck_by_id(&self, id: &str) -> &LanguageDeck {
        self.decks
            .iter()
            .find(|deck| deck.id == id)
            .unwrap_or(&self.decks[0])
    }

    pub fn default_deck_id(&self) -> &str {
        &self.decks[0].id
    }
}

/// Expand image search keywords into a stable image-service URL.
pub fn image_url(keywords: &str) -> String {
    let encoded = utf8_percent_encode(keywords, QUERY_ENCODE_SET);
    format!("https://source.unsplash.com/400x300/?{encoded}")
}
