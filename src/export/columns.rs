//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Column identity and position tracking for a single export.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named output column at a fixed position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZiColumn {
    /// Flattened column name, e.g. `address_city`.
    pub name: String,
    /// Zero-based output position.
    pub position: usize,
}

/// Insertion-ordered set of columns discovered during the stream.
///
/// Positions are assigned on first sight and never change.
#[derive(Clone, Debug, Default)]
pub struct ZiColumnRegistry {
    columns: Vec<ZiColumn>,
    index: HashMap<String, usize>,
}

impl ZiColumnRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the column's position, appending it if unseen.
    pub fn observe(&mut self, name: &str) -> usize {
        if let Some(&position) = self.index.get(name) {
            return position;
        }
        let position = self.columns.len();
        self.columns.push(ZiColumn {
            name: name.to_string(),
            position,
        });
        self.index.insert(name.to_string(), position);
        position
    }

    /// Position of a known column, without registering it.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// True once `name` has been observed.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Borrowed view of the columns in position order.
    pub fn columns(&self) -> &[ZiColumn] {
        &self.columns
    }

    /// Columns known at this point in the stream.
    pub fn snapshot(&self) -> Vec<ZiColumn> {
        self.columns.clone()
    }

    /// Number of distinct columns seen so far.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
