/* This file is part of the YouTube Interaction Manager project
*
*  Copyright (C) 2025 YouTube Interaction Manager contributors
*
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use cloneable_errors::ErrorContext;

use crate::settings::{StoreMap, StoredSettings, STORAGE_KEYS};

pub type Result<T> = std::result::Result<T, ErrorContext>;

/// The synchronized key-value store holding every setting, both lists and the activity log
///
/// Writes report which keys actually changed, so callers can forward them to
/// [`crate::controller::Controller::apply_storage_change`] the same way a change notification
/// would be delivered to every open context.
pub trait SettingsStore {
    /// Returns the stored values for `keys`. Missing keys are simply absent from the result.
    fn get(&self, keys: &[&str]) -> Result<StoreMap>;

    fn get_all(&self) -> Result<StoreMap>;

    /// Merges `items` into the store, returning the keys whose value changed
    fn set(&mut self, items: StoreMap) -> Result<Vec<String>>;

    fn clear(&mut self) -> Result<()>;

    fn read_settings(&self) -> Result<StoredSettings> {
        Ok(StoredSettings::from_map(&self.get(STORAGE_KEYS)?))
    }
}

/// Merges `items` into `data`, returning the keys that changed
pub fn merge_changes(data: &mut StoreMap, items: StoreMap) -> Vec<String> {
    let mut changed = Vec::new();
    for (key, value) in items {
        if data.get(&key) != Some(&value) {
            changed.push(key.clone());
            data.insert(key, value);
        }
    }
    changed
}

/// A store that only lives in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: StoreMap,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoreMap) -> Self {
        Self { data }
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<StoreMap> {
        Ok(keys
            .iter()
            .filter_map(|&key| self.data.get(key).map(|value| (key.to_owned(), value.clone())))
            .collect())
    }

    fn get_all(&self) -> Result<StoreMap> {
        Ok(self.data.clone())
    }

    fn set(&mut self, items: StoreMap) -> Result<Vec<String>> {
        Ok(merge_changes(&mut self.data, items))
    }

    fn clear(&mut self) -> Result<()> {
        self.data.clear();
        Ok(())
    }
}
