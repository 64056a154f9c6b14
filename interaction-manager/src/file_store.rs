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
use std::{fs::{self, File}, io::{self, Read, Write}, path::{Path, PathBuf}};

use cloneable_errors::{bail, ResContext};
use interaction_engine::{settings::StoreMap, store::{merge_changes, Result}, SettingsStore};
use log::{debug, info};
use serde_json::Value;

/// A settings store persisted as a single JSON object on disk
///
/// The whole object is rewritten on every change that actually modifies something.
pub struct JsonFileStore {
    path: PathBuf,
    data: StoreMap,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting out empty if the file doesn't exist yet
    pub fn open(path: &Path) -> Result<JsonFileStore> {
        let data = match File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents).with_context(|| format!("Failed to read {}", path.display()))?;
                if contents.trim().is_empty() {
                    StoreMap::new()
                } else {
                    let value: Value = serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))?;
                    let Value::Object(map) = value else {
                        bail!("{} does not contain a JSON object", path.display());
                    };
                    map
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("{} does not exist yet, starting with an empty store", path.display());
                StoreMap::new()
            },
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", path.display()));
            },
        };
        Ok(JsonFileStore { path: path.to_owned(), data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(&self.data).context("Failed to serialize the settings store")?;
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp_path).with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            write!(file, "{serialized}").with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        }
        fs::rename(&tmp_path, &self.path).with_context(|| format!("Failed to replace {}", self.path.display()))?;
        debug!("Saved {} keys to {}", self.data.len(), self.path.display());
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
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
        let changed = merge_changes(&mut self.data, items);
        if !changed.is_empty() {
            self.persist()?;
        }
        Ok(changed)
    }

    fn clear(&mut self) -> Result<()> {
        self.data.clear();
        self.persist()
    }
}
