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

use chrono::{DateTime, SecondsFormat, Utc};
use cloneable_errors::{bail, ResContext};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::BACKUP_PREFIX,
    settings::StoreMap,
    store::{Result, SettingsStore},
};

/// A snapshot of the whole settings store
///
/// `data` is carried verbatim, keys this version doesn't know about included.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BackupEnvelope {
    pub timestamp: String,
    pub data: StoreMap,
}

pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("{BACKUP_PREFIX}_{}.json", now.format("%Y-%m-%d"))
}

impl BackupEnvelope {
    pub fn capture<S: SettingsStore + ?Sized>(store: &S) -> Result<BackupEnvelope> {
        let data = store.get_all().context("Failed to read the settings store")?;
        Ok(BackupEnvelope {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            data,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize the backup")
    }

    /// Parses a backup file, requiring `data` to be an object
    pub fn parse(text: &str) -> Result<BackupEnvelope> {
        let value: Value = serde_json::from_str(text).context("Error reading the backup file")?;
        let Some(Value::Object(data)) = value.get("data") else {
            bail!("Invalid backup file format");
        };
        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Ok(BackupEnvelope { timestamp, data: data.clone() })
    }

    /// Writes every key of the backup into `store`, returning the changed keys
    ///
    /// Keys present in the store but absent from the backup are left alone.
    pub fn restore<S: SettingsStore + ?Sized>(self, store: &mut S) -> Result<Vec<String>> {
        let count = self.data.len();
        let changed = store.set(self.data).context("Failed to import the backup")?;
        info!("Imported {count} keys from a backup taken at {} ({} changed)", self.timestamp, changed.len());
        Ok(changed)
    }
}
