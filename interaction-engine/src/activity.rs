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

use std::sync::Arc;

use chrono::Local;
use cloneable_errors::ResContext;
use log::warn;
use serde_json::Value;

use crate::{
    constants::{LOG_TIME_FORMAT, MAX_LOG_ENTRIES},
    settings::{keys, StoreMap},
    store::{self, SettingsStore},
    types::{Action, ActivityLogEntry},
};

impl ActivityLogEntry {
    /// Builds an entry stamped with the current local time
    ///
    /// The title falls back to the channel name, then to a generic placeholder.
    pub fn new(
        action: Action,
        title: Option<Arc<str>>,
        channel: Arc<str>,
        video_id: Arc<str>,
        reason: &str,
    ) -> ActivityLogEntry {
        let title = match title {
            Some(title) if !title.is_empty() => title,
            _ if !channel.is_empty() => channel.clone(),
            _ => "Video".into(),
        };
        ActivityLogEntry {
            time: Local::now().format(LOG_TIME_FORMAT).to_string().into(),
            action: action.into(),
            title,
            channel,
            video_id,
            reason: reason.into(),
        }
    }
}

/// Prepends `entry` to `logs`, dropping the oldest entries beyond the cap
pub fn push_capped<T>(logs: &mut Vec<T>, entry: T) {
    logs.insert(0, entry);
    logs.truncate(MAX_LOG_ENTRIES);
}

/// Appends an entry to the persisted log, returning the changed keys
///
/// Existing entries are carried over as stored, including ones this version can't parse.
pub fn record<S: SettingsStore + ?Sized>(store: &mut S, entry: ActivityLogEntry) -> store::Result<Vec<String>> {
    let stored = store
        .get(&[keys::ACTIVITY_LOGS])
        .context("Failed to read the activity log")?;
    let mut logs = match stored.get(keys::ACTIVITY_LOGS) {
        Some(Value::Array(entries)) => entries.clone(),
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            warn!("Replacing an activity log that isn't a list: {other}");
            Vec::new()
        },
    };
    let entry = serde_json::to_value(&entry).context("Failed to serialize the activity log entry")?;
    push_capped(&mut logs, entry);

    let mut update = StoreMap::new();
    update.insert(keys::ACTIVITY_LOGS.to_owned(), Value::Array(logs));
    store.set(update).context("Failed to write the activity log")
}
