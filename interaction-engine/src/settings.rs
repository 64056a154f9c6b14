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

//! Typed view over the raw key-value settings store
//!
//! Every stored value is optional and may have been written by an older version of the
//! extension. Reading never fails: malformed values are logged and treated as unset, then the
//! usual fallback chain applies.

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::types::*;

pub type StoreMap = Map<String, Value>;

pub mod keys {
    pub const ENABLE_EXTENSION: &str = "enableExtension";
    pub const ENABLE_LIKE: &str = "enableLike";
    pub const ENABLE_DISLIKE: &str = "enableDislike";
    pub const TRIGGER_TYPE: &str = "triggerType";
    pub const TRIGGER_SECONDS: &str = "triggerSeconds";
    pub const TRIGGER_PERCENT: &str = "triggerPercent";
    pub const ENABLE_HUMANIZE: &str = "enableHumanize";
    pub const WHITELIST: &str = "whitelist";
    pub const BLACKLIST: &str = "blacklist";
    pub const ACTION_WHITELIST: &str = "actionWhitelist";
    pub const ACTION_BLACKLIST: &str = "actionBlacklist";
    pub const ACTION_UNLISTED: &str = "actionUnlisted";
    pub const SHOW_NEUTRAL_BADGE: &str = "showNeutralBadge";
    pub const ENABLE_DEBUG: &str = "enableDebug";
    pub const ENABLE_HISTORY: &str = "enableHistory";
    pub const ACTIVITY_LOGS: &str = "activityLogs";
}

/// Every key the extension persists
pub const STORAGE_KEYS: &[&str] = &[
    keys::ENABLE_EXTENSION,
    keys::ENABLE_LIKE,
    keys::ENABLE_DISLIKE,
    keys::TRIGGER_TYPE,
    keys::TRIGGER_SECONDS,
    keys::TRIGGER_PERCENT,
    keys::ENABLE_HUMANIZE,
    keys::WHITELIST,
    keys::BLACKLIST,
    keys::ACTION_WHITELIST,
    keys::ACTION_BLACKLIST,
    keys::ACTION_UNLISTED,
    keys::SHOW_NEUTRAL_BADGE,
    keys::ENABLE_DEBUG,
    keys::ENABLE_HISTORY,
    keys::ACTIVITY_LOGS,
];

/// Keys whose change must make the next tick re-evaluate the current video
pub const RELEVANT_KEYS: &[&str] = &[
    keys::TRIGGER_TYPE,
    keys::TRIGGER_SECONDS,
    keys::TRIGGER_PERCENT,
    keys::ENABLE_HUMANIZE,
    keys::WHITELIST,
    keys::BLACKLIST,
    keys::ENABLE_EXTENSION,
    keys::ACTION_WHITELIST,
    keys::ACTION_BLACKLIST,
    keys::ACTION_UNLISTED,
];

pub fn is_relevant_change<S: AsRef<str>>(changed: &[S]) -> bool {
    changed.iter().any(|key| RELEVANT_KEYS.contains(&key.as_ref()))
}

/// `primary ?? legacy ?? default`
#[inline]
pub fn fallback<T>(primary: Option<T>, legacy: Option<T>, default: T) -> T {
    primary.or(legacy).unwrap_or(default)
}

/// Raw persisted settings, exactly as found in the store
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoredSettings {
    pub enable_extension: Option<bool>,
    pub enable_like: Option<bool>,
    pub enable_dislike: Option<bool>,
    pub trigger_type: Option<String>,
    pub trigger_seconds: Option<f64>,
    pub trigger_percent: Option<f64>,
    pub enable_humanize: Option<bool>,
    pub whitelist: Option<Vec<ChannelListEntry>>,
    pub blacklist: Option<Vec<ChannelListEntry>>,
    pub action_whitelist: Option<bool>,
    pub action_blacklist: Option<bool>,
    pub action_unlisted: Option<String>,
    pub show_neutral_badge: Option<bool>,
    pub enable_debug: Option<bool>,
    pub enable_history: Option<bool>,
    pub activity_logs: Option<Vec<ActivityLogEntry>>,
}

fn read<T: DeserializeOwned>(map: &StoreMap, key: &str) -> Option<T> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!("Ignoring malformed stored value for {key}: {err}");
                None
            }
        },
    }
}

/// Reads an array entry by entry, so one malformed element doesn't take the rest with it
fn read_list<T: DeserializeOwned>(map: &StoreMap, key: &str) -> Option<Vec<T>> {
    let entries: Vec<Value> = read(map, key)?;
    Some(
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(v) => Some(v),
                Err(err) => {
                    warn!("Skipping malformed entry in {key}: {err}");
                    None
                }
            })
            .collect(),
    )
}

/// Loose truthiness for flags older versions may have stored as something other than a bool
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0. && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn read_flag(map: &StoreMap, key: &str) -> Option<bool> {
    map.get(key).filter(|v| !v.is_null()).map(truthy)
}

/// A falsy type means unset. Any other non-string value is kept in its JSON form, which never
/// names a known trigger type.
fn read_trigger_type(map: &StoreMap) -> Option<String> {
    match map.get(keys::TRIGGER_TYPE)? {
        Value::String(s) => Some(s.clone()),
        other if truthy(other) => {
            warn!("Stored {} is not a string: {other}", keys::TRIGGER_TYPE);
            Some(other.to_string())
        },
        _ => None,
    }
}

impl StoredSettings {
    pub fn from_map(map: &StoreMap) -> StoredSettings {
        StoredSettings {
            enable_extension:   read(map, keys::ENABLE_EXTENSION),
            enable_like:        read(map, keys::ENABLE_LIKE),
            enable_dislike:     read(map, keys::ENABLE_DISLIKE),
            trigger_type:       read_trigger_type(map),
            trigger_seconds:    read(map, keys::TRIGGER_SECONDS),
            trigger_percent:    read(map, keys::TRIGGER_PERCENT),
            enable_humanize:    read_flag(map, keys::ENABLE_HUMANIZE),
            whitelist:          read_list(map, keys::WHITELIST),
            blacklist:          read_list(map, keys::BLACKLIST),
            action_whitelist:   read(map, keys::ACTION_WHITELIST),
            action_blacklist:   read(map, keys::ACTION_BLACKLIST),
            action_unlisted:    read(map, keys::ACTION_UNLISTED),
            show_neutral_badge: read(map, keys::SHOW_NEUTRAL_BADGE),
            enable_debug:       read(map, keys::ENABLE_DEBUG),
            enable_history:     read(map, keys::ENABLE_HISTORY),
            activity_logs:      read_list(map, keys::ACTIVITY_LOGS),
        }
    }

    pub fn action_settings(&self) -> ActionSettings {
        let defaults = ActionSettings::default();
        let legacy_unlisted = match self.enable_dislike {
            Some(true) => Some(UnlistedAction::Dislike),
            _ => None,
        };
        ActionSettings {
            do_like_whitelist: fallback(self.action_whitelist, self.enable_like, defaults.do_like_whitelist),
            do_dislike_blacklist: fallback(self.action_blacklist, None, defaults.do_dislike_blacklist),
            unlisted_action: fallback(
                self.action_unlisted.as_deref().map(UnlistedAction::from_stored),
                legacy_unlisted,
                defaults.unlisted_action,
            ),
        }
    }

    pub fn trigger_settings(&self) -> TriggerSettings {
        let defaults = TriggerSettings::default();
        // a stored zero counts as unset, same as a missing value
        let nonzero = |v: &f64| *v != 0.;
        TriggerSettings {
            trigger_type: self
                .trigger_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .map_or(defaults.trigger_type, TriggerType::from_stored),
            seconds: self.trigger_seconds.filter(nonzero).unwrap_or(defaults.seconds),
            percent: self
                .trigger_percent
                .filter(nonzero)
                .unwrap_or(defaults.percent)
                .clamp(0., 100.),
            humanize_enabled: self.enable_humanize.unwrap_or(defaults.humanize_enabled),
        }
    }

    pub fn general_settings(&self) -> GeneralSettings {
        let defaults = GeneralSettings::default();
        GeneralSettings {
            enable_extension: self.enable_extension.unwrap_or(defaults.enable_extension),
            enable_debug: self.enable_debug.unwrap_or(defaults.enable_debug),
            enable_history: self.enable_history.unwrap_or(defaults.enable_history),
            show_neutral_badge: self.show_neutral_badge.unwrap_or(defaults.show_neutral_badge),
        }
    }

    pub fn whitelist(&self) -> &[ChannelListEntry] {
        self.whitelist.as_deref().unwrap_or_default()
    }

    pub fn blacklist(&self) -> &[ChannelListEntry] {
        self.blacklist.as_deref().unwrap_or_default()
    }

    pub fn activity_logs(&self) -> &[ActivityLogEntry] {
        self.activity_logs.as_deref().unwrap_or_default()
    }

    /// The resolved settings written back using only the current keys
    ///
    /// Legacy keys are left untouched, they're simply shadowed from now on. Unrecognized values
    /// are normalized to what the settings page would show for them.
    pub fn migrated(&self) -> StoreMap {
        let action = self.action_settings();
        let trigger = self.trigger_settings();
        let general = self.general_settings();

        let mut map = StoreMap::new();
        map.insert(keys::ACTION_WHITELIST.to_owned(), json!(action.do_like_whitelist));
        map.insert(keys::ACTION_BLACKLIST.to_owned(), json!(action.do_dislike_blacklist));
        map.insert(keys::ACTION_UNLISTED.to_owned(), json!(action.unlisted_action.as_stored()));
        map.insert(keys::TRIGGER_TYPE.to_owned(), json!(trigger.trigger_type.as_stored()));
        map.insert(keys::TRIGGER_SECONDS.to_owned(), json!(trigger.seconds));
        map.insert(keys::TRIGGER_PERCENT.to_owned(), json!(trigger.percent));
        map.insert(keys::ENABLE_HUMANIZE.to_owned(), json!(trigger.humanize_enabled));
        map.insert(keys::ENABLE_DEBUG.to_owned(), json!(general.enable_debug));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(value: Value) -> StoredSettings {
        match value {
            Value::Object(map) => StoredSettings::from_map(&map),
            _ => panic!("test settings must be an object"),
        }
    }

    #[test]
    fn test_empty_store_uses_defaults() {
        let settings = stored(json!({}));
        assert_eq!(settings.action_settings(), ActionSettings::default());
        assert_eq!(settings.trigger_settings(), TriggerSettings::default());
        assert_eq!(settings.general_settings(), GeneralSettings::default());
        assert!(settings.whitelist().is_empty());
        assert!(settings.activity_logs().is_empty());
    }

    #[test]
    fn test_new_fields_beat_legacy() {
        let settings = stored(json!({
            "actionWhitelist": false,
            "enableLike": true,
            "actionUnlisted": "like",
            "enableDislike": true,
        }));
        let action = settings.action_settings();
        assert!(!action.do_like_whitelist);
        assert_eq!(action.unlisted_action, UnlistedAction::Like);
    }

    #[test]
    fn test_legacy_fields_used_when_new_missing() {
        let settings = stored(json!({ "enableLike": false, "enableDislike": true }));
        let action = settings.action_settings();
        assert!(!action.do_like_whitelist);
        assert!(action.do_dislike_blacklist);
        assert_eq!(action.unlisted_action, UnlistedAction::Dislike);
    }

    #[test]
    fn test_legacy_enable_dislike_false_keeps_none() {
        let settings = stored(json!({ "enableDislike": false }));
        assert_eq!(settings.action_settings().unlisted_action, UnlistedAction::None);
    }

    #[test]
    fn test_unknown_unlisted_action_is_preserved_as_unrecognized() {
        let settings = stored(json!({ "actionUnlisted": "superlike" }));
        assert_eq!(settings.action_settings().unlisted_action, UnlistedAction::Unrecognized);
    }

    #[test]
    fn test_trigger_settings() {
        let settings = stored(json!({
            "triggerType": "percent",
            "triggerSeconds": 0,
            "triggerPercent": 150,
            "enableHumanize": true,
        }));
        let trigger = settings.trigger_settings();
        assert_eq!(trigger.trigger_type, TriggerType::Percent);
        assert!((trigger.seconds - 10.).abs() < f64::EPSILON);
        assert!((trigger.percent - 100.).abs() < f64::EPSILON);
        assert!(trigger.humanize_enabled);
    }

    #[test]
    fn test_missing_and_unknown_trigger_type() {
        assert_eq!(stored(json!({ "triggerType": "" })).trigger_settings().trigger_type, TriggerType::Instant);
        assert_eq!(stored(json!({ "triggerType": "never" })).trigger_settings().trigger_type, TriggerType::Unrecognized);
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let settings = stored(json!({
            "actionWhitelist": "yes",
            "whitelist": "Foo",
            "triggerSeconds": "twenty",
            "enableExtension": null,
        }));
        assert!(settings.action_settings().do_like_whitelist);
        assert!(settings.whitelist().is_empty());
        assert!((settings.trigger_settings().seconds - 10.).abs() < f64::EPSILON);
        assert!(settings.general_settings().enable_extension);
    }

    #[test]
    fn test_non_string_trigger_type_never_fires() {
        assert_eq!(stored(json!({ "triggerType": 5 })).trigger_settings().trigger_type, TriggerType::Unrecognized);
        assert_eq!(stored(json!({ "triggerType": true })).trigger_settings().trigger_type, TriggerType::Unrecognized);
        assert_eq!(stored(json!({ "triggerType": false })).trigger_settings().trigger_type, TriggerType::Instant);
        assert_eq!(stored(json!({ "triggerType": 0 })).trigger_settings().trigger_type, TriggerType::Instant);
    }

    #[test]
    fn test_humanize_flag_truthiness() {
        assert!(stored(json!({ "enableHumanize": 1 })).trigger_settings().humanize_enabled);
        assert!(stored(json!({ "enableHumanize": "on" })).trigger_settings().humanize_enabled);
        assert!(!stored(json!({ "enableHumanize": 0 })).trigger_settings().humanize_enabled);
        assert!(!stored(json!({ "enableHumanize": "" })).trigger_settings().humanize_enabled);
        assert!(!stored(json!({ "enableHumanize": null })).trigger_settings().humanize_enabled);
    }

    #[test]
    fn test_malformed_log_entries_are_skipped_individually() {
        let settings = stored(json!({
            "activityLogs": [
                { "time": "10:00", "action": "LIKE", "title": "A", "channel": "Foo", "videoId": "a" },
                { "time": "10:01", "action": "LIKE", "title": null, "channel": "Foo", "videoId": "b" },
                { "time": "10:02", "action": "DISLIKE", "title": "C", "channel": "Bar", "videoId": "c", "reason": "r" },
            ],
        }));
        let logs = settings.activity_logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(&*logs[0].video_id, "a");
        assert_eq!(&*logs[1].video_id, "c");
        assert!(logs[0].reason.is_empty());
    }

    #[test]
    fn test_list_entries_without_names_still_parse() {
        let settings = stored(json!({ "whitelist": [{ "url": "https://youtube.com/@x" }, { "name": "Foo", "url": null }] }));
        let list = settings.whitelist();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, None);
        assert!(list[1].matches("Foo"));
    }

    #[test]
    fn test_migrated_writes_current_keys_only() {
        let settings = stored(json!({ "enableLike": false, "enableDislike": true, "triggerType": "bogus" }));
        let migrated = settings.migrated();
        assert_eq!(migrated.get(keys::ACTION_WHITELIST), Some(&json!(false)));
        assert_eq!(migrated.get(keys::ACTION_UNLISTED), Some(&json!("dislike")));
        assert_eq!(migrated.get(keys::TRIGGER_TYPE), Some(&json!("instant")));
        assert!(!migrated.contains_key(keys::ENABLE_LIKE));
    }

    #[test]
    fn test_relevant_change() {
        assert!(is_relevant_change(&["whitelist"]));
        assert!(!is_relevant_change(&["activityLogs", "enableDebug"]));
    }
}
