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

use serde::{Deserialize, Serialize};

/// A channel stored on the whitelist or the blacklist
///
/// Identity is the exact, case-sensitive `name`. Entries without a name are kept around but never
/// match anything.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChannelListEntry {
    #[serde(default)]
    pub name: Option<Arc<str>>,
    #[serde(default)]
    pub url: Option<Arc<str>>,
}

impl ChannelListEntry {
    pub fn new(name: impl Into<Arc<str>>, url: Option<Arc<str>>) -> Self {
        Self {
            name: Some(name.into()),
            url,
        }
    }

    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// The button the controller may press on a video
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Like,
    Dislike,
}

impl Action {
    /// Label used in the activity log and in notifications
    pub fn label(self) -> &'static str {
        match self {
            Action::Like => "LIKE",
            Action::Dislike => "DISLIKE",
        }
    }
}

/// Action recorded in an [`ActivityLogEntry`]
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoggedAction {
    Like,
    Dislike,
}

impl From<Action> for LoggedAction {
    fn from(value: Action) -> Self {
        match value {
            Action::Like => LoggedAction::Like,
            Action::Dislike => LoggedAction::Dislike,
        }
    }
}

/// Policy for channels that are on neither list
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum UnlistedAction {
    #[default]
    None,
    Like,
    Dislike,
    /// A stored value this version doesn't know about. Resolves like [`UnlistedAction::None`].
    Unrecognized,
}

impl UnlistedAction {
    /// Parses a stored value, mapping anything unknown to [`UnlistedAction::Unrecognized`]
    pub fn from_stored(value: &str) -> Self {
        match value {
            "none" => UnlistedAction::None,
            "like" => UnlistedAction::Like,
            "dislike" => UnlistedAction::Dislike,
            _ => UnlistedAction::Unrecognized,
        }
    }

    /// The stored form. [`UnlistedAction::Unrecognized`] is written back as `none`.
    pub fn as_stored(self) -> &'static str {
        match self {
            UnlistedAction::None | UnlistedAction::Unrecognized => "none",
            UnlistedAction::Like => "like",
            UnlistedAction::Dislike => "dislike",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TriggerType {
    #[default]
    Instant,
    Percent,
    Time,
    /// A stored value this version doesn't know about. Never fires.
    Unrecognized,
}

impl TriggerType {
    pub fn from_stored(value: &str) -> Self {
        match value {
            "instant" => TriggerType::Instant,
            "percent" => TriggerType::Percent,
            "time" => TriggerType::Time,
            _ => TriggerType::Unrecognized,
        }
    }

    /// The stored form. [`TriggerType::Unrecognized`] is written back as `instant`.
    pub fn as_stored(self) -> &'static str {
        match self {
            TriggerType::Instant | TriggerType::Unrecognized => "instant",
            TriggerType::Percent => "percent",
            TriggerType::Time => "time",
        }
    }
}

/// Resolved configuration consumed by the action resolver
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ActionSettings {
    pub do_like_whitelist: bool,
    pub do_dislike_blacklist: bool,
    pub unlisted_action: UnlistedAction,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            do_like_whitelist: true,
            do_dislike_blacklist: true,
            unlisted_action: UnlistedAction::None,
        }
    }
}

/// Resolved playback condition gating when an action fires
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TriggerSettings {
    pub trigger_type: TriggerType,
    pub seconds: f64,
    /// Always within `0..=100`
    pub percent: f64,
    pub humanize_enabled: bool,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            trigger_type: TriggerType::Instant,
            seconds: 10.,
            percent: 50.,
            humanize_enabled: false,
        }
    }
}

/// Flags that don't feed into the decision itself
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GeneralSettings {
    pub enable_extension: bool,
    pub enable_debug: bool,
    pub enable_history: bool,
    pub show_neutral_badge: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            enable_extension: true,
            enable_debug: false,
            enable_history: true,
            show_neutral_badge: true,
        }
    }
}

/// Position of the media element, in seconds
///
/// `duration` may be NaN or infinite while the page is still loading metadata, or for live streams.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Playback {
    pub current: f64,
    pub duration: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub time: Arc<str>,
    pub action: LoggedAction,
    pub title: Arc<str>,
    pub channel: Arc<str>,
    pub video_id: Arc<str>,
    #[serde(default)]
    pub reason: Arc<str>,
}
