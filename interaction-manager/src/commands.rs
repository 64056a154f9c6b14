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
use std::{fs, io::Write, path::{Path, PathBuf}};

use chrono::Utc;
use cloneable_errors::{bail, ResContext};
use interaction_engine::{
    backup::{backup_file_name, BackupEnvelope},
    lists::{add_channel, remove_channel, AddOutcome, ChannelLists, ListKind},
    resolve_action,
    settings::{keys, StoreMap, STORAGE_KEYS},
    store::Result,
    Badge, LoggedAction, SettingsStore,
};
use log::info;
use serde_json::Value;

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub fn status<S: SettingsStore, W: Write>(store: &S, out: &mut W) -> Result<()> {
    let settings = store.read_settings()?;
    let general = settings.general_settings();
    let action = settings.action_settings();
    let trigger = settings.trigger_settings();

    let lines = [
        format!("enabled:            {}", general.enable_extension),
        format!("like whitelisted:   {}", action.do_like_whitelist),
        format!("dislike blacklisted: {}", action.do_dislike_blacklist),
        format!("unlisted channels:  {}", action.unlisted_action.as_stored()),
        format!("trigger:            {}", trigger.trigger_type.as_stored()),
        format!("trigger seconds:    {}", trigger.seconds),
        format!("trigger percent:    {}", trigger.percent),
        format!("humanize:           {}", trigger.humanize_enabled),
        format!("history:            {}", general.enable_history),
        format!("neutral badge:      {}", general.show_neutral_badge),
        format!("debug:              {}", general.enable_debug),
        format!("whitelist:          {} channels", settings.whitelist().len()),
        format!("blacklist:          {} channels", settings.blacklist().len()),
        format!("activity log:       {} entries", settings.activity_logs().len()),
    ];
    for line in lines {
        writeln!(out, "{line}").context("Failed to write output")?;
    }
    Ok(())
}

/// Stores `raw` under `key`, parsed as JSON when possible and as a plain string otherwise
pub fn set<S: SettingsStore>(store: &mut S, key: &str, raw: &str) -> Result<Vec<String>> {
    if !STORAGE_KEYS.contains(&key) {
        bail!("Unknown setting: {key}");
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    let mut items = StoreMap::new();
    items.insert(key.to_owned(), value);
    store.set(items).with_context(|| format!("Failed to set {key}"))
}

pub fn list_add<S: SettingsStore, W: Write>(store: &mut S, kind: ListKind, name: &str, url: Option<&str>, out: &mut W) -> Result<()> {
    let (outcome, _) = add_channel(store, kind, name.trim().into(), url.map(Into::into))?;
    let verb = match outcome {
        AddOutcome::Added => "Added",
        AddOutcome::Moved => "Moved",
    };
    writeln!(out, "{verb} {} to the {kind}", name.trim()).context("Failed to write output")
}

pub fn list_remove<S: SettingsStore, W: Write>(store: &mut S, kind: ListKind, name: &str, out: &mut W) -> Result<()> {
    remove_channel(store, kind, name.trim())?;
    writeln!(out, "Removed {} from the {kind}", name.trim()).context("Failed to write output")
}

pub fn list_show<S: SettingsStore, W: Write>(store: &S, kind: Option<ListKind>, out: &mut W) -> Result<()> {
    let lists = ChannelLists::load(store)?;
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => vec![ListKind::Whitelist, ListKind::Blacklist],
    };
    for kind in kinds {
        writeln!(out, "{kind}:").context("Failed to write output")?;
        for entry in lists.display_order(kind) {
            writeln!(out, "  {} {}", or_dash(entry.name.as_deref()), or_dash(entry.url.as_deref())).context("Failed to write output")?;
        }
    }
    Ok(())
}

/// Prints what would happen on a video from `channel` with the current settings
pub fn check<S: SettingsStore, W: Write>(store: &S, channel: &str, out: &mut W) -> Result<()> {
    let channel = channel.trim();
    if channel.is_empty() {
        bail!("Channel name must not be empty");
    }
    let settings = store.read_settings()?;
    let general = settings.general_settings();
    let decision = resolve_action(channel, settings.whitelist(), settings.blacklist(), &settings.action_settings());
    let badge = if general.enable_extension {
        Badge::for_decision(&decision, general.show_neutral_badge)
    } else {
        Badge::Disabled
    };
    let action = decision.action.map_or("NONE", |a| a.label());
    writeln!(out, "{channel}: {action} ({})", decision.reason).context("Failed to write output")?;
    writeln!(out, "badge: {badge} {:?}", badge.text()).context("Failed to write output")
}

pub fn show_log<S: SettingsStore, W: Write>(store: &S, out: &mut W) -> Result<()> {
    let settings = store.read_settings()?;
    let logs = settings.activity_logs();
    if logs.is_empty() {
        return writeln!(out, "No activity yet").context("Failed to write output");
    }
    for entry in logs {
        let action = match entry.action {
            LoggedAction::Like => "LIKE",
            LoggedAction::Dislike => "DISLIKE",
        };
        writeln!(out, "{} {action:<7} {} ({}) [{}]", entry.time, entry.title, entry.channel, entry.video_id)
            .context("Failed to write output")?;
        if !entry.reason.is_empty() {
            writeln!(out, "      {}", entry.reason).context("Failed to write output")?;
        }
    }
    Ok(())
}

/// Writes a backup to `output`, or to a dated file in `backup_dir`; returns the path written
pub fn export<S: SettingsStore>(store: &S, output: Option<&Path>, backup_dir: &Path) -> Result<PathBuf> {
    let path = match output {
        Some(path) => path.to_owned(),
        None => {
            fs::create_dir_all(backup_dir).with_context(|| format!("Failed to create {}", backup_dir.display()))?;
            backup_dir.join(backup_file_name(Utc::now()))
        },
    };
    let backup = BackupEnvelope::capture(store)?;
    fs::write(&path, backup.to_json()?).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

pub fn import<S: SettingsStore>(store: &mut S, file: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    BackupEnvelope::parse(&text)?.restore(store)
}

/// Rewrites the effective settings under the current keys, returning the changed keys
pub fn migrate<S: SettingsStore>(store: &mut S) -> Result<Vec<String>> {
    let settings = store.read_settings()?;
    if settings.enable_like.is_some() || settings.enable_dislike.is_some() {
        info!("Found {} or {}, they'll be shadowed by the current keys from now on", keys::ENABLE_LIKE, keys::ENABLE_DISLIKE);
    }
    store.set(settings.migrated()).context("Failed to write migrated settings")
}
