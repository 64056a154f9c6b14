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

use cloneable_errors::ResContext;
use log::info;

use crate::{
    errors::{ListError, ListErrorKind},
    settings::{keys, StoreMap, StoredSettings},
    store::{self, SettingsStore},
    types::ChannelListEntry,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ListKind {
    Whitelist,
    Blacklist,
}

impl ListKind {
    pub fn storage_key(self) -> &'static str {
        match self {
            ListKind::Whitelist => keys::WHITELIST,
            ListKind::Blacklist => keys::BLACKLIST,
        }
    }

    pub fn opposite(self) -> ListKind {
        match self {
            ListKind::Whitelist => ListKind::Blacklist,
            ListKind::Blacklist => ListKind::Whitelist,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The channel was removed from the opposite list first
    Moved,
}

/// Both channel lists, kept mutually exclusive by [`ChannelLists::add`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelLists {
    pub whitelist: Vec<ChannelListEntry>,
    pub blacklist: Vec<ChannelListEntry>,
}

impl ChannelLists {
    pub fn from_settings(settings: &StoredSettings) -> ChannelLists {
        ChannelLists {
            whitelist: settings.whitelist().to_vec(),
            blacklist: settings.blacklist().to_vec(),
        }
    }

    pub fn get(&self, kind: ListKind) -> &[ChannelListEntry] {
        match kind {
            ListKind::Whitelist => &self.whitelist,
            ListKind::Blacklist => &self.blacklist,
        }
    }

    fn get_mut(&mut self, kind: ListKind) -> &mut Vec<ChannelListEntry> {
        match kind {
            ListKind::Whitelist => &mut self.whitelist,
            ListKind::Blacklist => &mut self.blacklist,
        }
    }

    /// Appends a channel to `kind`, taking it off the opposite list if it was there
    pub fn add(&mut self, kind: ListKind, name: Arc<str>, url: Option<Arc<str>>) -> Result<AddOutcome, ListError> {
        let error = |reason: ListErrorKind| ListError { list: kind, name: name.clone(), kind: reason };
        if name.is_empty() {
            return Err(error(ListErrorKind::EmptyName));
        }
        if self.get(kind).iter().any(|e| e.matches(&name)) {
            return Err(error(ListErrorKind::AlreadyListed));
        }

        let other = self.get_mut(kind.opposite());
        let before = other.len();
        other.retain(|e| !e.matches(&name));
        let moved = other.len() != before;

        self.get_mut(kind).push(ChannelListEntry::new(name, url));
        Ok(if moved { AddOutcome::Moved } else { AddOutcome::Added })
    }

    /// Removes every entry named `name` from `kind`
    pub fn remove(&mut self, kind: ListKind, name: &str) -> Result<usize, ListError> {
        let list = self.get_mut(kind);
        let before = list.len();
        list.retain(|e| !e.matches(name));
        match before - list.len() {
            0 => Err(ListError { list: kind, name: name.into(), kind: ListErrorKind::NotListed }),
            removed => Ok(removed),
        }
    }

    /// Entries of `kind`, most recently added first
    pub fn display_order(&self, kind: ListKind) -> impl Iterator<Item = &ChannelListEntry> {
        self.get(kind).iter().rev()
    }

    pub fn to_map(&self) -> store::Result<StoreMap> {
        let mut map = StoreMap::new();
        for kind in [ListKind::Whitelist, ListKind::Blacklist] {
            let list = serde_json::to_value(self.get(kind)).with_context(|| format!("Failed to serialize the {kind}"))?;
            map.insert(kind.storage_key().to_owned(), list);
        }
        Ok(map)
    }

    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> store::Result<ChannelLists> {
        let settings = store.read_settings().context("Failed to read channel lists")?;
        Ok(ChannelLists::from_settings(&settings))
    }

    /// Writes both lists back, returning the changed keys
    pub fn save<S: SettingsStore + ?Sized>(&self, store: &mut S) -> store::Result<Vec<String>> {
        store.set(self.to_map()?).context("Failed to write channel lists")
    }
}

/// Loads the lists, adds the channel and saves them again
pub fn add_channel<S: SettingsStore + ?Sized>(
    store: &mut S,
    kind: ListKind,
    name: Arc<str>,
    url: Option<Arc<str>>,
) -> store::Result<(AddOutcome, Vec<String>)> {
    let mut lists = ChannelLists::load(&*store)?;
    let outcome = lists
        .add(kind, name.clone(), url)
        .context("Failed to add channel")?;
    let changed = lists.save(store)?;
    match outcome {
        AddOutcome::Added => info!("Added {name} to the {kind}"),
        AddOutcome::Moved => info!("Moved {name} to the {kind}"),
    }
    Ok((outcome, changed))
}

pub fn remove_channel<S: SettingsStore + ?Sized>(store: &mut S, kind: ListKind, name: &str) -> store::Result<Vec<String>> {
    let mut lists = ChannelLists::load(&*store)?;
    lists.remove(kind, name).context("Failed to remove channel")?;
    info!("Removed {name} from the {kind}");
    lists.save(store)
}
