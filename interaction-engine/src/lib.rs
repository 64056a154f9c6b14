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

//! Decides whether a YouTube video gets liked, disliked or left alone, and when
//!
//! The pure parts ([`resolver`], [`trigger`], [`settings`]) know nothing about pages or storage.
//! [`controller::Controller`] glues them to a [`page::Page`] and a [`store::SettingsStore`].

pub mod activity;
pub mod backup;
pub mod constants;
pub mod controller;
pub mod errors;
pub mod lists;
pub mod page;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod trigger;
pub mod types;

pub use controller::{Controller, TickOutcome};
pub use resolver::{resolve_action, ActionDecision, Badge};
pub use store::{MemoryStore, SettingsStore};
pub use trigger::{should_trigger, VideoTriggerState};
pub use types::*;
