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

use crate::types::{Action, ActionSettings, ChannelListEntry, UnlistedAction};

pub const REASON_WHITELIST_ON: &str = "Channel is Whitelisted & Action is ON";
pub const REASON_WHITELIST_OFF: &str = "Channel is Whitelisted but Action is OFF";
pub const REASON_BLACKLIST_ON: &str = "Channel is Blacklisted & Action is ON";
pub const REASON_BLACKLIST_OFF: &str = "Channel is Blacklisted but Action is OFF";
pub const REASON_UNLISTED_LIKE: &str = "Unlisted Channel -> Action: LIKE ALL";
pub const REASON_UNLISTED_DISLIKE: &str = "Unlisted Channel -> Action: DISLIKE ALL";
pub const REASON_UNLISTED_NONE: &str = "Unlisted Channel -> Action: NONE";

/// Outcome of [`resolve_action`]
///
/// `action` is `None` when nothing should be clicked.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ActionDecision {
    pub action: Option<Action>,
    pub reason: &'static str,
}

impl ActionDecision {
    const fn new(action: Option<Action>, reason: &'static str) -> Self {
        Self { action, reason }
    }
}

pub fn is_listed(list: &[ChannelListEntry], name: &str) -> bool {
    list.iter().any(|entry| entry.matches(name))
}

/// Decides what to do on a video from the given channel
///
/// Rules are checked in a fixed order and the first match wins: whitelist, blacklist, then the
/// unlisted policy. A name present on both lists resolves through the whitelist.
///
/// Callers must not pass an empty channel name.
pub fn resolve_action(
    channel_name: &str,
    whitelist: &[ChannelListEntry],
    blacklist: &[ChannelListEntry],
    settings: &ActionSettings,
) -> ActionDecision {
    if is_listed(whitelist, channel_name) {
        if settings.do_like_whitelist {
            ActionDecision::new(Some(Action::Like), REASON_WHITELIST_ON)
        } else {
            ActionDecision::new(None, REASON_WHITELIST_OFF)
        }
    } else if is_listed(blacklist, channel_name) {
        if settings.do_dislike_blacklist {
            ActionDecision::new(Some(Action::Dislike), REASON_BLACKLIST_ON)
        } else {
            ActionDecision::new(None, REASON_BLACKLIST_OFF)
        }
    } else {
        match settings.unlisted_action {
            UnlistedAction::Like => ActionDecision::new(Some(Action::Like), REASON_UNLISTED_LIKE),
            UnlistedAction::Dislike => ActionDecision::new(Some(Action::Dislike), REASON_UNLISTED_DISLIKE),
            UnlistedAction::None | UnlistedAction::Unrecognized => ActionDecision::new(None, REASON_UNLISTED_NONE),
        }
    }
}

/// State of the toolbar badge for the current tab
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
pub enum Badge {
    Like,
    Dislike,
    Neutral,
    /// The master switch is off
    Disabled,
    Hidden,
}

impl Badge {
    pub fn for_decision(decision: &ActionDecision, show_neutral: bool) -> Badge {
        match decision.action {
            Some(Action::Like) => Badge::Like,
            Some(Action::Dislike) => Badge::Dislike,
            None if show_neutral => Badge::Neutral,
            None => Badge::Hidden,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Badge::Like => "ON",
            Badge::Dislike => "DIS",
            Badge::Neutral => "-",
            Badge::Disabled => "OFF",
            Badge::Hidden => "",
        }
    }

    /// Background colour, `None` when nothing is drawn
    pub fn color(self) -> Option<&'static str> {
        match self {
            Badge::Like => Some(crate::constants::BADGE_LIKE_COLOR),
            Badge::Dislike => Some(crate::constants::BADGE_DISLIKE_COLOR),
            Badge::Neutral | Badge::Disabled => Some(crate::constants::BADGE_NEUTRAL_COLOR),
            Badge::Hidden => None,
        }
    }
}
