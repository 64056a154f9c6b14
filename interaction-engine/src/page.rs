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

//! The boundary between the controller and whatever hosts the watch page

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    resolver::Badge,
    types::{Action, Playback},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
pub enum ClickOutcome {
    /// None of the button selectors matched
    NotFound,
    Clicked,
    /// The button was already in the desired state, nothing was clicked
    AlreadyPressed,
}

impl ClickOutcome {
    pub fn succeeded(self) -> bool {
        !matches!(self, ClickOutcome::NotFound)
    }
}

/// The watch page, as seen by the controller
///
/// Lookups return `None` when nothing matched. That's never an error, the controller just skips
/// the current tick.
pub trait Page {
    /// Id of the video currently on screen (`v` query parameter)
    fn video_id(&self) -> Option<Arc<str>>;
    fn channel_name(&self) -> Option<Arc<str>>;
    fn video_title(&self) -> Option<Arc<str>>;
    /// `None` while there's no media element, or it has no metadata yet
    fn playback(&self) -> Option<Playback>;
    fn is_visible(&self) -> bool {
        true
    }
    fn click(&mut self, action: Action) -> ClickOutcome;
    fn set_badge(&mut self, badge: Badge);
    fn notify(&mut self, _text: &str, _success: bool) {}
}

/// Ordered selector lists for every element the page layer looks up
///
/// Earlier entries take priority. Results are never merged across selectors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub channel_name: Vec<Arc<str>>,
    pub video_title: Vec<Arc<str>>,
    pub like_button: Vec<Arc<str>>,
    pub dislike_button: Vec<Arc<str>>,
}

impl SelectorConfig {
    pub fn buttons(&self, action: Action) -> &[Arc<str>] {
        match action {
            Action::Like => &self.like_button,
            Action::Dislike => &self.dislike_button,
        }
    }
}

fn owned(list: &[&str]) -> Vec<Arc<str>> {
    list.iter().map(|&s| s.into()).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            channel_name: owned(&[
                "#owner #channel-name a",
                ".ytd-channel-name a",
                "#upload-info #channel-name a",
                "ytd-video-owner-renderer #channel-name a",
                "#text.ytd-channel-name",
                "ytd-channel-name a",
            ]),
            video_title: owned(&[
                "#title > h1 > yt-formatted-string",
                "h1.ytd-watch-metadata",
                "h1.title.style-scope.ytd-video-primary-info-renderer",
            ]),
            like_button: owned(&[
                "like-button-view-model button",
                "#top-level-buttons-computed > ytd-toggle-button-renderer:first-child a",
                "#segmented-like-button button",
            ]),
            dislike_button: owned(&[
                "dislike-button-view-model button",
                "#top-level-buttons-computed > ytd-toggle-button-renderer:nth-child(2) a",
                "#segmented-dislike-button button",
            ]),
        }
    }
}

/// Runs `query` on each selector in order, returning the first hit
pub fn first_match<T, F>(selectors: &[Arc<str>], mut query: F) -> Option<T>
where F: FnMut(&str) -> Option<T>,
{
    selectors.iter().find_map(|selector| query(selector))
}
