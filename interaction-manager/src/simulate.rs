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

//! Drives a [`Controller`] against a scripted watch page
//!
//! The page is a tiny fake DOM: elements are registered under one selector from each configured
//! list, so the same lookup code paths as a real page are exercised, fallbacks included.

use std::{collections::HashMap, sync::Arc, time::Duration};

use cloneable_errors::ResContext;
use interaction_engine::{
    constants::CHECK_INTERVAL,
    page::{first_match, ClickOutcome, Page, SelectorConfig},
    store::{self, SettingsStore},
    Action, Badge, Controller, Playback, TickOutcome,
};
use log::{debug, info};
use rand::rngs::StdRng;
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct Script {
    /// Seed for the humanize delay, unless overridden on the command line
    pub seed: Option<u64>,
    pub videos: Vec<VideoScript>,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct VideoScript {
    pub id: Arc<str>,
    pub channel: Option<Arc<str>>,
    pub title: Option<Arc<str>>,
    /// Unset for live streams
    pub duration: Option<f64>,
    pub watch_seconds: u32,
    /// Index into each selector list the elements are rendered under
    pub layout: usize,
    pub hidden: bool,
    pub buttons: bool,
}

impl Default for VideoScript {
    fn default() -> Self {
        Self {
            id: "".into(),
            channel: None,
            title: None,
            duration: None,
            watch_seconds: 30,
            layout: 0,
            hidden: false,
            buttons: true,
        }
    }
}

impl Script {
    pub fn parse(text: &str) -> store::Result<Script> {
        toml::from_str(text).context("Failed to parse the simulation script")
    }
}

enum Element {
    Text(Arc<str>),
    Button { pressed: bool },
}

#[derive(Default)]
struct FakeDom {
    elements: HashMap<Arc<str>, Element>,
}

impl FakeDom {
    fn text(&self, selector: &str) -> Option<Arc<str>> {
        match self.elements.get(selector)? {
            Element::Text(text) => Some(text.clone()),
            Element::Button { .. } => None,
        }
    }

    fn button(&self, selector: &str) -> Option<bool> {
        match self.elements.get(selector)? {
            Element::Button { pressed } => Some(*pressed),
            Element::Text(_) => None,
        }
    }

    fn set_pressed(&mut self, selector: &str, value: bool) {
        if let Some(Element::Button { pressed }) = self.elements.get_mut(selector) {
            *pressed = value;
        }
    }
}

pub struct ScriptedPage {
    selectors: SelectorConfig,
    dom: FakeDom,
    video_id: Option<Arc<str>>,
    playback: Option<Playback>,
    visible: bool,
    badge: Option<Badge>,
    notifications: Vec<String>,
}

fn pick(list: &[Arc<str>], layout: usize) -> Option<Arc<str>> {
    list.get(layout).or_else(|| list.last()).cloned()
}

impl ScriptedPage {
    pub fn new(selectors: SelectorConfig) -> Self {
        Self {
            selectors,
            dom: FakeDom::default(),
            video_id: None,
            playback: None,
            visible: true,
            badge: None,
            notifications: Vec::new(),
        }
    }

    /// Navigates to `video`, replacing the whole page
    pub fn load(&mut self, video: &VideoScript) {
        let mut dom = FakeDom::default();
        let layout = video.layout;
        if let (Some(selector), Some(channel)) = (pick(&self.selectors.channel_name, layout), &video.channel) {
            dom.elements.insert(selector, Element::Text(channel.clone()));
        }
        if let (Some(selector), Some(title)) = (pick(&self.selectors.video_title, layout), &video.title) {
            dom.elements.insert(selector, Element::Text(title.clone()));
        }
        if video.buttons {
            for action in [Action::Like, Action::Dislike] {
                if let Some(selector) = pick(self.selectors.buttons(action), layout) {
                    dom.elements.insert(selector, Element::Button { pressed: false });
                }
            }
        }
        self.dom = dom;
        self.video_id = Some(video.id.clone());
        self.playback = Some(Playback { current: 0., duration: video.duration.unwrap_or(f64::INFINITY) });
        self.visible = !video.hidden;
    }

    pub fn seek(&mut self, current: f64) {
        if let Some(ref mut playback) = self.playback {
            playback.current = current;
        }
    }

    fn find_button(&self, action: Action) -> Option<(Arc<str>, bool)> {
        first_match(self.selectors.buttons(action), |s| self.dom.button(s).map(|pressed| (Arc::from(s), pressed)))
    }

    /// The button currently pressed, if any
    pub fn pressed(&self) -> Option<Action> {
        [Action::Like, Action::Dislike]
            .into_iter()
            .find(|&action| self.find_button(action).is_some_and(|(_, pressed)| pressed))
    }

    pub fn badge(&self) -> Option<Badge> {
        self.badge
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }
}

impl Page for ScriptedPage {
    fn video_id(&self) -> Option<Arc<str>> {
        self.video_id.clone()
    }

    fn channel_name(&self) -> Option<Arc<str>> {
        first_match(&self.selectors.channel_name, |s| self.dom.text(s)).map(|name| name.trim().into())
    }

    fn video_title(&self) -> Option<Arc<str>> {
        first_match(&self.selectors.video_title, |s| self.dom.text(s)).map(|title| title.trim().into())
    }

    fn playback(&self) -> Option<Playback> {
        self.playback
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn click(&mut self, action: Action) -> ClickOutcome {
        let Some((selector, pressed)) = self.find_button(action) else {
            return ClickOutcome::NotFound;
        };
        if pressed {
            return ClickOutcome::AlreadyPressed;
        }
        // liking a video clears a dislike and vice versa
        let opposite = match action {
            Action::Like => Action::Dislike,
            Action::Dislike => Action::Like,
        };
        if let Some((other, _)) = self.find_button(opposite) {
            self.dom.set_pressed(&other, false);
        }
        self.dom.set_pressed(&selector, true);
        ClickOutcome::Clicked
    }

    fn set_badge(&mut self, badge: Badge) {
        debug!("Badge: {badge} ({:?})", badge.text());
        self.badge = Some(badge);
    }

    fn notify(&mut self, text: &str, _success: bool) {
        info!("Notification: {text}");
        self.notifications.push(text.to_owned());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoReport {
    pub id: Arc<str>,
    pub channel: Option<Arc<str>>,
    /// The last tick outcome that did something other than wait
    pub outcome: TickOutcome,
    pub pressed: Option<Action>,
    pub badge: Option<Badge>,
}

fn is_idle(outcome: &TickOutcome) -> bool {
    matches!(
        outcome,
        TickOutcome::Waiting | TickOutcome::AlreadyProcessed | TickOutcome::Hidden | TickOutcome::NotReady
    )
}

/// Plays every video of `script` for its `watch_seconds`, one tick per second of playback
pub fn run<S: SettingsStore>(
    script: &Script,
    selectors: &SelectorConfig,
    store: S,
    rng: StdRng,
) -> store::Result<(Vec<VideoReport>, S)> {
    let mut controller = Controller::with_rng(ScriptedPage::new(selectors.clone()), store, rng);
    let mut now = Duration::ZERO;
    let mut reports = Vec::with_capacity(script.videos.len());

    for video in &script.videos {
        info!("Playing {} for {}s", video.id, video.watch_seconds);
        controller.page_mut().load(video);
        let mut last = TickOutcome::Waiting;
        for second in 0..=video.watch_seconds {
            controller.page_mut().seek(f64::from(second));
            let outcome = controller
                .tick(now)
                .with_context(|| format!("Tick failed at {second}s into {}", video.id))?;
            if !is_idle(&outcome) || is_idle(&last) {
                last = outcome;
            }
            now += CHECK_INTERVAL;
        }
        let page = controller.page();
        reports.push(VideoReport {
            id: video.id.clone(),
            channel: video.channel.clone(),
            outcome: last,
            pressed: page.pressed(),
            badge: page.badge(),
        });
    }

    let (_, store) = controller.into_parts();
    Ok((reports, store))
}
