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

//! The polling loop tying the page, the store and the decision logic together
//!
//! A [`Controller`] owns everything that used to be global state: the per-video trigger state,
//! the pending click verifications and the debug trace. The host calls [`Controller::tick`] on
//! every timer tick (see [`crate::constants::CHECK_INTERVAL`]) with a monotonic timestamp, and
//! forwards storage change notifications to [`Controller::apply_storage_change`].

use std::{sync::Arc, time::Duration};

use cloneable_errors::ResContext;
use log::{debug, info, warn};
use rand::rngs::StdRng;

use crate::{
    activity,
    constants::VERIFICATION_DELAYS,
    page::{ClickOutcome, Page},
    resolver::{resolve_action, Badge},
    settings::{is_relevant_change, StoreMap, StoredSettings},
    store::{self, SettingsStore},
    trigger::{should_trigger, VideoTriggerState},
    types::{Action, ActivityLogEntry},
};

/// What a single tick ended up doing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The master switch is off
    Disabled,
    /// The page is hidden and the current video was already handled
    Hidden,
    /// Not on a watch page
    NoVideo,
    AlreadyProcessed,
    /// No media element, or no metadata yet
    NotReady,
    /// The trigger point hasn't been reached yet
    Waiting,
    /// The trigger fired but the channel name couldn't be found
    MissingChannel,
    /// The trigger fired and the resolver decided not to act
    Skipped { reason: &'static str },
    Acted { action: Action, outcome: ClickOutcome, reason: &'static str },
    /// The button couldn't be found. The video stays unprocessed and is retried on the next tick.
    ClickFailed { action: Action },
}

#[derive(Clone, Debug)]
struct PendingVerification {
    due: Duration,
    action: Action,
    channel: Arc<str>,
}

/// Debug output gated on the stored `enableDebug` flag, with consecutive duplicates dropped
#[derive(Default)]
struct Trace {
    enabled: bool,
    last: String,
}

impl Trace {
    fn emit(&mut self, message: String, allow_spam: bool) {
        if !self.enabled || (!allow_spam && self.last == message) {
            return;
        }
        debug!("{message}");
        self.last = message;
    }
}

pub struct Controller<P: Page, S: SettingsStore> {
    page: P,
    store: S,
    rng: StdRng,
    state: Option<VideoTriggerState>,
    verifications: Vec<PendingVerification>,
    last_badge: Option<Badge>,
    trace: Trace,
}

impl<P: Page, S: SettingsStore> Controller<P, S> {
    pub fn with_rng(page: P, store: S, rng: StdRng) -> Self {
        Self {
            page,
            store,
            rng,
            state: None,
            verifications: Vec::new(),
            last_badge: None,
            trace: Trace::default(),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> Option<&VideoTriggerState> {
        self.state.as_ref()
    }

    pub fn pending_verifications(&self) -> usize {
        self.verifications.len()
    }

    pub fn into_parts(self) -> (P, S) {
        (self.page, self.store)
    }

    /// Handles a change notification from the store
    ///
    /// Relevant changes make the next tick evaluate the current video again with fresh settings.
    /// Ticks already in progress are not affected.
    pub fn apply_storage_change<K: AsRef<str>>(&mut self, changed: &[K]) {
        if is_relevant_change(changed) {
            if let Some(state) = self.state.as_mut() {
                state.invalidate();
            }
            self.trace.emit("[SETTINGS] Config changed. Resetting state for current video.".to_owned(), true);
        }
    }

    /// Writes settings through this controller's store and applies the resulting change
    pub fn update_settings(&mut self, items: StoreMap) -> store::Result<Vec<String>> {
        let changed = self.store.set(items).context("Failed to update settings")?;
        self.apply_storage_change(&changed);
        Ok(changed)
    }

    fn cancel_verifications(&mut self) {
        self.verifications.clear();
    }

    fn schedule_verifications(&mut self, now: Duration, action: Action, channel: &Arc<str>) {
        self.cancel_verifications();
        self.verifications.extend(VERIFICATION_DELAYS.iter().map(|delay| PendingVerification {
            due: now + *delay,
            action,
            channel: channel.clone(),
        }));
    }

    fn run_due_verifications(&mut self, now: Duration) {
        let (due, pending): (Vec<_>, Vec<_>) = self.verifications.drain(..).partition(|v| v.due <= now);
        self.verifications = pending;
        for verification in due {
            self.trace.emit(format!("[VERIFY] Re-checking {} for {}", verification.action, verification.channel), true);
            self.attempt(verification.action, &verification.channel, false);
        }
    }

    fn attempt(&mut self, action: Action, channel: &str, notify: bool) -> ClickOutcome {
        let outcome = self.page.click(action);
        match outcome {
            ClickOutcome::NotFound => self.trace.emit(format!("[FAIL] {action} button not found."), true),
            ClickOutcome::AlreadyPressed => self.trace.emit("[INFO] Button already pressed.".to_owned(), false),
            ClickOutcome::Clicked => {
                self.trace.emit(format!("[CLICK] {action} button clicked."), true);
                if notify && self.verifications.is_empty() {
                    self.page.notify(&format!("{}: {channel}", action.label()), action == Action::Like);
                }
            },
        }
        outcome
    }

    fn update_badge(&mut self, badge: Badge) {
        if self.last_badge != Some(badge) {
            self.page.set_badge(badge);
            self.last_badge = Some(badge);
        }
    }

    /// Runs one polling cycle
    ///
    /// `now` is a monotonic timestamp used to schedule click verifications; it must never go
    /// backwards between calls.
    pub fn tick(&mut self, now: Duration) -> store::Result<TickOutcome> {
        let on_processed_video = self
            .state
            .as_ref()
            .is_some_and(|s| s.processed && self.page.video_id().as_deref() == Some(&*s.video_id));
        if !self.page.is_visible() && on_processed_video {
            // still the same video, so pending retries belong to it
            self.run_due_verifications(now);
            return Ok(TickOutcome::Hidden);
        }

        let settings = self.store.read_settings().context("Failed to read settings")?;
        let general = settings.general_settings();
        self.trace.enabled = general.enable_debug;

        if !general.enable_extension {
            self.cancel_verifications();
            self.update_badge(Badge::Disabled);
            return Ok(TickOutcome::Disabled);
        }

        let Some(video_id) = self.page.video_id() else {
            self.cancel_verifications();
            return Ok(TickOutcome::NoVideo);
        };

        let previous = self.state.as_ref().map(|s| s.video_id.clone());
        if previous.as_ref() != Some(&video_id) {
            match previous {
                Some(previous) => self.trace.emit(format!("[CHANGE] Video Switch Detected: {previous} -> {video_id}"), true),
                None => self.trace.emit(format!("[CHANGE] Video Detected: {video_id}"), true),
            }
            if let Some(state) = self.state.as_mut() {
                state.reset(video_id.clone());
            } else {
                self.state = Some(VideoTriggerState::new(video_id.clone()));
            }
            self.cancel_verifications();
        }

        self.run_due_verifications(now);

        let channel = self.page.channel_name().filter(|c| !c.is_empty());
        if let Some(ref channel) = channel {
            let decision = resolve_action(channel, settings.whitelist(), settings.blacklist(), &settings.action_settings());
            self.update_badge(Badge::for_decision(&decision, general.show_neutral_badge));
        }

        let Some(state) = self.state.as_mut() else {
            return Ok(TickOutcome::NoVideo);
        };
        if state.processed {
            return Ok(TickOutcome::AlreadyProcessed);
        }

        let Some(playback) = self.page.playback() else {
            return Ok(TickOutcome::NotReady);
        };

        let trigger = settings.trigger_settings();
        if !should_trigger(playback.current, playback.duration, &trigger, state, &mut self.rng) {
            return Ok(TickOutcome::Waiting);
        }

        self.process_video(now, video_id, channel, &settings)
    }

    fn process_video(
        &mut self,
        now: Duration,
        video_id: Arc<str>,
        channel: Option<Arc<str>>,
        settings: &StoredSettings,
    ) -> store::Result<TickOutcome> {
        let Some(channel) = channel else {
            return Ok(TickOutcome::MissingChannel);
        };

        let decision = resolve_action(&channel, settings.whitelist(), settings.blacklist(), &settings.action_settings());
        let Some(action) = decision.action else {
            self.trace.emit(format!("[SKIP] No action taken. Reason: {} - Channel: {channel}", decision.reason), false);
            self.mark_processed();
            return Ok(TickOutcome::Skipped { reason: decision.reason });
        };

        self.trace.emit(
            format!("[ACTION] Decided to {} ({}) - Channel: {channel}", action.label(), decision.reason),
            false,
        );
        let outcome = self.attempt(action, &channel, true);
        if !outcome.succeeded() {
            return Ok(TickOutcome::ClickFailed { action });
        }

        info!("{} on video {video_id} by {channel} ({})", action.label(), decision.reason);
        self.mark_processed();
        self.schedule_verifications(now, action, &channel);

        if settings.general_settings().enable_history {
            let entry = ActivityLogEntry::new(action, self.page.video_title(), channel.clone(), video_id, decision.reason);
            if let Err(err) = activity::record(&mut self.store, entry) {
                warn!("Failed to record activity for {channel}: {err:?}");
            }
        }

        Ok(TickOutcome::Acted { action, outcome, reason: decision.reason })
    }

    fn mark_processed(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.processed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use serde_json::{json, Value};

    use crate::{
        constants::MAX_LOG_ENTRIES,
        settings::keys,
        resolver::{REASON_BLACKLIST_ON, REASON_UNLISTED_LIKE, REASON_UNLISTED_NONE, REASON_WHITELIST_ON},
        store::MemoryStore,
        types::{LoggedAction, Playback},
    };

    use super::*;

    #[derive(Default)]
    struct FakePage {
        video_id: Option<Arc<str>>,
        channel: Option<Arc<str>>,
        title: Option<Arc<str>>,
        playback: Option<Playback>,
        hidden: bool,
        button_missing: bool,
        pressed: Option<Action>,
        clicks: Vec<Action>,
        badges: Vec<Badge>,
        notifications: Vec<String>,
    }

    impl FakePage {
        fn watching(video_id: &str, channel: &str) -> Self {
            Self {
                video_id: Some(video_id.into()),
                channel: Some(channel.into()),
                title: Some(format!("A video by {channel}").into()),
                playback: Some(Playback { current: 0., duration: 100. }),
                ..Self::default()
            }
        }

        fn seek(&mut self, current: f64) {
            if let Some(ref mut playback) = self.playback {
                playback.current = current;
            }
        }

        fn navigate(&mut self, video_id: &str, channel: &str) {
            self.video_id = Some(video_id.into());
            self.channel = Some(channel.into());
            self.pressed = None;
            self.seek(0.);
        }
    }

    impl Page for FakePage {
        fn video_id(&self) -> Option<Arc<str>> {
            self.video_id.clone()
        }
        fn channel_name(&self) -> Option<Arc<str>> {
            self.channel.clone()
        }
        fn video_title(&self) -> Option<Arc<str>> {
            self.title.clone()
        }
        fn playback(&self) -> Option<Playback> {
            self.playback
        }
        fn is_visible(&self) -> bool {
            !self.hidden
        }
        fn click(&mut self, action: Action) -> ClickOutcome {
            if self.button_missing {
                return ClickOutcome::NotFound;
            }
            if self.pressed == Some(action) {
                return ClickOutcome::AlreadyPressed;
            }
            self.pressed = Some(action);
            self.clicks.push(action);
            ClickOutcome::Clicked
        }
        fn set_badge(&mut self, badge: Badge) {
            self.badges.push(badge);
        }
        fn notify(&mut self, text: &str, _success: bool) {
            self.notifications.push(text.to_owned());
        }
    }

    fn store(value: Value) -> MemoryStore {
        match value {
            Value::Object(map) => MemoryStore::with_data(map),
            _ => panic!("expected an object"),
        }
    }

    fn controller(page: FakePage, settings: Value) -> Controller<FakePage, MemoryStore> {
        Controller::with_rng(page, store(settings), StdRng::seed_from_u64(3))
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn logs(ctl: &Controller<FakePage, MemoryStore>) -> Vec<ActivityLogEntry> {
        ctl.store().read_settings().unwrap().activity_logs.unwrap_or_default()
    }

    #[test]
    fn test_instant_like_on_whitelisted_channel() {
        let mut ctl = controller(FakePage::watching("vid1", "Foo"), json!({ "whitelist": [{ "name": "Foo", "url": null }] }));

        assert_eq!(ctl.tick(secs(0)).unwrap(), TickOutcome::Waiting);
        ctl.page_mut().seek(1.);
        assert_eq!(
            ctl.tick(secs(1)).unwrap(),
            TickOutcome::Acted { action: Action::Like, outcome: ClickOutcome::Clicked, reason: REASON_WHITELIST_ON }
        );
        assert_eq!(ctl.page().clicks, [Action::Like]);
        assert_eq!(ctl.page().notifications, ["LIKE: Foo"]);
        assert_eq!(ctl.page().badges, [Badge::Like]);

        let entries = logs(&ctl);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, LoggedAction::Like);
        assert_eq!(&*entries[0].channel, "Foo");
        assert_eq!(&*entries[0].video_id, "vid1");
        assert_eq!(&*entries[0].title, "A video by Foo");
        assert_eq!(&*entries[0].reason, REASON_WHITELIST_ON);

        // handled once per video
        ctl.page_mut().seek(2.);
        assert_eq!(ctl.tick(secs(2)).unwrap(), TickOutcome::AlreadyProcessed);
        assert_eq!(logs(&ctl).len(), 1);
    }

    #[test]
    fn test_unlisted_none_marks_processed_without_clicking() {
        let mut page = FakePage::watching("vid1", "Bar");
        page.seek(5.);
        let mut ctl = controller(page, json!({ "showNeutralBadge": false }));
        assert_eq!(ctl.tick(secs(0)).unwrap(), TickOutcome::Skipped { reason: REASON_UNLISTED_NONE });
        assert!(ctl.state().unwrap().processed);
        assert!(ctl.page().clicks.is_empty());
        assert_eq!(ctl.page().badges, [Badge::Hidden]);
        assert!(logs(&ctl).is_empty());
    }

    #[test]
    fn test_time_trigger_waits_for_target() {
        let mut ctl = controller(
            FakePage::watching("vid1", "Spam"),
            json!({ "blacklist": [{ "name": "Spam" }], "triggerType": "time", "triggerSeconds": 10 }),
        );
        for t in [1., 5., 10.] {
            ctl.page_mut().seek(t);
            assert_eq!(ctl.tick(secs(0)).unwrap(), TickOutcome::Waiting);
        }
        ctl.page_mut().seek(10.5);
        assert_eq!(
            ctl.tick(secs(0)).unwrap(),
            TickOutcome::Acted { action: Action::Dislike, outcome: ClickOutcome::Clicked, reason: REASON_BLACKLIST_ON }
        );
    }

    #[test]
    fn test_missing_button_retries_next_tick() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        page.button_missing = true;
        let mut ctl = controller(page, json!({ "actionUnlisted": "like" }));
        assert_eq!(ctl.tick(secs(0)).unwrap(), TickOutcome::ClickFailed { action: Action::Like });
        assert!(!ctl.state().unwrap().processed);
        assert_eq!(ctl.pending_verifications(), 0);

        ctl.page_mut().button_missing = false;
        assert!(matches!(ctl.tick(secs(1)).unwrap(), TickOutcome::Acted { .. }));
    }

    #[test]
    fn test_already_pressed_counts_as_success() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        page.pressed = Some(Action::Like);
        let mut ctl = controller(page, json!({ "actionUnlisted": "like" }));
        assert_eq!(
            ctl.tick(secs(0)).unwrap(),
            TickOutcome::Acted { action: Action::Like, outcome: ClickOutcome::AlreadyPressed, reason: REASON_UNLISTED_LIKE }
        );
        assert!(ctl.page().notifications.is_empty());
        assert_eq!(logs(&ctl).len(), 1);
    }

    #[test]
    fn test_verifications_retry_at_fixed_delays() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        let mut ctl = controller(page, json!({ "actionUnlisted": "dislike" }));
        ctl.tick(secs(10)).unwrap();
        assert_eq!(ctl.pending_verifications(), 2);

        // something undid the click in the meantime
        ctl.page_mut().pressed = None;
        ctl.tick(secs(11)).unwrap();
        assert_eq!(ctl.pending_verifications(), 2);
        ctl.tick(secs(12)).unwrap();
        assert_eq!(ctl.pending_verifications(), 1);
        assert_eq!(ctl.page().clicks, [Action::Dislike, Action::Dislike]);

        ctl.page_mut().pressed = None;
        ctl.tick(secs(15)).unwrap();
        assert_eq!(ctl.pending_verifications(), 0);
        assert_eq!(ctl.page().clicks.len(), 3);
        // only the initial click notifies
        assert_eq!(ctl.page().notifications.len(), 1);
    }

    #[test]
    fn test_video_change_cancels_verifications_and_resets_state() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        let mut ctl = controller(page, json!({ "actionUnlisted": "like" }));
        ctl.tick(secs(0)).unwrap();
        assert_eq!(ctl.pending_verifications(), 2);

        ctl.page_mut().navigate("vid2", "Other");
        assert_eq!(ctl.tick(secs(1)).unwrap(), TickOutcome::Waiting);
        assert_eq!(ctl.pending_verifications(), 0);
        let state = ctl.state().unwrap();
        assert_eq!(&*state.video_id, "vid2");
        assert!(!state.processed);

        ctl.page_mut().seek(1.);
        ctl.tick(secs(2)).unwrap();
        ctl.tick(secs(10)).unwrap();
        assert_eq!(ctl.page().clicks, [Action::Like, Action::Like]);
        assert_eq!(logs(&ctl).len(), 2);
        assert_eq!(&*logs(&ctl)[0].video_id, "vid2");
    }

    #[test]
    fn test_relevant_settings_change_reevaluates() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        let mut ctl = controller(page, json!({}));
        assert_eq!(ctl.tick(secs(0)).unwrap(), TickOutcome::Skipped { reason: REASON_UNLISTED_NONE });
        assert_eq!(ctl.tick(secs(1)).unwrap(), TickOutcome::AlreadyProcessed);

        let mut update = StoreMap::new();
        update.insert("whitelist".to_owned(), json!([{ "name": "Foo" }]));
        ctl.update_settings(update).unwrap();
        assert!(!ctl.state().unwrap().processed);
        assert!(matches!(ctl.tick(secs(2)).unwrap(), TickOutcome::Acted { action: Action::Like, .. }));
    }

    #[test]
    fn test_irrelevant_settings_change_keeps_state() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        let mut ctl = controller(page, json!({}));
        ctl.tick(secs(0)).unwrap();
        ctl.apply_storage_change(&["activityLogs", "showNeutralBadge"]);
        assert_eq!(ctl.tick(secs(1)).unwrap(), TickOutcome::AlreadyProcessed);
    }

    #[test]
    fn test_humanize_delay_survives_ticks_until_invalidated() {
        let page = FakePage::watching("vid1", "Foo");
        let mut ctl = controller(page, json!({ "enableHumanize": true, "triggerType": "time", "triggerSeconds": 10 }));
        ctl.tick(secs(0)).unwrap();
        let delay = ctl.state().unwrap().random_delay_seconds;
        assert!((3..=15).contains(&delay));
        for t in 1..5 {
            ctl.tick(secs(t)).unwrap();
            assert_eq!(ctl.state().unwrap().random_delay_seconds, delay);
        }

        ctl.page_mut().seek(10. + f64::from(delay));
        assert_eq!(ctl.tick(secs(5)).unwrap(), TickOutcome::Waiting);
        ctl.page_mut().seek(10.5 + f64::from(delay));
        assert!(matches!(ctl.tick(secs(6)).unwrap(), TickOutcome::Skipped { .. }));

        ctl.apply_storage_change(&["triggerSeconds"]);
        assert!(!ctl.state().unwrap().delay_computed);
    }

    #[test]
    fn test_master_switch_off() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        let mut ctl = controller(page, json!({ "enableExtension": false, "actionUnlisted": "like" }));
        assert_eq!(ctl.tick(secs(0)).unwrap(), TickOutcome::Disabled);
        assert_eq!(ctl.tick(secs(1)).unwrap(), TickOutcome::Disabled);
        assert!(ctl.page().clicks.is_empty());
        // the badge is only pushed when it changes
        assert_eq!(ctl.page().badges, [Badge::Disabled]);

        let mut update = StoreMap::new();
        update.insert("enableExtension".to_owned(), json!(true));
        ctl.update_settings(update).unwrap();
        assert!(matches!(ctl.tick(secs(2)).unwrap(), TickOutcome::Acted { .. }));
        assert_eq!(ctl.page().badges, [Badge::Disabled, Badge::Like]);
    }

    #[test]
    fn test_history_disabled_skips_logging() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        let mut ctl = controller(page, json!({ "enableHistory": false, "actionUnlisted": "like" }));
        assert!(matches!(ctl.tick(secs(0)).unwrap(), TickOutcome::Acted { .. }));
        assert!(logs(&ctl).is_empty());
    }

    #[test]
    fn test_hidden_page_only_skips_processed_videos() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        page.hidden = true;
        let mut ctl = controller(page, json!({ "actionUnlisted": "like" }));
        // not processed yet, so background tabs still act
        assert!(matches!(ctl.tick(secs(0)).unwrap(), TickOutcome::Acted { .. }));
        assert_eq!(ctl.tick(secs(1)).unwrap(), TickOutcome::Hidden);

        // autoplay moved on while in the background
        ctl.page_mut().navigate("vid2", "Foo");
        assert_eq!(ctl.tick(secs(2)).unwrap(), TickOutcome::Waiting);
        assert_eq!(&*ctl.state().unwrap().video_id, "vid2");
    }

    #[test]
    fn test_missing_page_data() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.playback = None;
        let mut ctl = controller(page, json!({}));
        assert_eq!(ctl.tick(secs(0)).unwrap(), TickOutcome::NotReady);

        ctl.page_mut().playback = Some(Playback { current: 2., duration: f64::NAN });
        ctl.page_mut().channel = None;
        assert_eq!(ctl.tick(secs(1)).unwrap(), TickOutcome::MissingChannel);
        assert!(!ctl.state().unwrap().processed);

        ctl.page_mut().video_id = None;
        assert_eq!(ctl.tick(secs(2)).unwrap(), TickOutcome::NoVideo);
    }

    #[test]
    fn test_percent_trigger_with_unknown_duration_never_fires() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.playback = Some(Playback { current: 5000., duration: f64::INFINITY });
        let mut ctl = controller(page, json!({ "triggerType": "percent", "actionUnlisted": "like" }));
        for t in 0..5 {
            assert_eq!(ctl.tick(secs(t)).unwrap(), TickOutcome::Waiting);
        }
    }

    #[test]
    fn test_log_is_capped_across_videos() {
        let mut ctl = controller(FakePage::watching("vid0", "Foo"), json!({ "actionUnlisted": "like" }));
        for n in 0..(MAX_LOG_ENTRIES as u64 + 3) {
            ctl.page_mut().navigate(&format!("vid{n}"), "Foo");
            ctl.tick(secs(n * 10)).unwrap();
            ctl.page_mut().seek(1.);
            ctl.tick(secs(n * 10 + 1)).unwrap();
        }
        let entries = logs(&ctl);
        assert_eq!(entries.len(), MAX_LOG_ENTRIES);
        assert_eq!(&*entries[0].video_id, "vid12");
    }

    #[test]
    fn test_verifications_run_while_hidden() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        page.hidden = true;
        let mut ctl = controller(page, json!({ "actionUnlisted": "dislike" }));
        assert!(matches!(ctl.tick(secs(0)).unwrap(), TickOutcome::Acted { .. }));
        assert_eq!(ctl.pending_verifications(), 2);

        ctl.page_mut().pressed = None;
        assert_eq!(ctl.tick(secs(1)).unwrap(), TickOutcome::Hidden);
        assert_eq!(ctl.pending_verifications(), 2);
        assert_eq!(ctl.tick(secs(2)).unwrap(), TickOutcome::Hidden);
        assert_eq!(ctl.pending_verifications(), 1);
        assert_eq!(ctl.page().clicks, [Action::Dislike, Action::Dislike]);

        ctl.page_mut().pressed = None;
        ctl.tick(secs(5)).unwrap();
        assert_eq!(ctl.pending_verifications(), 0);
        assert_eq!(ctl.page().clicks.len(), 3);
    }

    /// Accepts everything except writes to the activity log
    struct NoLogStore(MemoryStore);

    impl SettingsStore for NoLogStore {
        fn get(&self, keys: &[&str]) -> store::Result<StoreMap> {
            self.0.get(keys)
        }
        fn get_all(&self) -> store::Result<StoreMap> {
            self.0.get_all()
        }
        fn set(&mut self, items: StoreMap) -> store::Result<Vec<String>> {
            if items.contains_key(keys::ACTIVITY_LOGS) {
                cloneable_errors::bail!("Storage quota exceeded");
            }
            self.0.set(items)
        }
        fn clear(&mut self) -> store::Result<()> {
            self.0.clear()
        }
    }

    #[test]
    fn test_failed_log_write_still_completes_the_action() {
        let mut page = FakePage::watching("vid1", "Foo");
        page.seek(3.);
        let store = NoLogStore(store(json!({ "actionUnlisted": "like" })));
        let mut ctl = Controller::with_rng(page, store, StdRng::seed_from_u64(3));

        assert!(matches!(ctl.tick(secs(0)).unwrap(), TickOutcome::Acted { action: Action::Like, .. }));
        assert!(ctl.state().unwrap().processed);
        assert_eq!(ctl.pending_verifications(), 2);

        assert_eq!(ctl.tick(secs(1)).unwrap(), TickOutcome::AlreadyProcessed);
        assert_eq!(ctl.page().clicks, [Action::Like]);
        assert!(ctl.store().read_settings().unwrap().activity_logs.is_none());
    }
}
