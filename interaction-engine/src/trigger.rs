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

use log::debug;
use rand::Rng;

use crate::{
    constants::{HUMANIZE_MAX_DELAY, HUMANIZE_MIN_DELAY, INSTANT_TRIGGER_THRESHOLD},
    types::{TriggerSettings, TriggerType},
};

/// Per-video evaluation state
///
/// Lives for one viewing session of one video. The owner must call [`VideoTriggerState::reset`]
/// exactly when the detected video id changes, and [`VideoTriggerState::invalidate`] when a
/// relevant setting changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoTriggerState {
    pub video_id: Arc<str>,
    /// Set by the action layer once the video has been handled
    pub processed: bool,
    pub random_delay_seconds: u32,
    pub delay_computed: bool,
}

impl VideoTriggerState {
    pub fn new(video_id: Arc<str>) -> Self {
        Self {
            video_id,
            processed: false,
            random_delay_seconds: 0,
            delay_computed: false,
        }
    }

    pub fn reset(&mut self, video_id: Arc<str>) {
        *self = Self::new(video_id);
    }

    /// Forces the next evaluation to run again with fresh settings
    pub fn invalidate(&mut self) {
        self.processed = false;
        self.delay_computed = false;
    }
}

/// Draws a humanize delay, in whole seconds
pub fn humanize_delay<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.random_range(HUMANIZE_MIN_DELAY..=HUMANIZE_MAX_DELAY)
}

/// Fills in the humanize delay of `state`, at most once per video
pub fn prepare_delay<R: Rng + ?Sized>(state: &mut VideoTriggerState, humanize_enabled: bool, rng: &mut R) {
    if !humanize_enabled {
        state.random_delay_seconds = 0;
        state.delay_computed = true;
    } else if !state.delay_computed {
        state.random_delay_seconds = humanize_delay(rng);
        state.delay_computed = true;
        debug!("Humanize delay for {}: +{}s", state.video_id, state.random_delay_seconds);
    }
}

/// Whether playback of the current video reached the configured interaction point
///
/// `duration_seconds` may be NaN or infinite, in which case percent triggers never fire.
/// Unrecognized trigger types never fire either.
pub fn should_trigger<R: Rng + ?Sized>(
    current_time_seconds: f64,
    duration_seconds: f64,
    settings: &TriggerSettings,
    state: &mut VideoTriggerState,
    rng: &mut R,
) -> bool {
    prepare_delay(state, settings.humanize_enabled, rng);
    let delay = f64::from(state.random_delay_seconds);

    match settings.trigger_type {
        TriggerType::Instant => current_time_seconds > INSTANT_TRIGGER_THRESHOLD,
        TriggerType::Percent => {
            if !duration_seconds.is_finite() || duration_seconds <= 0. {
                return false;
            }
            let target = duration_seconds * (settings.percent / 100.) + delay;
            current_time_seconds > target
        },
        TriggerType::Time => current_time_seconds > settings.seconds + delay,
        TriggerType::Unrecognized => false,
    }
}
