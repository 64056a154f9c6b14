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
use std::time::Duration;

pub const APP_NAME: &str = "YouTube Interaction Manager";
pub const BACKUP_PREFIX: &str = "auto_like_backup";

// Timing

pub const CHECK_INTERVAL: Duration = Duration::from_secs(1);
pub const VERIFICATION_DELAYS: [Duration; 2] = [Duration::from_secs(2), Duration::from_secs(5)];

// Triggers (seconds)

pub const INSTANT_TRIGGER_THRESHOLD: f64 = 0.5;
pub const HUMANIZE_MIN_DELAY: u32 = 3;
pub const HUMANIZE_MAX_DELAY: u32 = 15;

// Activity log

pub const MAX_LOG_ENTRIES: usize = 10;
pub const LOG_TIME_FORMAT: &str = "%H:%M";

// Badge colours

pub const BADGE_LIKE_COLOR:    &str = "#00E676";
pub const BADGE_DISLIKE_COLOR: &str = "#FF5252";
pub const BADGE_NEUTRAL_COLOR: &str = "#666666";
