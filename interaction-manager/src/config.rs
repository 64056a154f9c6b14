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
use std::{fs::File, io::{self, Read, Write}, path::{Path, PathBuf}};

use cloneable_errors::{ErrorContext, ResContext};
use interaction_engine::page::SelectorConfig;
use log::info;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH: &str = "interaction-manager.toml";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// JSON file holding the settings store
    pub store_path: PathBuf,
    /// Where `export` puts backups when no output path is given
    pub backup_dir: PathBuf,
    pub selectors: SelectorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("./settings.json"),
            backup_dir: PathBuf::from("./backups"),
            selectors: SelectorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the config at `path`, writing out the defaults if it doesn't exist
    pub fn load_or_create(path: &Path) -> Result<AppConfig, ErrorContext> {
        match File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents).with_context(|| format!("Failed to read {}", path.display()))?;
                toml::from_str(&contents).with_context(|| format!("Failed to deserialize contents of {}", path.display()))
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let cfg = AppConfig::default();
                let serialized = toml::to_string(&cfg).context("Failed to serialize default AppConfig as TOML")?;
                let mut file = File::options()
                    .write(true)
                    .create_new(true)
                    .open(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write!(file, "{serialized}").with_context(|| format!("Failed to write serialized default AppConfig to {}", path.display()))?;
                info!("Wrote default config to {}", path.display());
                Ok(cfg)
            },
            Err(e) => Err(e).with_context(|| format!("Failed to open {}", path.display())),
        }
    }
}
