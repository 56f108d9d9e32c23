//! Optional TOML overrides for the match options.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::Options;

/// Fully resolved settings for one match run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MatchSettings {
    /// Rendered frames to simulate.
    pub(crate) frames: u32,
    /// Seed for the deterministic match RNG.
    pub(crate) seed: u64,
    /// Difficulty wave applied to scripted opponents.
    pub(crate) wave: u32,
    /// Number of scripted opponents.
    pub(crate) npcs: u32,
    /// Arena map file, if any.
    pub(crate) map: Option<PathBuf>,
}

/// Values a TOML file may override; absent keys keep the CLI value.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileOverrides {
    frames: Option<u32>,
    seed: Option<u64>,
    wave: Option<u32>,
    npcs: Option<u32>,
    map: Option<PathBuf>,
}

impl MatchSettings {
    /// Resolves the effective settings: command-line values first, then the
    /// config file's overrides on top.
    pub(crate) fn resolve(options: &Options) -> Result<Self> {
        let mut settings = Self {
            frames: options.frames,
            seed: options.seed,
            wave: options.wave,
            npcs: options.npcs,
            map: options.map.clone(),
        };

        if let Some(path) = &options.config {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            let overrides: FileOverrides = toml::from_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?;
            settings.apply(overrides);
        }

        Ok(settings)
    }

    fn apply(&mut self, overrides: FileOverrides) {
        if let Some(frames) = overrides.frames {
            self.frames = frames;
        }
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        if let Some(wave) = overrides.wave {
            self.wave = wave;
        }
        if let Some(npcs) = overrides.npcs {
            self.npcs = npcs;
        }
        if let Some(map) = overrides.map {
            self.map = Some(map);
        }
    }
}
