use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::board::{BOARD_COLUMNS, BOARD_ROWS};
use crate::piece::RotationCycle;
use crate::shapes::{piece_count, shape_of};

pub const CONFIG_ENV_VAR: &str = "BLOCKFALL_CONFIG";

// Timing (in milliseconds)
pub const INITIAL_SPEED_MS: u64 = 500;
pub const MIN_SPEED_MS: u64 = 100;
pub const SPEED_STEP_MS: u64 = 50;

// Scoring
pub const SPEED_UP_SCORE: u32 = 1000;
pub const LINE_BONUS: u32 = 100;

/// Rules of one game session. Missing fields in a config file take their default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub columns: usize,
    pub rows: usize,
    pub initial_speed_ms: u64,
    pub min_speed_ms: u64,
    pub speed_step_ms: u64,
    pub speed_up_score: u32,
    pub line_bonus: u32,
    /// Reject rotations that would collide instead of committing them blindly.
    pub rotation_validated: bool,
    pub rotation_cycle: RotationCycle,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: BOARD_COLUMNS,
            rows: BOARD_ROWS,
            initial_speed_ms: INITIAL_SPEED_MS,
            min_speed_ms: MIN_SPEED_MS,
            speed_step_ms: SPEED_STEP_MS,
            speed_up_score: SPEED_UP_SCORE,
            line_bonus: LINE_BONUS,
            rotation_validated: false,
            rotation_cycle: RotationCycle::Three,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            bail!("board must be at least 1x1, got {}x{}", self.columns, self.rows);
        }
        let widest = (0..piece_count())
            .map(|i| shape_of(i).width())
            .max()
            .unwrap_or(0);
        if self.columns < widest {
            bail!(
                "board is {} columns wide but the widest piece needs {}",
                self.columns,
                widest
            );
        }
        let tallest = (0..piece_count())
            .map(|i| shape_of(i).height())
            .max()
            .unwrap_or(0);
        if self.rows < tallest {
            bail!(
                "board is {} rows tall but the tallest piece needs {}",
                self.rows,
                tallest
            );
        }
        if self.min_speed_ms == 0 {
            bail!("min_speed_ms must be positive");
        }
        if self.min_speed_ms > self.initial_speed_ms {
            bail!(
                "min_speed_ms ({}) exceeds initial_speed_ms ({})",
                self.min_speed_ms,
                self.initial_speed_ms
            );
        }
        Ok(())
    }
}

/// Location of the JSON config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("blockfall");
        path.push("config.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file means defaults; anything unreadable or invalid is an error.
    pub fn load(&self) -> Result<GameConfig> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(GameConfig::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let config: GameConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config in {}", self.path.display()))?;
        Ok(config)
    }

    pub fn save(&self, config: &GameConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let text = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, text).with_context(|| format!("writing {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: GameConfig = serde_json::from_str(r#"{"columns":12,"rotation_cycle":"four"}"#)
            .expect("config JSON should parse");
        assert_eq!(parsed.columns, 12);
        assert_eq!(parsed.rows, BOARD_ROWS);
        assert_eq!(parsed.rotation_cycle, RotationCycle::Four);
        assert_eq!(parsed.initial_speed_ms, INITIAL_SPEED_MS);
        assert!(!parsed.rotation_validated);
    }

    #[test]
    fn narrow_board_is_rejected() {
        let config = GameConfig {
            columns: 3,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn board_shorter_than_a_piece_is_rejected() {
        let one_row = GameConfig {
            rows: 1,
            ..GameConfig::default()
        };
        assert!(one_row.validate().is_err());

        let two_rows = GameConfig {
            rows: 2,
            ..GameConfig::default()
        };
        assert!(two_rows.validate().is_ok());
    }

    #[test]
    fn speed_floor_above_start_is_rejected() {
        let config = GameConfig {
            min_speed_ms: 600,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let zero = GameConfig {
            min_speed_ms: 0,
            ..GameConfig::default()
        };
        assert!(zero.validate().is_err());
    }
}
