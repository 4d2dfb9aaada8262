use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use bastion_core::Catalog;
use bastion_world::WorldConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_RNG_SEED: u64 = 0x4241_5354_494f_4e21;
const MIN_GRID_EXTENT: u32 = 3;

/// Everything a session needs at construction: map shape, economy, seed and
/// the stat catalog.
///
/// Every field falls back to its default when missing, so a TOML file only
/// has to name what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a square tile in pixels.
    pub tile_length: f32,
    /// Gold available before the first purchase.
    pub starting_gold: u32,
    /// Seed of the spawner's generator.
    pub rng_seed: u64,
    /// Stats of every defense, enemy and projectile kind.
    pub catalog: Catalog,
}

impl Default for GameConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            columns: world.columns,
            rows: world.rows,
            tile_length: world.tile_length,
            starting_gold: world.starting_gold,
            rng_seed: DEFAULT_RNG_SEED,
            catalog: world.catalog,
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse game config toml contents")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read game config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid game config {}", path.display()))
    }

    /// World parameters derived from this configuration.
    #[must_use]
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            columns: self.columns,
            rows: self.rows,
            tile_length: self.tile_length,
            starting_gold: self.starting_gold,
            catalog: self.catalog.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.columns < MIN_GRID_EXTENT || self.rows < MIN_GRID_EXTENT {
            bail!(
                "grid must be at least {MIN_GRID_EXTENT}x{MIN_GRID_EXTENT} tiles, got {}x{}",
                self.columns,
                self.rows
            );
        }
        if !(self.tile_length.is_finite() && self.tile_length > 0.0) {
            bail!("tile length must be positive, got {}", self.tile_length);
        }
        self.catalog
            .validate()
            .context("stat catalog cannot drive the simulation")?;
        let main = &self.catalog.main_tower;
        if main.width > self.columns / 2 + self.columns % 2
            || main.height > self.rows / 2 + self.rows % 2
        {
            bail!(
                "main tower footprint {}x{} does not fit a {}x{} grid",
                main.width,
                main.height,
                self.columns,
                self.rows
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = GameConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            columns = 30
            starting_gold = 250
            rng_seed = 9

            [catalog.tuning]
            enemy_radius = 12.0
            "#,
        )
        .expect("config parses");

        assert_eq!(config.columns, 30);
        assert_eq!(config.rows, 15);
        assert_eq!(config.starting_gold, 250);
        assert_eq!(config.rng_seed, 9);
        assert!((config.catalog.tuning.enemy_radius - 12.0).abs() < f32::EPSILON);
        assert_eq!(config.catalog.tuning.destroy_duration_ms, 800);
        assert_eq!(config.catalog.wall, Catalog::default().wall);
    }

    #[test]
    fn unschedulable_attack_rates_are_rejected() {
        let error = GameConfig::from_toml_str(
            r#"
            [catalog.zombie]
            health = 100.0
            speed = 40.0
            damage = 10
            gold = 10
            attack_rate = 1e-30
            "#,
        )
        .expect_err("attack rate too slow to schedule");

        let message = format!("{error:#}");
        assert!(message.contains("stat catalog"), "{message}");
        assert!(message.contains("zombie.attack_rate"), "{message}");
    }

    #[test]
    fn negative_tower_ranges_are_rejected() {
        let mut config = GameConfig::default();
        if let Some(tower) = config.catalog.cannon.tower.as_mut() {
            tower.range = -4.0;
        }

        assert!(config.validate().is_err());
    }

    #[test]
    fn tiny_grids_are_rejected() {
        let error = GameConfig::from_toml_str("columns = 2").expect_err("grid too small");
        assert!(error.to_string().contains("at least"));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(GameConfig::from_toml_str("columns = \"wide\"").is_err());
    }

    #[test]
    fn non_positive_tile_length_is_rejected() {
        assert!(GameConfig::from_toml_str("tile_length = 0.0").is_err());
    }
}
