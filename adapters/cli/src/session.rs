use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tilecrawl_core::{ActorProfile, Position};
use tilecrawl_simulation::{Placement, SimulationConfig};

/// Everything a run needs besides the level itself.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Session {
    pub(crate) simulation: SimulationConfig,
    pub(crate) player: PlayerEntry,
    pub(crate) enemies: Vec<EnemyEntry>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerEntry {
    pub(crate) name: String,
    pub(crate) level: f64,
    pub(crate) x: Option<i32>,
    pub(crate) y: Option<i32>,
}

impl Default for PlayerEntry {
    fn default() -> Self {
        Self {
            name: "hero".to_owned(),
            level: 1.0,
            x: None,
            y: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EnemyEntry {
    pub(crate) name: String,
    pub(crate) level: f64,
}

impl Session {
    /// Reads the session file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session file at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid session file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let session: Self =
            toml::from_str(contents).context("failed to parse session toml contents")?;
        session.validate()?;
        Ok(session)
    }

    fn validate(&self) -> Result<()> {
        let levels = std::iter::once(("player", &self.player.name, self.player.level)).chain(
            self.enemies
                .iter()
                .map(|enemy| ("enemy", &enemy.name, enemy.level)),
        );
        for (role, name, level) in levels {
            if !level.is_finite() || level < 0.0 {
                bail!("{role} `{name}` has invalid level {level}");
            }
        }
        if self.player.x.is_some() != self.player.y.is_some() {
            bail!("player position needs both `x` and `y`");
        }
        Ok(())
    }

    pub(crate) fn player_profile(&self) -> ActorProfile {
        ActorProfile::new(self.player.name.clone(), self.player.level)
    }

    pub(crate) fn enemy_profiles(&self) -> Vec<ActorProfile> {
        self.enemies
            .iter()
            .map(|enemy| ActorProfile::new(enemy.name.clone(), enemy.level))
            .collect()
    }

    pub(crate) fn placement(&self) -> Placement {
        match (self.player.x, self.player.y) {
            (Some(x), Some(y)) => Placement::Fixed(Position::new(x, y)),
            _ => Placement::Random,
        }
    }
}
