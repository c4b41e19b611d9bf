//! Built-in Strategies
//!
//! Reference bots shipped with the runtime. They are interchangeable
//! [`Bot`] implementations selected at startup; none of them is part of the
//! commit-reveal protocol.
//!
//! Ties between equally good planets go to the one listed first in the
//! observation.

use std::fmt;

use super::action::{Action, UpgradeKind};
use super::bot::{Bot, BotError};
use super::observation::{Observation, PlanetView};
use crate::core::rng::DeterministicRng;

/// Built-in bot strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Grab nearby neutral planets, grow energy at home.
    Expansion,
    /// Seeded random play.
    Random,
    /// Throw the strongest planet at the nearest enemy.
    Rush,
    /// Fortify and scan, expand only with spare energy.
    Turtle,
}

impl Strategy {
    /// Name used on the command line and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Expansion => "expansion",
            Strategy::Random => "random",
            Strategy::Rush => "rush",
            Strategy::Turtle => "turtle",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Bot for Strategy {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn decide(&self, observation: &Observation) -> Result<Vec<Action>, BotError> {
        let mut actions = match self {
            Strategy::Expansion => expansion(observation),
            Strategy::Random => random(observation),
            Strategy::Rush => rush(observation),
            Strategy::Turtle => turtle(observation),
        };
        actions.truncate(observation.max_actions);
        Ok(actions)
    }
}

fn expansion(obs: &Observation) -> Vec<Action> {
    let owned = obs.owned_planets();
    if owned.is_empty() {
        return Vec::new();
    }
    let neutrals = obs.neutral_planets();
    let mut actions = Vec::new();

    let mut by_energy = owned.clone();
    by_energy.sort_by(|a, b| b.energy.total_cmp(&a.energy));

    for source in by_energy {
        if actions.len() >= obs.max_actions {
            break;
        }
        if source.energy < source.energy_cap * 0.5 {
            continue;
        }
        let Some(target) = nearest(&neutrals, source) else {
            break;
        };
        actions.push(Action::SendFleet {
            from_id: source.id,
            to_id: target.id,
            energy: f64::max(8.0, source.energy * 0.35),
        });
    }

    if actions.len() < obs.max_actions {
        if let Some(home) = first_max_by(&owned, |p| p.energy_cap) {
            actions.push(Action::Upgrade { planet_id: home.id, upgrade: UpgradeKind::Energy });
        }
    }
    actions
}

fn random(obs: &Observation) -> Vec<Action> {
    let owned = obs.owned_planets();
    if owned.is_empty() {
        return Vec::new();
    }
    let mut rng = DeterministicRng::for_tick(obs.player_id, obs.tick);
    let mut actions = Vec::new();

    if rng.chance(0.4) {
        if let Some(source) = rng.choose(&owned) {
            actions.push(Action::Scan {
                x: source.x,
                y: source.y,
                radius: rng.uniform(0.2, 0.4),
            });
        }
    }

    let targets = obs.foreign_planets();
    if !targets.is_empty() {
        let source = rng.choose(&owned);
        let target = rng.choose(&targets);
        if let (Some(source), Some(target)) = (source, target) {
            actions.push(Action::SendFleet {
                from_id: source.id,
                to_id: target.id,
                energy: f64::max(5.0, source.energy * 0.3),
            });
        }
    }

    if rng.chance(0.3) {
        let source = rng.choose(&owned);
        let upgrade = rng.choose(&UpgradeKind::ALL).copied();
        if let (Some(source), Some(upgrade)) = (source, upgrade) {
            actions.push(Action::Upgrade { planet_id: source.id, upgrade });
        }
    }

    actions
}

fn rush(obs: &Observation) -> Vec<Action> {
    let owned = obs.owned_planets();
    let Some(source) = first_max_by(&owned, |p| p.energy) else {
        return Vec::new();
    };

    let enemies = obs.enemy_planets();
    let pool = if enemies.is_empty() { obs.neutral_planets() } else { enemies };
    let Some(target) = nearest(&pool, source) else {
        return Vec::new();
    };

    vec![Action::SendFleet {
        from_id: source.id,
        to_id: target.id,
        energy: f64::max(10.0, source.energy * 0.6),
    }]
}

fn turtle(obs: &Observation) -> Vec<Action> {
    let owned = obs.owned_planets();
    let Some(home) = first_max_by(&owned, |p| p.energy_cap) else {
        return Vec::new();
    };

    let mut actions = vec![
        Action::Upgrade { planet_id: home.id, upgrade: UpgradeKind::Defense },
        Action::Upgrade { planet_id: home.id, upgrade: UpgradeKind::Sensor },
    ];

    if actions.len() < obs.max_actions {
        actions.push(Action::Scan { x: home.x, y: home.y, radius: 0.35 });
    }

    if home.energy > home.energy_cap * 0.7 {
        if let Some(target) = nearest(&obs.neutral_planets(), home) {
            actions.push(Action::SendFleet {
                from_id: home.id,
                to_id: target.id,
                energy: home.energy * 0.25,
            });
        }
    }
    actions
}

/// First planet with the largest key.
fn first_max_by<'a>(
    planets: &[&'a PlanetView],
    key: impl Fn(&PlanetView) -> f64,
) -> Option<&'a PlanetView> {
    let mut best: Option<&'a PlanetView> = None;
    for &planet in planets {
        match best {
            Some(current) if key(planet) <= key(current) => {}
            _ => best = Some(planet),
        }
    }
    best
}

/// First planet closest to `from`.
fn nearest<'a>(candidates: &[&'a PlanetView], from: &PlanetView) -> Option<&'a PlanetView> {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| a.distance_sq(from).total_cmp(&b.distance_sq(from)))
}

// =============================================================================
// TESTS
// =============================================================================
