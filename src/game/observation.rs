//! Player Observation
//!
//! What the match server shows one player at the start of a tick. The
//! protocol passes it through untouched; strategies read it.
//!
//! Every field defaults when absent so partial observations still parse.
//! Keys without a typed field are kept in `extra`, so a bot still sees the
//! whole object the server sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::action::PlanetId;

/// Default action budget when the server omits `max_actions`.
pub const DEFAULT_MAX_ACTIONS: usize = 5;

/// Fog-of-war view of the match for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Observation {
    /// Tick this observation was taken at.
    pub tick: u64,
    /// Observing player (None for spectator views).
    pub player_id: Option<u64>,
    /// Visible or remembered planets.
    pub planets: Vec<PlanetView>,
    /// Visible fleets.
    pub fleets: Vec<FleetView>,
    /// Scan pings detected this tick.
    pub pings: Vec<PingView>,
    /// Public scoreboard.
    pub scores: Vec<ScoreView>,
    /// Maximum actions accepted for this tick.
    pub max_actions: usize,
    /// Match length in ticks.
    pub match_ticks: u64,
    /// Wall-clock tick length in milliseconds.
    pub tick_ms: u64,
    /// Any other keys, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            tick: 0,
            player_id: None,
            planets: Vec::new(),
            fleets: Vec::new(),
            pings: Vec::new(),
            scores: Vec::new(),
            max_actions: DEFAULT_MAX_ACTIONS,
            match_ticks: 0,
            tick_ms: 0,
            extra: Map::new(),
        }
    }
}

impl Observation {
    /// Planets owned by the observing player.
    pub fn owned_planets(&self) -> Vec<&PlanetView> {
        self.planets.iter().filter(|p| p.owner == self.player_id).collect()
    }

    /// Planets nobody owns.
    pub fn neutral_planets(&self) -> Vec<&PlanetView> {
        self.planets.iter().filter(|p| p.owner.is_none()).collect()
    }

    /// Planets owned by another player.
    pub fn enemy_planets(&self) -> Vec<&PlanetView> {
        self.planets
            .iter()
            .filter(|p| p.owner.is_some() && p.owner != self.player_id)
            .collect()
    }

    /// Planets not owned by the observing player (neutral or enemy).
    pub fn foreign_planets(&self) -> Vec<&PlanetView> {
        self.planets.iter().filter(|p| p.owner != self.player_id).collect()
    }
}

/// A planet as seen (or last seen) by the player.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetView {
    pub id: PlanetId,
    pub x: f64,
    pub y: f64,
    pub level: u32,
    pub energy: f64,
    pub energy_cap: f64,
    pub energy_growth: f64,
    pub silver: f64,
    pub silver_cap: f64,
    pub silver_growth: f64,
    pub defense: f64,
    pub speed: f64,
    pub sensor_range: f64,
    pub owner: Option<u64>,
    pub is_artifact: bool,
    /// `owned`, `visible` or `stale`.
    pub visibility: String,
    pub last_seen_tick: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanetView {
    /// Squared distance to another planet.
    pub fn distance_sq(&self, other: &PlanetView) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// A fleet in flight.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetView {
    pub id: u64,
    pub owner: u64,
    pub source_id: PlanetId,
    pub dest_id: PlanetId,
    pub energy: f64,
    pub ticks_remaining: u32,
    pub total_ticks: u32,
    pub x: f64,
    pub y: f64,
}

/// A detected scan ping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PingView {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub strength: f64,
    pub source_player: u64,
    pub tick: u64,
}

/// One scoreboard row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreView {
    pub id: u64,
    pub name: String,
    pub score: f64,
    pub territory_score: f64,
    pub artifact_score: f64,
    pub artifacts_held: u32,
}
