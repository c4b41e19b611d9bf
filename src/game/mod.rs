//! Game-facing types.
//!
//! Actions and observations as they appear on the wire, the pluggable bot
//! capability, and the built-in strategies. Nothing here takes part in the
//! commit-reveal protocol beyond being serializable.

pub mod action;
pub mod bot;
pub mod observation;
pub mod strategy;

pub use action::{Action, PlanetId, UpgradeKind};
pub use bot::{Bot, BotError};
pub use observation::{FleetView, Observation, PingView, PlanetView, ScoreView};
pub use strategy::Strategy;
