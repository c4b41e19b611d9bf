//! Bot Decision Capability
//!
//! The protocol core never decides anything itself: each bot process plugs
//! in one [`Bot`] that turns an observation into an ordered action list.

use super::action::Action;
use super::observation::Observation;

/// Errors raised by a bot's decision function.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BotError {
    /// The bot reported a failure.
    #[error("decision failed: {0}")]
    Failed(String),

    /// The bot panicked while deciding.
    #[error("decision panicked: {0}")]
    Panicked(String),
}

/// A pluggable decision function.
///
/// Implementations must terminate and should be deterministic in the
/// observation. They are called synchronously from the transport loop.
pub trait Bot: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Choose this tick's actions, in execution order.
    fn decide(&self, observation: &Observation) -> Result<Vec<Action>, BotError>;
}

impl<F> Bot for F
where
    F: Fn(&Observation) -> Result<Vec<Action>, BotError> + Send + Sync,
{
    fn decide(&self, observation: &Observation) -> Result<Vec<Action>, BotError> {
        self(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_bot() {
        let bot = |obs: &Observation| -> Result<Vec<Action>, BotError> {
            Ok(vec![Action::Scan { x: obs.tick as f64, y: 0.0, radius: 0.1 }])
        };
        let obs = Observation { tick: 3, ..Default::default() };

        assert_eq!(bot.name(), "custom");
        assert_eq!(
            bot.decide(&obs).unwrap(),
            vec![Action::Scan { x: 3.0, y: 0.0, radius: 0.1 }]
        );
    }

    #[test]
    fn test_bot_error_display() {
        let err = BotError::Failed("no planets".to_string());
        assert_eq!(err.to_string(), "decision failed: no planets");
    }
}
