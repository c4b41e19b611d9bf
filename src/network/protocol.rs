//! Protocol Messages
//!
//! Wire format between the match server and a bot. Every transport carries
//! the same JSON payloads:
//!
//! ```text
//! -> {"type":"commit","tick":7,"observation":{...}}
//! <- {"type":"commit","tick":7,"commit":"<64 hex>"}
//! -> {"type":"reveal","tick":7}
//! <- {"type":"reveal","tick":7,"actions":[...],"nonce":"<16 hex>"}
//! ```
//!
//! The request/response transport names the phase `phase` instead of
//! `type`; both spellings are accepted everywhere.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::game::action::Action;
use crate::game::bot::BotError;
use crate::game::observation::Observation;
use crate::proof::pending::Tick;

// =============================================================================
// SERVER -> BOT MESSAGES
// =============================================================================

/// Messages sent from the match server to a bot.
#[derive(Debug, Clone, PartialEq)]
pub enum BotRequest {
    /// Decide and commit for a tick.
    Commit(CommitRequest),

    /// Reveal a previous commitment.
    Reveal(RevealRequest),
}

/// Commit phase request.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    /// Tick being decided.
    pub tick: Tick,
    /// What the player can see.
    pub observation: Observation,
}

/// Reveal phase request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealRequest {
    /// Tick whose commitment should be opened.
    pub tick: Tick,
}

impl BotRequest {
    /// Tick the request refers to.
    pub fn tick(&self) -> Tick {
        match self {
            BotRequest::Commit(req) => req.tick,
            BotRequest::Reveal(req) => req.tick,
        }
    }

    /// Parse a request from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;
        Self::from_value(value)
    }

    /// Parse a request from an already decoded JSON value.
    ///
    /// A missing `tick` means tick 0 and a missing or null `observation`
    /// means an empty observation.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let Value::Object(mut map) = value else {
            return Err(ProtocolError::InvalidRequest("request must be a JSON object".to_string()));
        };

        let phase = ["type", "phase"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|v| !v.is_null())
            .cloned();
        let phase = match phase {
            Some(Value::String(phase)) => phase,
            Some(other) => return Err(ProtocolError::UnknownPhase(Some(other.to_string()))),
            None => return Err(ProtocolError::UnknownPhase(None)),
        };

        match phase.as_str() {
            "commit" => {
                let tick = parse_tick(map.get("tick"))?;
                let observation = match map.remove("observation") {
                    None | Some(Value::Null) => Observation::default(),
                    Some(raw) => serde_json::from_value(raw).map_err(|e| {
                        ProtocolError::InvalidRequest(format!("invalid observation: {e}"))
                    })?,
                };
                Ok(BotRequest::Commit(CommitRequest { tick, observation }))
            }
            "reveal" => {
                let tick = parse_tick(map.get("tick"))?;
                Ok(BotRequest::Reveal(RevealRequest { tick }))
            }
            _ => Err(ProtocolError::UnknownPhase(Some(phase))),
        }
    }

    /// Encode as a stream message (`type` field).
    pub fn to_value(&self) -> Value {
        match self {
            BotRequest::Commit(req) => json!({
                "type": "commit",
                "tick": req.tick,
                "observation": req.observation,
            }),
            BotRequest::Reveal(req) => json!({"type": "reveal", "tick": req.tick}),
        }
    }
}

fn parse_tick(raw: Option<&Value>) -> Result<Tick, ProtocolError> {
    match raw {
        None | Some(Value::Null) => Ok(0),
        Some(value) => value.as_u64().ok_or_else(|| {
            ProtocolError::InvalidRequest(format!("tick must be a non-negative integer, got {value}"))
        }),
    }
}

// =============================================================================
// BOT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from a bot back to the match server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotResponse {
    /// Commitment digest for a tick.
    Commit(CommitResponse),

    /// Opened commitment.
    Reveal(RevealResponse),

    /// Request-level failure.
    Error(ErrorResponse),
}

/// Commit phase response. Discloses nothing but the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    /// Tick committed to.
    pub tick: Tick,
    /// Lowercase hex SHA-256 digest.
    pub commit: String,
}

/// Reveal phase response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealResponse {
    /// Tick revealed.
    pub tick: Tick,
    /// Committed actions, in execution order.
    pub actions: Vec<Action>,
    /// Nonce used in the commitment.
    pub nonce: String,
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code.
    pub error: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Tick the failure relates to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<Tick>,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Body was not valid JSON.
    InvalidJson,
    /// JSON did not have the request shape.
    InvalidRequest,
    /// Phase/type was neither `commit` nor `reveal`.
    UnknownPhase,
    /// The bot's decision function failed.
    BotFailed,
    /// Reveal for a tick with no commitment (strict policy only).
    UnknownTick,
    /// Internal error.
    InternalError,
}

impl BotResponse {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Reply for a message whose bytes are not UTF-8.
    pub fn not_utf8() -> Self {
        BotResponse::Error(ErrorResponse {
            error: ErrorCode::InvalidJson,
            message: "message is not valid UTF-8".to_string(),
            tick: None,
        })
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Protocol errors. All of them are reported to the peer; none ends a
/// transport loop.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Body was not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Body was JSON but not a valid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Phase missing or unrecognized.
    #[error("unknown phase: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnknownPhase(Option<String>),

    /// Bot decision failed; nothing was committed.
    #[error("bot failed at tick {tick}: {source}")]
    BotFailed {
        /// Tick being decided.
        tick: Tick,
        /// Underlying failure.
        #[source]
        source: BotError,
    },

    /// Reveal without a commitment under the strict policy.
    #[error("no commitment pending for tick {0}")]
    UnknownTick(Tick),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProtocolError {
    /// Wire code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidJson(_) => ErrorCode::InvalidJson,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::UnknownPhase(_) => ErrorCode::UnknownPhase,
            Self::BotFailed { .. } => ErrorCode::BotFailed,
            Self::UnknownTick(_) => ErrorCode::UnknownTick,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Tick the error relates to, when known.
    pub fn tick(&self) -> Option<Tick> {
        match self {
            Self::BotFailed { tick, .. } | Self::UnknownTick(tick) => Some(*tick),
            _ => None,
        }
    }

    /// Build the error payload sent to the peer.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            tick: self.tick(),
        }
    }
}
