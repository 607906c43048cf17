//! Shared types for the market assistant.
//!
//! - Conversation types: Speaker, ChatTurn, Citation
//! - Remote reply: AssistantReply
//! - Session types: SessionState, SubmitOutcome, RejectReason

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Assistant text recorded when a request fails for any reason.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting to the market data server right now. Please try again.";

/// Assistant text used when the model answers with no text.
pub const EMPTY_REPLY: &str = "I currently cannot provide an analysis. Please try again.";

/// Greeting that opens every new session.
pub const WELCOME_MESSAGE: &str = "Hello! I'm MarketMind. I can analyze market trends and stock data for you. Ask me anything about investments or the stock shown.";

// ============================================================================
// Conversation Types
// ============================================================================

/// Who produced a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Label used when the turn is replayed to the model.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Assistant => "Assistant",
        }
    }
}

/// A web source the model grounded its answer on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub source_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Citation {
    /// Text to show for the link: the title, or the URI when untitled.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.source_uri)
    }
}

/// One message in a conversation log. Never modified once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub id: String,
    pub speaker: Speaker,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Set on the assistant turn recorded in place of a failed reply.
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            speaker: Speaker::User,
            text: text.into(),
            created_at,
            failed: false,
            citations: Vec::new(),
        }
    }

    pub fn assistant(reply: AssistantReply, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            speaker: Speaker::Assistant,
            text: reply.text,
            created_at,
            failed: false,
            citations: reply.citations,
        }
    }

    /// Assistant turn carrying the fixed fallback message.
    pub fn failed(created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            speaker: Speaker::Assistant,
            text: FALLBACK_REPLY.to_string(),
            created_at,
            failed: true,
            citations: Vec::new(),
        }
    }

    pub fn welcome(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::assistant(AssistantReply::text(text), created_at)
    }

    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }
}

// ============================================================================
// Remote Reply
// ============================================================================

/// Normalized answer from the remote model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl AssistantReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// Whether a session is waiting on the remote model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Idle,
    Sending,
}

/// Why a submit was dropped without touching the log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    /// Text was empty or whitespace.
    Empty,
    /// Another request is already in flight.
    Busy,
}

/// Result of submitting a message to a session.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmitOutcome {
    Rejected { reason: RejectReason },
    /// The model answered; carries the new assistant turn.
    Answered { turn: ChatTurn },
    /// The request failed; carries the fallback turn and the error code.
    Failed { turn: ChatTurn, code: String },
}

impl SubmitOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, SubmitOutcome::Rejected { .. })
    }

    /// The assistant turn appended by this submit, if any.
    pub fn turn(&self) -> Option<&ChatTurn> {
        match self {
            SubmitOutcome::Rejected { .. } => None,
            SubmitOutcome::Answered { turn } | SubmitOutcome::Failed { turn, .. } => Some(turn),
        }
    }
}
