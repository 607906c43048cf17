//! Chat session orchestration.
//!
//! A [`ChatSession`] owns one append-only conversation log and allows at
//! most one request in flight. The lock around the log is only held for
//! bookkeeping and never across the remote call.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info, warn};
use marketmind_market_data::Instrument;
use serde::Serialize;

use crate::assistant::{RemoteAssistant, DEFAULT_REQUEST_TIMEOUT};
use crate::env::AiEnvironment;
use crate::error::AiError;
use crate::prompt::{context_block, suggested_questions};
use crate::types::{ChatTurn, RejectReason, SessionState, SubmitOutcome, WELCOME_MESSAGE};

// ============================================================================
// Chat Configuration
// ============================================================================

/// Configuration for a chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Most recent eligible turns replayed to the model.
    pub max_history_turns: usize,
    /// Upper bound on a single request, including the network round trip.
    pub request_timeout: Duration,
    /// Greeting appended when the session starts; `None` starts empty.
    pub welcome_message: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history_turns: 20,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            welcome_message: Some(WELCOME_MESSAGE.to_string()),
        }
    }
}

/// Read-only view of a session for presentation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub state: SessionState,
    pub turns: Vec<ChatTurn>,
    /// Empty once the user has sent a message.
    pub suggestions: Vec<String>,
}

#[derive(Default)]
struct SessionInner {
    turns: Vec<ChatTurn>,
    state: SessionState,
}

// ============================================================================
// Chat Session
// ============================================================================

/// A single conversation with the market assistant.
pub struct ChatSession<E: AiEnvironment> {
    env: Arc<E>,
    assistant: Arc<dyn RemoteAssistant>,
    config: ChatConfig,
    inner: Mutex<SessionInner>,
}

impl<E: AiEnvironment> ChatSession<E> {
    /// Create a session, opening with the configured welcome turn.
    pub fn new(env: Arc<E>, assistant: Arc<dyn RemoteAssistant>, config: ChatConfig) -> Self {
        let mut inner = SessionInner::default();
        if let Some(text) = config.welcome_message.as_deref() {
            inner.turns.push(ChatTurn::welcome(text, env.now()));
        }

        Self {
            env,
            assistant,
            config,
            inner: Mutex::new(inner),
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Submit a user message, optionally about the selected instrument.
    ///
    /// Empty text and submits made while another request is in flight are
    /// rejected without touching the log. Otherwise the user turn is
    /// appended immediately and exactly one assistant turn follows: the
    /// model's answer, or the fallback text marked as failed.
    pub async fn submit(&self, text: &str, selected: Option<&Instrument>) -> SubmitOutcome {
        let question = text.trim();
        if question.is_empty() {
            debug!("Ignoring empty chat message");
            return SubmitOutcome::Rejected {
                reason: RejectReason::Empty,
            };
        }

        let history = {
            let mut inner = self.lock();
            if inner.state == SessionState::Sending {
                debug!("Ignoring chat message while a request is in flight");
                return SubmitOutcome::Rejected {
                    reason: RejectReason::Busy,
                };
            }
            let history = eligible_history(&inner.turns, self.config.max_history_turns);
            inner.turns.push(ChatTurn::user(question, self.env.now()));
            inner.state = SessionState::Sending;
            history
        };

        let in_flight = InFlight {
            session: self,
            settled: false,
        };

        let context = selected.map(context_block);
        debug!(
            "Sending chat message with {} history turns (context: {})",
            history.len(),
            selected.map(|i| i.symbol()).unwrap_or("dashboard")
        );

        let result = match tokio::time::timeout(
            self.config.request_timeout,
            self.assistant.ask(question, &history, context.as_deref()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AiError::Timeout(
                self.config.request_timeout.as_millis() as u64,
            )),
        };

        let outcome = match result {
            Ok(reply) => SubmitOutcome::Answered {
                turn: ChatTurn::assistant(reply, self.env.now()),
            },
            Err(e) => {
                warn!("Chat request failed: {}", e);
                SubmitOutcome::Failed {
                    turn: ChatTurn::failed(self.env.now()),
                    code: e.code().to_string(),
                }
            }
        };

        if let Some(turn) = outcome.turn() {
            in_flight.settle(turn.clone());
        }
        outcome
    }

    /// Copy of the conversation log.
    pub fn turns(&self) -> Vec<ChatTurn> {
        self.lock().turns.clone()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn len(&self) -> usize {
        self.lock().turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().turns.is_empty()
    }

    /// Starter questions, offered until the user sends a first message.
    pub fn suggestions(&self, selected: Option<&Instrument>) -> Vec<String> {
        if self.lock().turns.iter().any(ChatTurn::is_user) {
            Vec::new()
        } else {
            suggested_questions(selected)
        }
    }

    pub fn snapshot(&self, selected: Option<&Instrument>) -> ChatSnapshot {
        let (state, turns) = {
            let inner = self.lock();
            (inner.state, inner.turns.clone())
        };
        let suggestions = if turns.iter().any(ChatTurn::is_user) {
            Vec::new()
        } else {
            suggested_questions(selected)
        };
        ChatSnapshot {
            state,
            turns,
            suggestions,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        // The log stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn finish(&self, turn: ChatTurn) {
        let mut inner = self.lock();
        inner.turns.push(turn);
        inner.state = SessionState::Idle;
    }
}

/// Returns the session to `Idle` with a failed turn if the submit future is
/// dropped before the reply lands.
struct InFlight<'a, E: AiEnvironment> {
    session: &'a ChatSession<E>,
    settled: bool,
}

impl<E: AiEnvironment> InFlight<'_, E> {
    fn settle(mut self, turn: ChatTurn) {
        self.settled = true;
        self.session.finish(turn);
    }
}

impl<E: AiEnvironment> Drop for InFlight<'_, E> {
    fn drop(&mut self) {
        if !self.settled {
            info!("Chat request cancelled before completion");
            self.session
                .finish(ChatTurn::failed(self.session.env.now()));
        }
    }
}

/// Last `max_turns` turns that are not failed replies.
fn eligible_history(turns: &[ChatTurn], max_turns: usize) -> Vec<ChatTurn> {
    let eligible: Vec<&ChatTurn> = turns.iter().filter(|t| !t.failed).collect();
    let skip = eligible.len().saturating_sub(max_turns);
    eligible.into_iter().skip(skip).cloned().collect()
}
