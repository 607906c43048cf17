//! MarketMind AI - market assistant chat over the Gemini API.
//!
//! This crate provides the conversational side of the MarketMind
//! dashboard: a single-flight chat session and the remote client that
//! answers questions with web-grounded citations.
//!
//! # Architecture
//!
//! - `chat`: Chat session with one request in flight, timeout and cancellation handling
//! - `assistant`: `RemoteAssistant` trait and the Gemini REST client
//! - `prompt`: System instruction, stock context block, history rendering, suggestions
//! - `types`: Turns, citations, replies and session outcomes shared with the server
//! - `env`: Environment abstraction for the API key and time
//!
//! # Example
//!
//! ```ignore
//! use marketmind_ai::{ChatConfig, ChatSession, GeminiAssistant, AssistantConfig, RuntimeEnvironment};
//!
//! let env = Arc::new(RuntimeEnvironment::from_env());
//! let assistant = Arc::new(GeminiAssistant::new(env.clone(), AssistantConfig::default()));
//! let session = ChatSession::new(env, assistant, ChatConfig::default());
//!
//! match session.submit("Is NVDA a good buy?", Some(&nvda)).await {
//!     SubmitOutcome::Answered { turn } => println!("{}", turn.text),
//!     SubmitOutcome::Failed { turn, .. } => println!("{}", turn.text),
//!     SubmitOutcome::Rejected { .. } => {}
//! }
//! ```

pub mod assistant;
pub mod chat;
pub mod env;
pub mod error;
pub mod prompt;
pub mod types;

// Re-export main types for convenience
pub use assistant::{
    AssistantConfig, GeminiAssistant, RemoteAssistant, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_TEMPERATURE,
};
pub use chat::{ChatConfig, ChatSession, ChatSnapshot};
pub use env::{AiEnvironment, EnvError, RuntimeEnvironment};
pub use error::AiError;
pub use prompt::{context_block, suggested_questions, system_instruction, user_prompt};
pub use types::{
    AssistantReply, ChatTurn, Citation, RejectReason, SessionState, Speaker, SubmitOutcome,
    EMPTY_REPLY, FALLBACK_REPLY, WELCOME_MESSAGE,
};
