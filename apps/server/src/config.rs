use std::{net::SocketAddr, str::FromStr, time::Duration};

use marketmind_ai::{AssistantConfig, ChatConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use marketmind_market_data::constants::{
    DEFAULT_HISTORY_LEN, DEFAULT_INTERVAL_MINUTES, DEFAULT_SELECTION_PROBABILITY,
    DEFAULT_TICK_INTERVAL_MS,
};
use marketmind_market_data::SimulatorConfig;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 90_000;
const DEFAULT_AI_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_AI_MAX_HISTORY_TURNS: usize = 20;
const DEFAULT_SYMBOL: &str = "AAPL";

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    /// HTTP layer timeout; longer than the assistant timeout so chat
    /// requests finish with a recorded failure instead of a 408.
    pub request_timeout: Duration,
    pub tick_interval: Duration,
    pub default_symbol: String,
    pub simulator: SimulatorConfig,
    pub assistant: AssistantConfig,
    pub chat: ChatConfig,
}

impl Default for Config {
    fn default() -> Self {
        let ai_timeout = Duration::from_millis(DEFAULT_AI_TIMEOUT_MS);
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            default_symbol: DEFAULT_SYMBOL.to_string(),
            simulator: SimulatorConfig::default(),
            assistant: AssistantConfig {
                timeout: ai_timeout,
                ..AssistantConfig::default()
            },
            chat: ChatConfig {
                max_history_turns: DEFAULT_AI_MAX_HISTORY_TURNS,
                request_timeout: ai_timeout,
                ..ChatConfig::default()
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let listen_addr: SocketAddr = env_or("MM_LISTEN_ADDR", Self::default().listen_addr);
        let cors_allow = std::env::var("MM_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms = env_nonzero("MM_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS);
        let tick_ms = env_nonzero("MM_TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL_MS);
        let ai_timeout_ms = env_nonzero("MM_AI_TIMEOUT_MS", DEFAULT_AI_TIMEOUT_MS);
        let ai_timeout = Duration::from_millis(ai_timeout_ms);

        let simulator = SimulatorConfig {
            history_len: env_or("MM_HISTORY_LEN", DEFAULT_HISTORY_LEN),
            interval_minutes: env_or("MM_INTERVAL_MINUTES", DEFAULT_INTERVAL_MINUTES),
            selection_probability: env_or(
                "MM_SELECTION_PROBABILITY",
                DEFAULT_SELECTION_PROBABILITY,
            ),
            ..SimulatorConfig::default()
        };

        let assistant = AssistantConfig {
            model: std::env::var("MM_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            base_url: std::env::var("MM_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            timeout: ai_timeout,
            ..AssistantConfig::default()
        };

        let chat = ChatConfig {
            max_history_turns: env_or("MM_AI_MAX_HISTORY_TURNS", DEFAULT_AI_MAX_HISTORY_TURNS),
            request_timeout: ai_timeout,
            ..ChatConfig::default()
        };

        Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            tick_interval: Duration::from_millis(tick_ms),
            default_symbol: std::env::var("MM_DEFAULT_SYMBOL")
                .unwrap_or_else(|_| DEFAULT_SYMBOL.into()),
            simulator,
            assistant,
            chat,
        }
    }
}

/// Parse `key` from the environment, keeping `default` when unset or invalid.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Like [`env_or`], but a zero value also falls back to `default`.
fn env_nonzero(key: &str, default: u64) -> u64 {
    match env_or(key, default) {
        0 => {
            tracing::warn!("Ignoring {}=0, using default {}", key, default);
            default
        }
        value => value,
    }
}
