use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::config::Config;
use marketmind_ai::{
    ChatSession, GeminiAssistant, RemoteAssistant, RuntimeEnvironment,
};
use marketmind_market_data::{
    normalize_symbol, Instrument, MarketDataError, MarketSimulator, WatchlistSnapshot,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    simulator: RwLock<MarketSimulator>,
    /// Symbol the dashboard is focused on; `None` means the overview.
    selected: RwLock<Option<String>>,
    pub chat: ChatSession<RuntimeEnvironment>,
    pub tick_interval: Duration,
}

impl AppState {
    pub fn market(&self) -> RwLockReadGuard<'_, MarketSimulator> {
        self.simulator
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn market_mut(&self) -> RwLockWriteGuard<'_, MarketSimulator> {
        self.simulator
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one simulation cycle and return the resulting snapshot.
    pub fn advance_market(&self) -> Result<WatchlistSnapshot, MarketDataError> {
        let mut market = self.market_mut();
        market.advance()?;
        Ok(market.snapshot())
    }

    pub fn selected_symbol(&self) -> Option<String> {
        self.selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current state of the selected instrument, if any.
    pub fn selected_instrument(&self) -> Option<Instrument> {
        let symbol = self.selected_symbol()?;
        self.market().instrument(&symbol).cloned()
    }

    /// Focus the dashboard on `symbol`, which must be on the watchlist.
    pub fn select(&self, symbol: &str) -> Result<Instrument, MarketDataError> {
        let symbol = normalize_symbol(symbol)?;
        let instrument = self
            .market()
            .instrument(&symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.clone()))?;

        *self
            .selected
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(symbol);
        Ok(instrument)
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("MM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let env = Arc::new(RuntimeEnvironment::from_env());
    let assistant = Arc::new(GeminiAssistant::new(env.clone(), config.assistant.clone()));
    build_state_with(config, env, assistant)
}

/// Build the state around a caller-supplied assistant.
pub fn build_state_with(
    config: &Config,
    env: Arc<RuntimeEnvironment>,
    assistant: Arc<dyn RemoteAssistant>,
) -> anyhow::Result<Arc<AppState>> {
    if config.tick_interval.is_zero() {
        anyhow::bail!("tick interval must be greater than zero");
    }
    let simulator = MarketSimulator::new(config.simulator.clone())?;

    let selected = match normalize_symbol(&config.default_symbol) {
        Ok(symbol) if simulator.instrument(&symbol).is_some() => Some(symbol),
        _ => {
            let fallback = simulator
                .watchlist()
                .symbols()
                .first()
                .map(|s| s.to_string());
            tracing::warn!(
                "Default symbol {} is not on the watchlist, using {:?}",
                config.default_symbol,
                fallback
            );
            fallback
        }
    };
    tracing::info!(
        "Tracking {} instruments, selected {:?}",
        simulator.watchlist().len(),
        selected
    );

    let chat = ChatSession::new(env, assistant, config.chat.clone());

    Ok(Arc::new(AppState {
        simulator: RwLock::new(simulator),
        selected: RwLock::new(selected),
        chat,
        tick_interval: config.tick_interval,
    }))
}
