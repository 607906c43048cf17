use marketmind_server::{
    api::app_router, build_state, config::Config, init_tracing, scheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let config = Config::from_env();
    let state = build_state(&config)?;

    // Drive the simulated market for the lifetime of the process
    scheduler::start_market_ticker(state.clone());

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
