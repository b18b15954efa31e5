use watson_worker::{
    api::app_router, build_state, config::Config, enqueue_sample_jobs, init_tracing,
    start_workers,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    let state = build_state(&config).await?;

    if config.enqueue_sample_jobs {
        enqueue_sample_jobs(&state.enqueuer).await?;
    }
    let workers = start_workers(&state, &config);
    tracing::info!("Started {} workers", workers.worker_count());

    let router = app_router(state);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    workers.shutdown().await;
    tracing::info!("Workers stopped");
    Ok(())
}
