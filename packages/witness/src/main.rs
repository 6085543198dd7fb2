mod api;
mod config;

use std::sync::Arc;
use std::time::Instant;

use eyre::WrapErr;
use interchain_rs::{
    EventSubscription, EventType, InterChainEventCache, MainchainWitness, RedbStore,
    RpcMainchainClient, SimulatedMainchainWitness, WitnessHandle,
};

use config::{Config, WitnessMode};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    tracing::info!("Starting subchain witness");

    let config = Config::load()?;
    tracing::info!(
        mode = %config.mode,
        mainchain_chain_id = %config.mainchain.chain_id,
        subchain_id = %config.subchain_id,
        db_path = %config.db_path.display(),
        "Configuration loaded"
    );

    // The only unrecoverable startup failure
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }
    let store = RedbStore::open(&config.db_path).map_err(|e| {
        tracing::error!(error = %e, path = %config.db_path.display(), "Failed to open event store");
        eyre::eyre!("Failed to open event store at {}: {}", config.db_path.display(), e)
    })?;
    let cache = Arc::new(InterChainEventCache::new(store));
    tracing::info!("Event store opened");

    let witness_config = config.witness_config();
    let (handle, event_types) = match config.mode {
        WitnessMode::Rpc => {
            let client = RpcMainchainClient::new(
                &config.mainchain.rpc_url,
                config.chain_registrar_address()?,
            )?;
            let (tfuel, tnt20, tnt721) = config.token_bank_addresses()?;
            let subscriptions = EventSubscription::token_banks(tfuel, tnt20, tnt721);
            let event_types = subscriptions.iter().map(|s| s.event_type).collect();

            let witness = MainchainWitness::new(
                Arc::new(client),
                cache.clone(),
                witness_config,
                subscriptions,
            );
            (Arc::new(witness).start(), event_types)
        }
        WitnessMode::Simulated => {
            let witness = SimulatedMainchainWitness::new(cache.clone(), witness_config);
            let event_types = vec![
                EventType::TFuelTransfer,
                EventType::Tnt20Transfer,
                EventType::Tnt721Transfer,
            ];
            (Arc::new(witness).start(), event_types)
        }
    };

    let api_addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let api_state = api::ApiState {
        cache: cache.clone(),
        mode: config.mode.to_string(),
        event_types,
        started_at: Instant::now(),
    };
    tokio::spawn(async move {
        if let Err(e) = api::start_api_server(api_addr, api_state).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    wait_for_shutdown_signal().await?;
    shutdown(handle).await?;

    tracing::info!("Subchain witness stopped");
    Ok(())
}

async fn shutdown(handle: WitnessHandle) -> eyre::Result<()> {
    handle.stop().await;
    handle.wait().await
}

/// Initialize tracing/logging with structured output
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,subchain_witness=debug,interchain_rs=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .with(filter)
            .init();
    }
}

/// Wait for shutdown signals (SIGINT/SIGTERM)
async fn wait_for_shutdown_signal() -> eyre::Result<()> {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .wrap_err("Failed to install SIGTERM handler")?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result.wrap_err("Failed to install Ctrl+C handler")?;
                tracing::info!("Received Ctrl+C, initiating shutdown");
            }
            _ = terminate.recv() => {
                tracing::info!("Received SIGTERM, initiating shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .wrap_err("Failed to install Ctrl+C handler")?;
        tracing::info!("Received Ctrl+C, initiating shutdown");
    }

    Ok(())
}
