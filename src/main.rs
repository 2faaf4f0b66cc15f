use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use eyre::{Result, WrapErr};
use dotenvy::dotenv;
use tracing::info;

use stablecoin_relayer::{
    api,
    config::{load_identity_config, ServerConfig},
    domain::{AdmissionGate, TransferReconciler},
    jobs::ReconciliationWorker,
    logging::setup_logging,
    models::AppState,
    repositories::{InMemoryIdentityRegistry, InMemoryTransferRepository},
    services::{LocalSigner, NotifierService, RelayerSignTrait, SolanaLedgerProvider},
};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    setup_logging().wrap_err("Failed to initialize logging")?;

    let config = ServerConfig::from_env().wrap_err("Failed to load server configuration")?;

    let identity_config = load_identity_config(&config.identity_config_path).wrap_err_with(
        || format!("Failed to load identities from {}", config.identity_config_path),
    )?;
    info!(
        identities = identity_config.identities.len(),
        "identity registry loaded"
    );
    let identity_registry = Arc::new(InMemoryIdentityRegistry::from_identities(
        identity_config.identities,
    ));

    let signer = Arc::new(
        LocalSigner::from_keypair_file(&config.relayer_keypair_path)
            .wrap_err("Failed to load relayer keypair")?,
    );
    let provider = Arc::new(
        SolanaLedgerProvider::new(&config.solana_rpc_url, config.rpc_call_timeout)
            .wrap_err("Failed to create ledger provider")?,
    );
    let notifier = Arc::new(
        NotifierService::from_webhook_url(config.settlement_webhook_url.as_deref())
            .wrap_err("Failed to create settlement notifier")?,
    );
    let transfer_repository = Arc::new(InMemoryTransferRepository::new());

    info!(
        relayer = %signer.pubkey(),
        mint = %config.stablecoin_mint,
        rpc_url = %provider.url(),
        "relay configured"
    );

    let admission_gate = Arc::new(AdmissionGate::new(
        transfer_repository.clone(),
        identity_registry,
        signer,
        config.asset_policy(),
    ));
    let reconciler = Arc::new(TransferReconciler::new(
        provider,
        transfer_repository.clone(),
        notifier,
        config.rpc_call_timeout,
    ));
    let worker = Arc::new(ReconciliationWorker::new(
        reconciler,
        config.reconcile_interval,
    ))
    .start();

    let app_state = AppState::new(admission_gate, transfer_repository);

    info!("Starting server on {}:{}", config.host, config.port);
    let server_result = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            .wrap(middleware::DefaultHeaders::new())
            .wrap(middleware::Logger::default())
            .app_data(web::ThinData(app_state.clone()))
            .service(web::scope("/api/v1").configure(api::routes::configure_routes))
            .configure(api::routes::metrics::init)
    })
    .bind((config.host.as_str(), config.port))?
    .shutdown_timeout(5)
    .run()
    .await;

    info!("HTTP server stopped, stopping reconciliation worker");
    worker.shutdown().await;

    server_result.wrap_err("HTTP server failed")
}
