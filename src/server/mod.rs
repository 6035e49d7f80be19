pub mod api;
pub mod errors;

use log::{ info, warn };
use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

use crate::cli::ServeArgs;
use crate::relay::Relay;
use api::AppState;

pub struct Server {
    addr: String,
    relay: Relay,
    args: ServeArgs,
}

impl Server {
    pub fn new(addr: String, relay: Relay, args: ServeArgs) -> Self {
        Self { addr, relay, args }
    }

    pub async fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()
            .map_err(|e| format!("Invalid server address '{}': {}", self.addr, e))?;
        let app = api::router(AppState::new(self.relay), &self.args.cors_origins);

        match (self.args.enable_tls, &self.args.tls_cert_path, &self.args.tls_key_path) {
            (true, Some(cert_path), Some(key_path)) => {
                let tls_config = axum_server::tls_rustls::RustlsConfig
                    ::from_pem_file(cert_path, key_path).await
                    .map_err(|e| format!("Failed to load TLS certificate/key: {}", e))?;

                let handle = axum_server::Handle::new();
                let shutdown_handle = handle.clone();
                tokio::spawn(async move {
                    shutdown_signal().await;
                    shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
                });

                info!("HTTPS server listening on https://{}", addr);
                axum_server::bind_rustls(addr, tls_config)
                    .handle(handle)
                    .serve(app.into_make_service()).await?;
            }
            (true, _, _) => {
                return Err("ENABLE_TLS requires both TLS_CERT_PATH and TLS_KEY_PATH".into());
            }
            _ => {
                let listener = tokio::net::TcpListener
                    ::bind(addr).await
                    .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;
                info!("HTTP server listening on http://{}", addr);
                axum::serve(listener, app.into_make_service())
                    .with_graceful_shutdown(shutdown_signal()).await?;
            }
        }

        info!("HTTP server closed");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received: closing HTTP server"),
        _ = terminate => info!("SIGTERM signal received: closing HTTP server"),
    }
}
