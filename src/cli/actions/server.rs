use crate::{
    admin::{self, AdminState},
    auth::{Credential, CredentialScheme, CredentialStore, MemoryRateLimiter},
    cli::{globals::GlobalArgs, telemetry},
    config::{LinkMode, ServerConfig},
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub scheme: CredentialScheme,
    pub pin: Option<String>,
    pub max_attempts: u32,
    pub attempt_window: Duration,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the config cannot be loaded, the credential is invalid,
/// or the listener fails.
pub async fn execute(args: Args) -> Result<()> {
    let mut config = ServerConfig::load(args.globals.config_dir())
        .context("Failed to load server config")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_host = bind;
    }

    let credential = build_credential(args.scheme, args.pin.as_deref(), &config)?;
    let credentials = CredentialStore::new(credential);

    let listener = TcpListener::bind((config.bind_host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.bind_host, config.port))?;

    print_banner(&config, &credentials).await;

    let mut state = AdminState::new(config, credentials.clone());
    if args.max_attempts > 0 {
        debug!(
            "Admin login throttling: {} attempts per {:?}",
            args.max_attempts, args.attempt_window
        );
        state = state.with_rate_limiter(Arc::new(MemoryRateLimiter::new(
            args.max_attempts,
            args.attempt_window,
        )));
    }

    if credentials.scheme() == CredentialScheme::Pin {
        spawn_pin_rotation(credentials)?;
    }

    admin::serve(listener, Arc::new(state), shutdown_signal()).await?;

    telemetry::shutdown_tracer();

    Ok(())
}

fn build_credential(
    scheme: CredentialScheme,
    pin: Option<&str>,
    config: &ServerConfig,
) -> Result<Credential> {
    let credential = match (scheme, pin) {
        (CredentialScheme::Pin, Some(pin)) => {
            Credential::pin(pin).context("Invalid --admin-pin")?
        }
        (CredentialScheme::Pin, None) => Credential::generate_pin(),
        (CredentialScheme::Token, _) => Credential::token(config.token.clone())
            .context("Server config has no auth token")?,
    };
    Ok(credential)
}

// The PIN goes to the terminal only, never to the log.
async fn print_banner(config: &ServerConfig, credentials: &CredentialStore) {
    println!(
        "DarkCode admin: http://{}:{}/admin",
        config.advertised_host(LinkMode::Direct),
        config.port
    );
    match credentials.scheme() {
        CredentialScheme::Pin => {
            println!("Admin PIN: {}", credentials.current().await.expose());
        }
        CredentialScheme::Token => println!("Admin login uses the auth token from config.json"),
    }
    println!("WebSocket: {}", config.ws_url());
}

#[cfg(unix)]
fn spawn_pin_rotation(credentials: CredentialStore) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup =
        signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            match credentials.rotate_pin().await {
                Ok(credential) => println!("New admin PIN: {}", credential.expose()),
                Err(err) => tracing::error!("Failed to rotate admin PIN: {err}"),
            }
        }
    });

    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn spawn_pin_rotation(_credentials: CredentialStore) -> Result<()> {
    debug!("PIN rotation on SIGHUP is only available on unix");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal, initiating shutdown"),
        () = terminate => info!("Received SIGTERM signal, initiating shutdown"),
    }
}
