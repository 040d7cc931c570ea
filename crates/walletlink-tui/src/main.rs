//! Wallet Link TUI - A terminal interface for connecting a wallet and sending transfers.

mod action;
mod app;
mod event;
mod log_buffer;
mod theme;
mod tui;
mod ui;

use action::{Action, FormField};
use app::App;
use clap::Parser;
use color_eyre::Result;
use event::{Event, EventHandler};
use log_buffer::{LogBuffer, LogBufferLayer};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tui::Tui;
use walletlink_chain::{
    AbsentProvider, ConnectionManager, HttpProvider, Provider, TransferForm, TransferOptions,
    WalletClient,
};
use walletlink_core::{AppConfig, ConnectionState};

/// Wallet Link TUI - Connect a wallet, watch its balance and send transfers.
#[derive(Parser, Debug)]
#[command(name = "walletlink")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-RPC endpoint whose unlocked accounts act as the wallet
    #[arg(long = "rpc-url")]
    rpc_url: Option<String>,

    /// Run without a wallet provider
    #[arg(long)]
    no_wallet: bool,

    /// Balance refresh period in seconds
    #[arg(long = "refresh-secs")]
    refresh_secs: Option<u64>,

    /// Account and chain change polling period in milliseconds
    #[arg(long = "watch-ms")]
    watch_ms: Option<u64>,

    /// Headless mode: log to stderr, restore an existing connection, print it and exit.
    #[arg(long)]
    log_stderr: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(secs) = self.refresh_secs {
            config.refresh_interval_secs = secs;
        }
        if let Some(ms) = self.watch_ms {
            config.watch_interval_ms = ms;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize error handling
    color_eyre::install()?;

    // Create shared log buffer
    let log_buffer = LogBuffer::new();

    // Initialize logging - use stderr for headless mode, buffer for TUI
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("walletlink=info".parse()?)
        .add_directive("walletlink_chain=info".parse()?)
        .add_directive("walletlink_core=info".parse()?);

    if args.log_stderr {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(LogBufferLayer::new(log_buffer.clone()))
            .init();
    }

    // Load configuration
    let mut config = walletlink_core::load_config().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    args.apply(&mut config);
    config.validate()?;

    // The watch handle keeps account/chain polling alive until shutdown.
    let mut _watch = None;
    let provider: Arc<dyn Provider> = if args.no_wallet {
        tracing::info!("Running without a wallet provider");
        Arc::new(AbsentProvider::new())
    } else {
        let http = Arc::new(HttpProvider::new(config.rpc_url.clone()));
        _watch = Some(http.watch(Duration::from_millis(config.watch_interval_ms)));
        tracing::info!("Using JSON-RPC provider at {}", http.url());
        http
    };
    let provider_label = if args.no_wallet {
        "no wallet".to_string()
    } else {
        config.rpc_url.clone()
    };

    let client = WalletClient::new(provider);
    let provider_present = client.is_present();
    let manager = ConnectionManager::from_config(client, &config);
    let form = TransferForm::with_options(manager.clone(), TransferOptions::from(&config));

    if args.log_stderr {
        return run_status_mode(&manager).await;
    }

    let _manager_mount = manager.mount();
    let _form_mount = form.mount();

    // Detect terminal theme (must be done before entering raw mode)
    let theme = theme::Theme::resolve(config.theme);

    let mut app = App::new(provider_label, provider_present, log_buffer, theme);
    app.handle_action(Action::SetConnectionState(manager.state()));
    app.handle_action(Action::SetFormState(form.state()));

    let mut conn_rx = manager.watch();
    let mut form_rx = form.watch();

    // Initialize terminal
    let mut tui = Tui::new()?;
    tui.enter()?;

    // Create event handler
    let mut events = EventHandler::new(50);

    // Restore a connection the wallet already authorized
    let restore = manager.clone();
    tokio::spawn(async move {
        restore.check_existing_connection().await;
    });

    // Main loop
    loop {
        tui.draw(|frame| ui::render(frame, &mut app))?;

        tokio::select! {
            event = events.next() => {
                match event? {
                    Event::Tick => app.tick(),
                    Event::Key(key) => {
                        if let Some(action) = app.handle_key(key) {
                            dispatch(action, &mut app, &manager, &form);
                        }
                    }
                    Event::Resize(_, _) => {}
                }
            }
            Ok(()) = conn_rx.changed() => {
                let state = conn_rx.borrow_and_update().clone();
                app.handle_action(Action::SetConnectionState(state));
            }
            Ok(()) = form_rx.changed() => {
                let state = form_rx.borrow_and_update().clone();
                app.handle_action(Action::SetFormState(state));
            }
        }

        if app.should_quit {
            break;
        }
    }

    tui.exit()?;
    Ok(())
}

/// Route a user action to the connection manager or the transfer form.
fn dispatch(action: Action, app: &mut App, manager: &ConnectionManager, form: &TransferForm) {
    match action {
        Action::Connect => {
            let manager = manager.clone();
            tokio::spawn(async move {
                if let Err(e) = manager.connect().await {
                    tracing::warn!("Connect failed: {}", e);
                }
            });
        }
        Action::Disconnect => manager.disconnect(),
        Action::RefreshBalance => {
            let manager = manager.clone();
            tokio::spawn(async move { manager.refresh_balance().await });
        }
        Action::SwitchToMainnet => {
            let manager = manager.clone();
            tokio::spawn(async move { manager.switch_to_mainnet_chain().await });
        }
        Action::ToggleSendForm => manager.toggle_send_form(),
        Action::CloseSendForm => form.close(),
        Action::EditField(field, value) => match field {
            FormField::Recipient => form.set_recipient(value),
            FormField::Amount => form.set_amount(value),
            FormField::GasPrice => form.set_gas_price(value),
            FormField::GasLimit => form.set_gas_limit(value),
        },
        Action::EstimateGasPrice => {
            let form = form.clone();
            tokio::spawn(async move { form.estimate_gas_price().await });
        }
        Action::Send => {
            let form = form.clone();
            tokio::spawn(async move {
                match form.send().await {
                    Ok(hash) => tracing::info!("Transfer confirmed: {}", hash),
                    Err(e) => tracing::warn!("Transfer failed: {}", e),
                }
            });
        }
        other => app.handle_action(other),
    }
}

/// Restore any authorized connection, print it and exit.
async fn run_status_mode(manager: &ConnectionManager) -> Result<()> {
    manager.check_existing_connection().await;
    println!("{}", describe(&manager.state()));
    Ok(())
}

fn describe(state: &ConnectionState) -> String {
    if !state.connected {
        return match &state.error {
            Some(error) => format!("Not connected: {}", error),
            None => "Not connected".to_string(),
        };
    }

    let mut lines = vec![
        format!("Account: {}", state.account.as_deref().unwrap_or("-")),
        format!(
            "Network: {}{}",
            state.network.name.as_deref().unwrap_or("Unknown"),
            state
                .network
                .chain_id
                .as_deref()
                .map(|id| format!(" ({})", id))
                .unwrap_or_default()
        ),
        format!(
            "Balance: {} {}",
            state.balance.as_deref().unwrap_or("--"),
            state.currency_symbol()
        ),
    ];
    if state.network.is_testnet {
        lines.push("Testnet: yes".to_string());
    }
    lines.join("\n")
}
