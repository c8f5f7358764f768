use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::utils::format_ether;
use anyhow::{Context, Result, bail};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use forge_chain::{ChainReader, ChainSettings, FeePolicy};
use forge_core::{ForgeConfig, ForgeError};
use forge_ui::{
    ArboardClipboard, LaunchPanel, LaunchSettings, MiniAppHost, Status, SubmitOutcome,
    TerminalHost,
};

use crate::cli::Command;

const STATUS_TICK: Duration = Duration::from_millis(200);

pub async fn run(command: Command, config: ForgeConfig) -> Result<()> {
    match command {
        Command::Fee => fee(&config).await,
        Command::Create {
            name,
            symbol,
            supply,
            image,
            copy,
            share,
            ..
        } => create(&config, TokenInput { name, symbol, supply, image }, copy, share).await,
        Command::VerifyListen { .. } => verify_listen(&config).await,
        Command::Config { path } => show_config(&config, path),
    }
}

async fn fee(config: &ForgeConfig) -> Result<()> {
    let settings = ChainSettings::from_config(config).map_err(ForgeError::from)?;
    let fee = match settings.fee_policy {
        FeePolicy::Fixed { fee } => fee,
        FeePolicy::OnChain => settings
            .reader()
            .map_err(ForgeError::from)?
            .creation_fee()
            .await
            .map_err(ForgeError::from)?,
    };
    println!(
        "Creation fee on {}: {} ETH ({fee} wei)",
        settings.chain,
        format_ether(fee)
    );
    Ok(())
}

struct TokenInput {
    name: String,
    symbol: String,
    supply: String,
    image: String,
}

async fn create(config: &ForgeConfig, input: TokenInput, copy: bool, share: bool) -> Result<()> {
    let settings = ChainSettings::from_config(config).map_err(ForgeError::from)?;
    let reader: Arc<dyn ChainReader> = Arc::new(settings.reader().map_err(ForgeError::from)?);
    let host: Arc<dyn MiniAppHost> = Arc::new(TerminalHost::new());
    let panel = LaunchPanel::new(LaunchSettings::from_chain_settings(&settings, config), host)
        .with_reader(reader)
        .with_connectors(settings.connectors());

    panel.activate().await;
    panel
        .connect()
        .await
        .map_err(ForgeError::from)
        .context("wallet connection failed")?;
    let connection = panel.connection();
    if let (Some(via), Some(account)) = (connection.connector_name(), connection.short_account()) {
        println!("Connected via {via}: {account}");
    }
    println!("Create Token {}", panel.fee_label());

    panel.update_form(|form| {
        form.set_name(&input.name);
        form.set_symbol(&input.symbol);
        form.set_initial_supply(&input.supply);
        form.set_image_uri(&input.image);
    });

    let mut outcome = drive(&panel).await?;
    if outcome == SubmitOutcome::FeePending {
        info!("fee was not cached; retrying once");
        outcome = drive(&panel).await?;
    }

    match outcome {
        SubmitOutcome::Created(record) => {
            println!("Token address: {}", record.token_address);
            println!(
                "Explorer: {}/token/{}",
                settings.chain_config.explorer_url, record.token_address
            );
            if copy && panel.copy_address(&ArboardClipboard) {
                println!("Address copied to clipboard");
            }
            if share {
                panel.share().await;
                for message in panel.notifications() {
                    eprintln!("{message}");
                }
            }
            Ok(())
        }
        SubmitOutcome::Failed(failure) => Err(ForgeError::from(failure).into()),
        SubmitOutcome::FeePending => bail!("creation fee is still unavailable"),
        SubmitOutcome::Busy => bail!("a submission is already pending"),
    }
}

/// Run one create attempt, printing each status change as it happens.
async fn drive(panel: &LaunchPanel) -> Result<SubmitOutcome> {
    let creation = panel.create_token();
    tokio::pin!(creation);
    let mut ticker = tokio::time::interval(STATUS_TICK);
    let mut last_shown: Option<Status> = None;

    loop {
        tokio::select! {
            outcome = &mut creation => {
                print_status(panel, &mut last_shown);
                return Ok(outcome);
            }
            _ = ticker.tick() => print_status(panel, &mut last_shown),
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted while creating token");
                bail!("interrupted; a submitted transaction may still be mined");
            }
        }
    }
}

fn print_status(panel: &LaunchPanel, last_shown: &mut Option<Status>) {
    let status = panel.status();
    if last_shown.as_ref() == Some(&status) {
        return;
    }
    if let Some(view) = panel.view() {
        println!("{}", view.render_line(true));
    }
    *last_shown = Some(status);
}

async fn verify_listen(config: &ForgeConfig) -> Result<()> {
    let settings = ChainSettings::from_config(config).map_err(ForgeError::from)?;
    let mut listener = settings.verification_listener().map_err(ForgeError::from)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            on_signal.cancel();
        }
    });

    println!(
        "Listening for TokenCreated on {} at {} (Ctrl-C to stop)",
        settings.chain, settings.factory
    );
    listener.run(cancel).await;
    Ok(())
}

fn show_config(config: &ForgeConfig, path_only: bool) -> Result<()> {
    let path = ForgeConfig::config_path()?;
    if path_only {
        println!("{}", path.display());
        return Ok(());
    }
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    println!(
        "private key: {}",
        if config.private_key.is_some() { "set" } else { "not set" }
    );
    println!(
        "explorer API key: {}",
        if config.explorer_api_key.is_some() { "set" } else { "not set" }
    );
    Ok(())
}
