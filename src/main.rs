use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{info, warn};

use peerbet::actions::{ActionEvent, Dispatcher, EventDraft, TxPhase};
use peerbet::catalog::{self, EventRecord};
use peerbet::chains::{tokens_for, ContractVersion};
use peerbet::codec::format_amount;
use peerbet::config::Config;
use peerbet::gateway::{EventStatus, Gateway, Outcome};
use peerbet::reconcile::{matchable, reconcile};
use peerbet::session::{ChainSwitcher, RpcSwitcher, Session};
use peerbet::slots::read_slots;

const USAGE: &str = "\
usage: peerbet COMMAND [ARGS]

  watch [EVENT]                          follow the catalog (and one event's slots)
  view EVENT                             one-shot event + slot view
  chain CHAIN_ID                         switch and persist the selected chain
  create TITLE OUTCOME_A OUTCOME_B START FEE [TOKEN]
                                         create an event (START is RFC 3339)
  bet EVENT OUTCOME AMOUNT               open a position (OUTCOME is A or B)
  match EVENT SLOT                       take the other side of an open slot
  resolve EVENT WINNER                   grade an event (creator only)
  refund EVENT SLOT                      reclaim an unmatched stake
  claim EVENT SLOT                       collect winnings from a graded event
";

enum Command {
    Watch { follow: Option<u64> },
    View { event: u64 },
    Chain { id: u64 },
    Create { draft: EventDraft },
    Bet { event: u64, outcome: Outcome, amount: String },
    Match { event: u64, slot: u64 },
    Resolve { event: u64, winner: Outcome },
    Refund { event: u64, slot: u64 },
    Claim { event: u64, slot: u64 },
}

fn parse_index(args: &[String], pos: usize, what: &str) -> anyhow::Result<u64> {
    args.get(pos)
        .with_context(|| format!("missing {what}\n{USAGE}"))?
        .parse::<u64>()
        .with_context(|| format!("{what} must be a number"))
}

fn parse_outcome(args: &[String], pos: usize) -> anyhow::Result<Outcome> {
    let raw = args.get(pos).with_context(|| format!("missing outcome\n{USAGE}"))?;
    Outcome::parse(raw).with_context(|| format!("outcome must be A or B, got {raw:?}"))
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    let Some(cmd) = args.first() else {
        bail!("{USAGE}");
    };
    Ok(match cmd.as_str() {
        "watch" => Command::Watch {
            follow: match args.get(1) {
                Some(raw) => Some(raw.parse().context("EVENT must be a number")?),
                None => None,
            },
        },
        "view" => Command::View {
            event: parse_index(args, 1, "EVENT")?,
        },
        "chain" => Command::Chain {
            id: parse_index(args, 1, "CHAIN_ID")?,
        },
        "create" => {
            let get = |pos: usize, what: &str| {
                args.get(pos)
                    .cloned()
                    .with_context(|| format!("missing {what}\n{USAGE}"))
            };
            let start = DateTime::parse_from_rfc3339(&get(4, "START")?)
                .context("START must be RFC 3339, e.g. 2026-09-01T18:00:00Z")?
                .with_timezone(&Utc);
            let token = match args.get(6) {
                Some(raw) => Address::from_str(raw).context("TOKEN must be a hex address")?,
                None => Address::ZERO,
            };
            Command::Create {
                draft: EventDraft {
                    title: get(1, "TITLE")?,
                    outcome_a: get(2, "OUTCOME_A")?,
                    outcome_b: get(3, "OUTCOME_B")?,
                    start_time: start,
                    fee_percent: parse_index(args, 5, "FEE")?,
                    token,
                },
            }
        }
        "bet" => Command::Bet {
            event: parse_index(args, 1, "EVENT")?,
            outcome: parse_outcome(args, 2)?,
            amount: args
                .get(3)
                .cloned()
                .with_context(|| format!("missing AMOUNT\n{USAGE}"))?,
        },
        "match" => Command::Match {
            event: parse_index(args, 1, "EVENT")?,
            slot: parse_index(args, 2, "SLOT")?,
        },
        "resolve" => Command::Resolve {
            event: parse_index(args, 1, "EVENT")?,
            winner: parse_outcome(args, 2)?,
        },
        "refund" => Command::Refund {
            event: parse_index(args, 1, "EVENT")?,
            slot: parse_index(args, 2, "SLOT")?,
        },
        "claim" => Command::Claim {
            event: parse_index(args, 1, "EVENT")?,
            slot: parse_index(args, 2, "SLOT")?,
        },
        other => bail!("unknown command {other:?}\n{USAGE}"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    // Load config
    let from_file = Path::new("peerbet.toml").exists();
    let config = if from_file {
        Config::load(Path::new("peerbet.toml"))?
    } else {
        Config::from_env()
    };

    // Initialize logging before anything worth reporting.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }

    info!("peerbet v{} starting", env!("CARGO_PKG_VERSION"));
    if !from_file {
        info!("no peerbet.toml found, using env-only config");
    }

    let version = match ContractVersion::parse(&config.network.contract_version) {
        Some(v) => v,
        None => bail!(
            "unknown contract version {:?} in config",
            config.network.contract_version
        ),
    };
    let mut session = Session::restore(PathBuf::from(&config.network.selection_path), version);

    // --- Wallet Setup ---
    let signer = if config.has_signer() {
        let signer = PrivateKeySigner::from_str(config.wallet.private_key.trim())
            .context("PEERBET_PRIVATE_KEY is not a valid private key")?;
        Some(signer)
    } else {
        warn!(
            "no signing key configured - running in read-only mode \
             (set PEERBET_PRIVATE_KEY to submit transactions)"
        );
        None
    };

    let rpc_override = if config.network.rpc_url.is_empty() {
        None
    } else {
        Some(config.network.rpc_url.clone())
    };
    let mut switcher = RpcSwitcher::new(signer, rpc_override);

    // `chain` only flips the persisted selection, no contract work.
    if let Command::Chain { id } = command {
        session.switch_to_chain(&mut switcher, id).await?;
        info!(chain = id, name = session.selected().name, "chain selection saved");
        return Ok(());
    }

    switcher.request_switch(session.selected().id).await?;
    let provider = switcher
        .provider()
        .context("no provider after connecting")?;

    if let Some(address) = switcher.signer_address() {
        let provider_chain = provider.get_chain_id().await?;
        session
            .on_wallet_connected(&mut switcher, address, provider_chain)
            .await;
    }
    // Auto-switch may have reconnected; take the current provider.
    let provider = switcher
        .provider()
        .context("no provider after connecting")?;

    let chain = session.selected();
    let Some(contract) = chain.contract_address(session.version()) else {
        bail!("no {} deployment on {}", session.version(), chain.name);
    };
    let gateway = Gateway::new(contract, provider, chain.id);
    info!(chain = chain.name, contract = %contract, "connected to gateway");

    let (tx, mut rx) = mpsc::unbounded_channel::<ActionEvent>();
    let dispatcher = Dispatcher::new(gateway.clone(), session.wallet(), tx);
    let read_timeout = Duration::from_secs(config.client.read_timeout_secs);

    match command {
        Command::Chain { .. } => unreachable!(),

        Command::View { event } => {
            let record = fetch_event(&gateway, event, read_timeout).await?;
            print_event(&gateway, &session, &record, read_timeout).await?;
        }

        Command::Watch { follow } => {
            watch(&gateway, &session, &mut rx, follow, &config, read_timeout).await?;
        }

        Command::Create { draft } => {
            let hash = run_logged(&mut rx, dispatcher.create_event(&draft, Utc::now())).await?;
            info!(tx = %hash, "event created");
        }

        Command::Bet { event, outcome, amount } => {
            // Surface open slots already holding the other side; taking one
            // of those pairs up immediately instead of waiting for a match.
            if let Some(user) = session.wallet() {
                let record = fetch_event(&gateway, event, read_timeout).await?;
                let fetch = timeout(read_timeout, read_slots(&gateway, event))
                    .await
                    .context("slot reads timed out")?;
                let names = [
                    record.outcome_a.display().to_string(),
                    record.outcome_b.display().to_string(),
                ];
                for open in matchable(&fetch.slots, user, outcome) {
                    info!(
                        slot = open.slot_index,
                        stake = %format_amount(open.amount),
                        take = %format!("BET {}", names[open.outcome_a.opposite().index() as usize]),
                        "open slot holds the other side, `match` pairs it instantly"
                    );
                }
            }
            let hash = run_logged(&mut rx, dispatcher.place_bet(event, outcome, &amount)).await?;
            info!(tx = %hash, event, "bet placed");
        }

        Command::Match { event, slot } => {
            // Stake must mirror the open slot's amount exactly.
            let target = timeout(read_timeout, gateway.prediction(event, slot))
                .await
                .context("slot read timed out")??;
            if !target.exists() {
                bail!("event {event} slot {slot} is empty");
            }
            if target.player_b != Address::ZERO {
                bail!("event {event} slot {slot} is already matched");
            }
            info!(stake = %format_amount(target.amount), "matching open slot");
            let hash = run_logged(&mut rx, dispatcher.match_bet(event, slot, target.amount)).await?;
            info!(tx = %hash, event, slot, "matched");
        }

        Command::Resolve { event, winner } => {
            let record = fetch_event(&gateway, event, read_timeout).await?;
            let hash = run_logged(&mut rx, dispatcher.resolve_event(&record, winner)).await?;
            info!(tx = %hash, event, winner = %winner, "resolved");
        }

        Command::Refund { event, slot } => {
            let hash = run_logged(&mut rx, dispatcher.request_refund(event, slot)).await?;
            info!(tx = %hash, event, slot, "refund requested");
        }

        Command::Claim { event, slot } => {
            let record = fetch_event(&gateway, event, read_timeout).await?;
            if record.status == EventStatus::Resolved {
                let winner = timeout(read_timeout, gateway.resolved_winner(event))
                    .await
                    .context("winner read timed out")??;
                let names = [record.outcome_a.display(), record.outcome_b.display()];
                info!(
                    event,
                    winner = %format!("{} ({})", winner, names[winner.index() as usize]),
                    "event graded"
                );
            }
            let hash = run_logged(&mut rx, dispatcher.claim_winnings(event, slot)).await?;
            info!(tx = %hash, event, slot, "winnings claimed");
        }
    }

    Ok(())
}

async fn fetch_event(
    gateway: &Gateway,
    index: u64,
    read_timeout: Duration,
) -> anyhow::Result<EventRecord> {
    let raw = timeout(read_timeout, gateway.event(index))
        .await
        .context("event read timed out")??;
    Ok(EventRecord::from_raw(raw, gateway.chain_id(), Utc::now()))
}

/// Drain lifecycle notifications while one write runs to completion.
async fn run_logged<F>(
    rx: &mut mpsc::UnboundedReceiver<ActionEvent>,
    action: F,
) -> anyhow::Result<alloy::primitives::B256>
where
    F: std::future::Future<Output = Result<alloy::primitives::B256, peerbet::actions::DispatchError>>,
{
    tokio::pin!(action);
    loop {
        tokio::select! {
            result = &mut action => {
                // Flush whatever notifications are still queued.
                while let Ok(event) = rx.try_recv() {
                    log_action_event(&event);
                }
                return Ok(result?);
            }
            Some(event) = rx.recv() => log_action_event(&event),
        }
    }
}

fn log_action_event(event: &ActionEvent) {
    match event {
        ActionEvent::PhaseChanged { kind, phase } => match phase {
            TxPhase::Idle => {}
            TxPhase::Submitted(hash) => info!(action = kind.in_flight_label(), tx = %hash, "submitted"),
            TxPhase::Confirming(hash) => info!(action = kind.in_flight_label(), tx = %hash, "confirming"),
            TxPhase::Confirmed(hash) => info!(action = kind.in_flight_label(), tx = %hash, "confirmed"),
            TxPhase::Failed(reason) => warn!(action = kind.in_flight_label(), reason = %reason, "failed"),
        },
        ActionEvent::Invalidated { event_index } => match event_index {
            Some(index) => info!(event = index, "cached reads invalidated"),
            None => info!("catalog invalidated"),
        },
    }
}

async fn print_catalog(gateway: &Gateway, read_timeout: Duration) -> anyhow::Result<()> {
    let records = timeout(read_timeout, catalog::read_recent(gateway, Utc::now()))
        .await
        .context("catalog read timed out")??;
    if records.is_empty() {
        info!("no events on this chain yet");
        return Ok(());
    }
    info!("--- Events ({}) ---", records.len());
    for r in &records {
        let token = r
            .token
            .map(|t| t.name)
            .unwrap_or("?");
        info!(
            index = r.index,
            title = %r.title.display(),
            outcomes = %format!("{} / {}", r.outcome_a.display(), r.outcome_b.display()),
            starts = %r.starts,
            status = %r.status,
            fee = r.fee_percent,
            token,
            "event"
        );
    }
    Ok(())
}

async fn print_event(
    gateway: &Gateway,
    session: &Session,
    record: &EventRecord,
    read_timeout: Duration,
) -> anyhow::Result<()> {
    info!(
        index = record.index,
        title = %record.title.display(),
        status = %record.status,
        starts = %record.starts,
        creator = %record.creator,
        "event"
    );
    let fetch = timeout(read_timeout, read_slots(gateway, record.index))
        .await
        .context("slot reads timed out")?;
    if fetch.is_partial() {
        warn!(failed = fetch.errors.len(), "some slot reads failed, view is partial");
    }
    let view = reconcile(record, &fetch.slots, session.wallet());
    for m in &view.matched {
        info!(
            slot = m.slot_index,
            amount = %m.amount_display,
            a = %format!("{} ({})", m.player_a, m.player_a_outcome),
            b = %format!("{} ({})", m.player_b, m.player_b_outcome),
            "matched"
        );
    }
    for u in &view.unmatched {
        match &u.action {
            Some(action) => info!(
                slot = u.slot_index,
                amount = %u.amount_display,
                player = %format!("{} ({})", u.player_a, u.player_a_outcome),
                take = %action.label,
                "waiting for match"
            ),
            None => info!(
                slot = u.slot_index,
                amount = %u.amount_display,
                player = %format!("{} ({})", u.player_a, u.player_a_outcome),
                "waiting for match"
            ),
        }
    }
    if view.matched.is_empty() && view.unmatched.is_empty() {
        info!(event = record.index, "no predictions yet");
    }
    Ok(())
}

async fn watch(
    gateway: &Gateway,
    session: &Session,
    rx: &mut mpsc::UnboundedReceiver<ActionEvent>,
    follow: Option<u64>,
    config: &Config,
    read_timeout: Duration,
) -> anyhow::Result<()> {
    let tokens = tokens_for(session.selected().id);
    info!(
        chain = session.selected().name,
        tokens = tokens.len(),
        refresh_secs = config.client.refresh_secs,
        "entering watch loop - press Ctrl+C to stop"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.client.refresh_secs));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = print_catalog(gateway, read_timeout).await {
                    warn!(error = %e, "catalog refresh failed");
                }
                if let Some(index) = follow {
                    match fetch_event(gateway, index, read_timeout).await {
                        Ok(record) => {
                            if let Err(e) = print_event(gateway, session, &record, read_timeout).await {
                                warn!(error = %e, event = index, "event refresh failed");
                            }
                        }
                        Err(e) => warn!(error = %e, event = index, "event read failed"),
                    }
                }
            }

            Some(event) = rx.recv() => {
                log_action_event(&event);
                if let ActionEvent::Invalidated { .. } = event {
                    if let Err(e) = print_catalog(gateway, read_timeout).await {
                        warn!(error = %e, "post-write refresh failed");
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("shutting down...");
                break;
            }
        }
    }
    Ok(())
}
