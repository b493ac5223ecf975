//! `slackline` — dry-run front end for the message dispatcher.
//!
//! Targets are resolved against a workspace snapshot file; the frames that
//! would go over the RTM socket are printed to stdout, one JSON object per
//! line. The only network call is `im.open` when a DM channel is missing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use slackline_core::config::SlacklineConfig;
use slackline_sends::{ChannelTransport, InMemoryLookups, MessageDispatcher, RtmConnection};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "slackline", version, about = "Resolve targets and render outbound RTM frames")]
struct Cli {
    /// Config file (default: ~/.slackline/slackline.toml)
    #[arg(long, global = true, env = "SLACKLINE_CONFIG")]
    config: Option<String>,

    /// rtm.start-style JSON snapshot used for name lookups
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Post a message to #channel, @user, a user ID or a channel ID
    Send {
        #[arg(long)]
        target: String,
        #[arg(long)]
        text: String,
        /// Correlation ID; parsed as JSON, falling back to a string
        #[arg(long)]
        id: Option<String>,
        /// Reply in the thread rooted at this timestamp
        #[arg(long)]
        thread: Option<String>,
    },
    /// Resolve a target and print the channel ID
    Resolve { target: String },
    /// Show the typing indicator in a channel ID
    Typing {
        #[arg(long)]
        channel: String,
    },
    /// Keep-alive ping with optional extra fields (a JSON object)
    Ping {
        #[arg(long)]
        data: Option<String>,
    },
    /// Subscribe to presence updates for user IDs
    Presence { ids: Vec<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slackline=info,slackline_sends=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = SlacklineConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        SlacklineConfig::default()
    });

    let lookups = match &cli.state {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading state file {}", path.display()))?;
            InMemoryLookups::from_json(&json).context("parsing state file")?
        }
        None => InMemoryLookups::new(),
    };

    let token = config.token.clone().unwrap_or_else(|| {
        warn!("no token configured; im.open calls will be rejected");
        String::new()
    });

    let (transport, mut frames) = ChannelTransport::new();
    let conn = RtmConnection::new(token, Arc::new(transport), Arc::new(lookups));
    let dispatcher = MessageDispatcher::from_config(&config);
    info!(base_url = %config.api.base_url, "dispatcher ready");

    match cli.command {
        Command::Send {
            target,
            text,
            id,
            thread,
        } => {
            let id = id.map(parse_correlation_id);
            match thread {
                Some(ts) => {
                    dispatcher
                        .reply_in_thread(&text, &target, &ts, id, &conn)
                        .await?
                }
                None => dispatcher.send_message(&text, &target, id, &conn).await?,
            }
        }
        Command::Resolve { target } => {
            let channel = dispatcher.resolve(&target, &conn).await?;
            println!("{channel}");
        }
        Command::Typing { channel } => dispatcher.indicate_typing(&channel, &conn)?,
        Command::Ping { data } => {
            let data = match data {
                Some(raw) => parse_ping_data(&raw)?,
                None => Map::new(),
            };
            dispatcher.send_ping(data, &conn)?;
        }
        Command::Presence { ids } => {
            let ids = ids.into_iter().map(Into::into).collect();
            dispatcher.subscribe_presence(ids, &conn)?;
        }
    }

    while let Ok(frame) = frames.try_recv() {
        println!("{}", frame.payload);
    }
    Ok(())
}

fn parse_correlation_id(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

fn parse_ping_data(raw: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("--data must be JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("--data must be a JSON object, got {other}"),
    }
}
