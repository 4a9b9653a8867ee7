//! Terminal front end for the todo list.
//!
//! Reads one intent per line from stdin and redraws the list after each.

mod intent;
mod render;
mod session;

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use todo_core::config::parse_owner_tag;
use todo_core::{
    ClientConfig, HttpItemStore, ItemStore, MemoryItemStore, NotificationLog, TodoSync,
    TracingNotifier,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use session::{Flow, Session};

/// Terminal todo list backed by an item store
#[derive(Parser, Debug)]
#[command(name = "todo-shell")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the item store (overrides TODO_STORE_URL)
    #[arg(long)]
    store_url: Option<String>,

    /// Owner tag attached to created items (overrides TODO_OWNER_TAG)
    #[arg(long)]
    owner_tag: Option<String>,

    /// Keep items in this process instead of talking to a store
    #[arg(long)]
    memory: bool,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they do not interleave with the rendered list.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ClientConfig::from_env().context("reading client configuration")?;
    if let Some(url) = args.store_url {
        config.store_url = url;
    }
    if let Some(raw) = args.owner_tag.as_deref() {
        config.owner_tag = parse_owner_tag(raw).context("parsing --owner-tag")?;
    }

    if args.memory {
        info!("using in-memory store");
        run(MemoryItemStore::new(), &config).await
    } else {
        info!(url = %config.store_url, "using remote store");
        run(HttpItemStore::connect(&config.store_url), &config).await
    }
}

async fn run<S: ItemStore>(store: S, config: &ClientConfig) -> anyhow::Result<()> {
    let notifier = (NotificationLog::new(), TracingNotifier);
    let sync = TodoSync::new(store, notifier).with_owner_tag(config.owner_tag);
    let session = Session::new(sync);

    show(&session.start().await)?;
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let (flow, output) = session.handle_line(&line).await;
        if flow == Flow::Quit {
            break;
        }
        show(&output)?;
    }
    Ok(())
}

fn show(screen: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{screen}")?;
    stdout.flush()?;
    Ok(())
}
