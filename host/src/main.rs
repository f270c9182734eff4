mod terminal_renderer;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use common::config::{ConfigManager, GameConfig};
use common::id_generator::generate_instance_id;
use common::input::Key;
use common::instance::{InstanceContext, TeardownMode};
use common::registry::Geometry;
use common::runtime::{RunOutcome, run_instance};
use common::store::{DirectoryStore, MemoryStore, SharedStore};
use common::{logger, log, InstanceId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use terminal_renderer::TerminalRenderer;

#[derive(Parser)]
#[command(name = "window_snake")]
struct Args {
    #[arg(long, default_value = "window_snake.yaml")]
    config: PathBuf,
    #[arg(long)]
    use_log_prefix: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Run every configured instance in this process over one in-memory store.
    Simulate,
    /// Run one instance against a session directory shared with other processes.
    Join {
        /// Screen geometry as `x,y,width,height`.
        #[arg(long, value_parser = parse_geometry)]
        geometry: Geometry,
        #[arg(long)]
        store_dir: Option<PathBuf>,
        /// Wipe the whole session on exit instead of only deregistering.
        #[arg(long)]
        clear_on_exit: bool,
    },
}

fn parse_geometry(value: &str) -> Result<Geometry, String> {
    let parts: Vec<i32> = value
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("Invalid geometry {:?}: {}", value, e))?;
    match parts.as_slice() {
        &[x, y, width, height] if width > 0 && height > 0 => Ok(Geometry::new(x, y, width, height)),
        _ => Err(format!("Geometry must be x,y,width,height with a positive size, got {:?}", value)),
    }
}

const RESTART_COMMANDS: [&str; 2] = ["r", "restart"];

/// Reads one command per stdin line: a key for every instance, or a restart
/// request when `restarts` is given.
fn spawn_key_reader(
    senders: Vec<mpsc::UnboundedSender<Key>>,
    restarts: Option<mpsc::UnboundedSender<()>>,
) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let restart = restarts
                .as_ref()
                .filter(|_| RESTART_COMMANDS.contains(&line.trim()));
            if let Some(restarts) = restart {
                let _ = restarts.send(());
                continue;
            }
            match line.parse::<Key>() {
                Ok(key) => {
                    for sender in &senders {
                        let _ = sender.send(key);
                    }
                }
                Err(e) => log!("{}", e),
            }
        }
    });
}

fn shutdown_signal(mut receiver: watch::Receiver<bool>) -> impl Future<Output = ()> {
    async move {
        let _ = receiver.wait_for(|stop| *stop).await;
    }
}

fn report(outcome: RunOutcome) {
    match outcome {
        RunOutcome::Lost(reason) => println!("You lost: {}.", reason),
        RunOutcome::Shutdown => log!("Stopped"),
    }
}

async fn simulate(config: GameConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.instances.is_empty() {
        return Err("No instances configured for simulate".into());
    }

    let store = MemoryStore::new();
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut key_senders = Vec::new();
    let mut tasks = JoinSet::new();

    for instance in &config.instances {
        let instance_id = instance
            .id
            .clone()
            .map(InstanceId::from)
            .unwrap_or_else(generate_instance_id);
        let mut ctx = InstanceContext::new(
            Arc::new(store.clone()),
            instance_id,
            instance.geometry,
            config.handoff.into(),
        );
        ctx.announce()?;
        let seed = ctx.rng().seed();
        log!(
            "{} joined at {:?}, apple seed {}",
            ctx.instance_id(),
            instance.geometry,
            seed
        );

        let (key_tx, mut key_rx) = mpsc::unbounded_channel();
        key_senders.push(key_tx);
        let config = config.clone();
        let shutdown = shutdown_signal(stop_rx.clone());
        tasks.spawn(async move {
            let mut renderer = TerminalRenderer::new(false);
            run_instance(&mut ctx, &config, &mut renderer, &mut key_rx, shutdown).await
        });
    }

    spawn_key_reader(key_senders, None);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    let mut first_outcome = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined??;
        first_outcome.get_or_insert(outcome);
    }
    store.clear()?;

    if let Some(outcome) = first_outcome {
        report(outcome);
    }
    Ok(())
}

async fn join(
    config: GameConfig,
    geometry: Geometry,
    store_dir: PathBuf,
    clear_on_exit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = DirectoryStore::open(&store_dir)?;
    let mut ctx = InstanceContext::new(
        Arc::new(store),
        generate_instance_id(),
        geometry,
        config.handoff.into(),
    );
    ctx.announce()?;
    let seed = ctx.rng().seed();
    log!(
        "{} joined session {}, apple seed {}",
        ctx.instance_id(),
        store_dir.display(),
        seed
    );

    let (key_tx, mut key_rx) = mpsc::unbounded_channel();
    let (restart_tx, mut restart_rx) = mpsc::unbounded_channel();
    spawn_key_reader(vec![key_tx], Some(restart_tx));

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    let mut renderer = TerminalRenderer::new(true);
    let outcome = loop {
        let outcome = run_instance(
            &mut ctx,
            &config,
            &mut renderer,
            &mut key_rx,
            shutdown_signal(stop_rx.clone()),
        )
        .await;
        let Ok(RunOutcome::Lost(reason)) = outcome else {
            break outcome;
        };

        println!("You lost: {}. Type 'r' to restart.", reason);
        while restart_rx.try_recv().is_ok() {}
        tokio::select! {
            request = restart_rx.recv() => match request {
                Some(()) => {
                    if let Err(e) = ctx.restart() {
                        break Err(e);
                    }
                    log!("{} restarted the session", ctx.instance_id());
                }
                None => break outcome,
            },
            _ = shutdown_signal(stop_rx.clone()) => break outcome,
        }
    };

    let mode = if clear_on_exit {
        TeardownMode::ClearStore
    } else {
        TeardownMode::Deregister
    };
    if let Err(e) = ctx.teardown(mode) {
        log!("Teardown failed: {}", e);
    }

    report(outcome?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("WindowSnake".to_string())
    } else {
        None
    };
    logger::init_logger(prefix, logger::LogSink::Stderr);

    let config = ConfigManager::<_, GameConfig, _>::from_yaml_file(&args.config).get_config()?;

    match args.mode {
        Mode::Simulate => simulate(config).await,
        Mode::Join {
            geometry,
            store_dir,
            clear_on_exit,
        } => {
            let store_dir = store_dir
                .or_else(|| config.store_dir.clone().map(PathBuf::from))
                .ok_or("Join needs --store-dir or store_dir in the config")?;
            join(config, geometry, store_dir, clear_on_exit).await
        }
    }
}
