use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};

use crate::board_view::{BoardView, RenderAdapter};
use crate::config::GameConfig;
use crate::game::LossReason;
use crate::input::{Key, apply_key};
use crate::instance::InstanceContext;
use crate::log;
use crate::store::StoreError;
use crate::tick::{TickDriver, TickOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Lost(LossReason),
    Shutdown,
}

/// Drives one instance until the game is lost or `shutdown` resolves: frames
/// at `frame_interval`, registry heartbeats at `heartbeat_interval`, and keys
/// as they arrive. Every frame's view goes to `renderer`. The receiver is
/// borrowed so the caller can run the instance again after a restart.
pub async fn run_instance<R, F>(
    ctx: &mut InstanceContext,
    config: &GameConfig,
    renderer: &mut R,
    keys: &mut mpsc::UnboundedReceiver<Key>,
    shutdown: F,
) -> Result<RunOutcome, StoreError>
where
    R: RenderAdapter,
    F: Future<Output = ()>,
{
    let mut driver = TickDriver::new(config.tick_interval());
    let mut frames = interval(config.frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut heartbeats = interval(config.heartbeat_interval());
    heartbeats.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let started = Instant::now();
    let mut keys_open = true;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => return Ok(RunOutcome::Shutdown),
            _ = frames.tick() => match driver.frame(ctx, started.elapsed()) {
                Ok(frame) => {
                    if let Some(state) = &frame.state {
                        let view = BoardView::for_instance(state, ctx.instance_id());
                        renderer.render(ctx.instance_id(), &view);
                    }
                    if let TickOutcome::Lost(reason) = frame.outcome {
                        return Ok(RunOutcome::Lost(reason));
                    }
                }
                // An unreadable store skips the frame; the next one reads again.
                Err(StoreError::Io(e)) => {
                    log!("[{}] store unavailable, frame skipped: {}", ctx.instance_id(), e);
                }
                Err(e) => return Err(e),
            },
            _ = heartbeats.tick() => {
                if let Err(e) = ctx.heartbeat() {
                    log!("[{}] heartbeat failed: {}", ctx.instance_id(), e);
                }
            }
            key = keys.recv(), if keys_open => match key {
                Some(key) => {
                    if let Err(e) = apply_key(ctx, key) {
                        log!("[{}] could not apply {:?}: {}", ctx.instance_id(), key, e);
                    }
                }
                None => keys_open = false,
            },
        }
    }
}
