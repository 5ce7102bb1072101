//! Runtime - the task that owns a `QueueCore`.
//!
//! One loop multiplexes every input the queue reacts to:
//! 1. commands from `QueueHandle`s
//! 2. events from perform tasks and watchdogs
//! 3. the periodic scheduling tick
//! 4. connectivity changes
//! 5. shutdown
//!
//! Handlers never await, so callbacks into the observer run one at a time and
//! in the order the inputs were received.

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::handle::Command;
use crate::ports::ConnectivityStatus;
use crate::queue::{QueueCore, QueueEvent};

pub(crate) struct RuntimeChannels {
    pub commands: mpsc::UnboundedReceiver<Command>,
    pub events: mpsc::UnboundedReceiver<QueueEvent>,
    pub connectivity: Option<watch::Receiver<ConnectivityStatus>>,
    pub shutdown: watch::Receiver<bool>,
}

pub(crate) async fn run(mut core: QueueCore, channels: RuntimeChannels) {
    let RuntimeChannels {
        mut commands,
        mut events,
        mut connectivity,
        mut shutdown,
    } = channels;

    // The first tick completes immediately, which doubles as the startup pass.
    let mut ticker = tokio::time::interval(core.config().submission_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if let Some(rx) = connectivity.as_mut() {
        let status = *rx.borrow_and_update();
        core.connectivity_changed(status);
    }

    info!(queue = %core.name(), "queue runtime started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown.changed() => {
                // sender dropped: the owning `Queue` is gone
                if changed.is_err() {
                    break;
                }
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!(queue = %core.name(), "all handles dropped");
                    break;
                };
                apply(&mut core, command);
            }
            Some(event) = events.recv() => core.handle_event(event),
            _ = ticker.tick() => core.attempt_next(),
            status = next_status(&mut connectivity) => core.connectivity_changed(status),
        }
    }

    core.shutdown();
}

fn apply(core: &mut QueueCore, command: Command) {
    match command {
        Command::Enqueue {
            records,
            start_immediately,
        } => core.enqueue(records, start_immediately),
        Command::AttemptNext => core.attempt_next(),
        Command::ModifyPending(transform) => core.modify_pending(transform),
        Command::ClearAll => core.clear_all(),
        Command::Snapshot(reply) => {
            let _ = reply.send(core.snapshot());
        }
    }
}

/// Next connectivity report. Pends forever once the monitor goes away.
async fn next_status(slot: &mut Option<watch::Receiver<ConnectivityStatus>>) -> ConnectivityStatus {
    loop {
        let Some(rx) = slot.as_mut() else {
            return std::future::pending().await;
        };
        if rx.changed().await.is_ok() {
            return *rx.borrow_and_update();
        }
        *slot = None;
    }
}
