//! Background persistence writer
//!
//! Mutations hand snapshots to a single task over an unbounded channel. The
//! task applies them in order, so the last snapshot sent for a collection is
//! the one that ends up stored.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::storage::PersistenceGateway;
use crate::shared::settings::ToolkitSettings;
use crate::shared::types::{ConversionHistoryEntry, ConversionPreset, CounterItem, CustomUnit, StopwatchLog};

#[derive(Debug)]
pub(crate) enum PersistCommand {
    Settings(ToolkitSettings),
    Favorites(Vec<ConversionPreset>),
    History(Vec<ConversionHistoryEntry>),
    Counters(Vec<CounterItem>),
    CustomUnits(Vec<CustomUnit>),
    StopwatchLogs(Vec<StopwatchLog>),
    /// Acknowledged once every earlier command has been applied.
    Flush(oneshot::Sender<()>),
}

pub(crate) struct PersistenceWriter {
    tx: mpsc::UnboundedSender<PersistCommand>,
    task: JoinHandle<()>,
}

impl PersistenceWriter {
    /// Spawn the writer task on the current runtime.
    pub(crate) fn spawn(gateway: PersistenceGateway) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(gateway, rx));
        Self { tx, task }
    }

    pub(crate) fn send(&self, command: PersistCommand) {
        if self.tx.send(command).is_err() {
            debug!("persistence writer stopped, save dropped");
        }
    }

    pub(crate) async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    /// Close the channel and wait for the task to drain it. The gateway, and
    /// with it the blob store, is released once this returns.
    pub(crate) async fn shutdown(self) {
        let Self { tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            debug!(error = %e, "persistence writer task failed");
        }
    }
}

async fn run(gateway: PersistenceGateway, mut rx: mpsc::UnboundedReceiver<PersistCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            PersistCommand::Settings(settings) => gateway.save_settings(&settings).await,
            PersistCommand::Favorites(favorites) => gateway.save_favorites(&favorites).await,
            PersistCommand::History(history) => gateway.save_history(&history).await,
            PersistCommand::Counters(counters) => gateway.save_counters(&counters).await,
            PersistCommand::CustomUnits(units) => gateway.save_custom_units(&units).await,
            PersistCommand::StopwatchLogs(logs) => gateway.save_stopwatch_logs(&logs).await,
            PersistCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("persistence writer finished");
}
