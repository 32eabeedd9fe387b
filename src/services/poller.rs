use std::{future::Future, sync::Arc, time::Duration};

use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::{error::ApiError, services::api::ApiClient, services::board::BoardSnapshot};

/// Fetches rooms and bookings together. Either both land or neither does.
pub async fn fetch_snapshot(api: &ApiClient) -> Result<BoardSnapshot, ApiError> {
    let (rooms, bookings) = tokio::try_join!(api.list_rooms(), api.list_bookings())?;
    Ok(BoardSnapshot::new(rooms, bookings))
}

/// Handle to a running poller. Dropping it also stops the task.
pub struct PollerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
    snapshots: watch::Receiver<Arc<BoardSnapshot>>,
}

impl PollerHandle {
    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardSnapshot>> {
        self.snapshots.clone()
    }

    pub fn current(&self) -> Arc<BoardSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Stops polling, superseding any fetch still in flight, and waits for the task to end.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!("Poller task ended abnormally: {e}");
        }
    }
}

pub struct Poller;

impl Poller {
    /// Spawn a background task that calls `fetch` every `interval`, starting
    /// immediately. Fetches never overlap: a tick that comes due while one is
    /// running is skipped. A failed fetch leaves the previous snapshot in place.
    pub fn spawn<F, Fut>(interval: Duration, mut fetch: F) -> PollerHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<BoardSnapshot, ApiError>> + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(BoardSnapshot::default()));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {}
                }

                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = fetch() => match result {
                        Ok(snapshot) => {
                            debug!(
                                "Board refreshed: {} rooms, {} bookings",
                                snapshot.rooms.len(),
                                snapshot.bookings.len()
                            );
                            snapshot_tx.send_replace(Arc::new(snapshot));
                        }
                        Err(e) => warn!("Board refresh failed, keeping previous data: {e}"),
                    },
                }
            }
            info!("Poller stopped");
        });

        PollerHandle {
            shutdown: shutdown_tx,
            task,
            snapshots: snapshot_rx,
        }
    }

    /// Polls `api` for rooms and bookings.
    pub fn spawn_for(api: ApiClient, interval: Duration) -> PollerHandle {
        Self::spawn(interval, move || {
            let api = api.clone();
            async move { fetch_snapshot(&api).await }
        })
    }
}
