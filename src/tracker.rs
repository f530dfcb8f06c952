use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::commands::UserCommand;
use crate::location::LocationProvider;
use crate::messages::{Event, RequestId};
use crate::remote::RemoteStateClient;
use crate::state::TrackerState;
use crate::view::View;

const EVENT_QUEUE_DEPTH: usize = 32;

/// Owns the tracker state and feeds it from the poll timer, location
/// acquisitions and user commands, one event at a time.
pub struct Tracker<C, L, V> {
    client: Arc<C>,
    location: Arc<L>,
    view: V,
    poll_interval: Duration,
}

fn spawn_poller<C>(
    client: Arc<C>,
    poll_interval: Duration,
    tx: mpsc::Sender<Event>,
) -> JoinHandle<()>
where
    C: RemoteStateClient + 'static,
{
    tokio::task::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        // A slow poll delays the next tick rather than stacking requests.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let result = client.poll().await;
            if tx.send(Event::BeaconPolled(result)).await.is_err() {
                debug!("Event queue closed, stopping poller");
                break;
            }
        }
    })
}

fn spawn_acquisition<L>(
    location: Arc<L>,
    request_id: RequestId,
    alive: watch::Receiver<bool>,
    tx: mpsc::Sender<Event>,
) where
    L: LocationProvider + 'static,
{
    tokio::task::spawn(async move {
        let result = location.acquire().await;
        if !*alive.borrow() {
            debug!("Session ended, discarding location result {}", request_id);
            return;
        }
        let _ = tx
            .send(Event::LocationResolved { request_id, result })
            .await;
    });
}

impl<C, L, V> Tracker<C, L, V>
where
    C: RemoteStateClient + 'static,
    L: LocationProvider + 'static,
    V: View,
{
    pub fn new(client: Arc<C>, location: Arc<L>, view: V, poll_interval: Duration) -> Self {
        Tracker {
            client,
            location,
            view,
            poll_interval,
        }
    }

    /// Runs until a [`UserCommand::Quit`] arrives or the command channel
    /// closes, then tears down and returns the final state.
    pub async fn run_loop(mut self, mut commands: mpsc::Receiver<UserCommand>) -> TrackerState {
        let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let (alive_tx, alive_rx) = watch::channel(true);

        let mut state = TrackerState::default();
        self.view.render(&state);

        let poller = spawn_poller(self.client.clone(), self.poll_interval, tx.clone());
        info!("Polling beacon every {:?}", self.poll_interval);

        loop {
            let event = tokio::select! {
                Some(event) = rx.recv() => event,
                command = commands.recv() => match command {
                    Some(UserCommand::RequestLocation) => Event::LocationRequested,
                    Some(UserCommand::DismissAlert) => Event::AlertDismissed,
                    Some(UserCommand::CloseMap) => Event::MapClosed,
                    Some(UserCommand::Quit) | None => break,
                },
            };

            let requested = matches!(event, Event::LocationRequested);
            state = state.apply(event);
            if requested {
                spawn_acquisition(
                    self.location.clone(),
                    state.latest_request,
                    alive_rx.clone(),
                    tx.clone(),
                );
            }
            self.view.render(&state);
        }

        info!("Stopping tracker");
        poller.abort();
        let _ = alive_tx.send(false);
        state.apply(Event::SessionClosed)
    }
}
