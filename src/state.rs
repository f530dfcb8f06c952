//! Tracker state and its transition function.
//!
//! [`TrackerState::apply`] is the only way state changes. It is pure apart
//! from logging, so every transition can be exercised without a network,
//! a location host or a terminal.

use log::{debug, info, warn};

use crate::geo::Coordinates;
use crate::messages::{BeaconStatus, Event, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerState {
    pub beacon_status: BeaconStatus,
    pub beacon_position: Option<Coordinates>,
    pub observer_position: Option<Coordinates>,
    pub alert_visible: bool,
    pub map_visible: bool,
    /// Id of the most recently issued location request, 0 before the first.
    pub latest_request: RequestId,
    pub session_open: bool,
}

impl Default for TrackerState {
    fn default() -> Self {
        TrackerState {
            beacon_status: BeaconStatus::Off,
            beacon_position: None,
            observer_position: None,
            alert_visible: false,
            map_visible: false,
            latest_request: 0,
            session_open: true,
        }
    }
}

impl TrackerState {
    pub fn apply(mut self, event: Event) -> Self {
        if !self.session_open {
            debug!("Session closed, dropping {:?}", event);
            return self;
        }

        match event {
            Event::BeaconPolled(Ok(snapshot)) => {
                debug!("Beacon snapshot: {:?}", snapshot);
                self.beacon_status = snapshot.status;
                self.beacon_position = snapshot.position();
                // Re-asserted on every ON poll, even after a dismissal.
                if self.beacon_status == BeaconStatus::On {
                    self.alert_visible = true;
                }
            }
            Event::BeaconPolled(Err(err)) => {
                warn!("Error fetching beacon status: {}", err);
            }
            Event::LocationRequested => {
                self.latest_request += 1;
                debug!("Issued location request {}", self.latest_request);
            }
            Event::LocationResolved { request_id, result } => {
                if request_id != self.latest_request {
                    debug!(
                        "Discarding stale location result {} (latest is {})",
                        request_id, self.latest_request
                    );
                    return self;
                }
                match result {
                    Ok(coords) => {
                        info!(
                            "Observer located at {:.6}, {:.6}",
                            coords.latitude, coords.longitude
                        );
                        self.observer_position = Some(coords);
                        self.map_visible = true;
                        self.alert_visible = false;
                    }
                    Err(err) => warn!("Error getting observer location: {}", err),
                }
            }
            Event::AlertDismissed => self.alert_visible = false,
            Event::MapClosed => self.map_visible = false,
            Event::SessionClosed => {
                info!("Tracker session closed");
                self.session_open = false;
            }
        }
        self
    }

    /// Both positions, if the map panel should be drawn at all.
    pub fn map_markers(&self) -> Option<(Coordinates, Coordinates)> {
        if !self.map_visible {
            return None;
        }
        self.observer_position.zip(self.beacon_position)
    }
}
