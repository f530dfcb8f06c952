use std::fmt::Write as _;
use std::io::Write as _;

use log::error;

use crate::config::DistanceMode;
use crate::geo::Coordinates;
use crate::messages::BeaconStatus;
use crate::state::TrackerState;

const PLACEHOLDER_DISTANCE: &str = "2.4 km";

/// Anything that can draw a tracker snapshot.
pub trait View: Send {
    fn render(&mut self, state: &TrackerState);
}

fn format_component(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.6}", v))
        .unwrap_or("N/A".to_string())
}

pub fn distance_label(observer: &Coordinates, beacon: &Coordinates, mode: DistanceMode) -> String {
    match mode {
        DistanceMode::Haversine => format!("{:.1} km", observer.distance_km(beacon)),
        DistanceMode::Placeholder => PLACEHOLDER_DISTANCE.to_string(),
    }
}

/// Renders one frame of the tracker as plain text.
pub fn render_to_string(state: &TrackerState, mode: DistanceMode) -> String {
    let mut out = String::new();
    let indicator = match state.beacon_status {
        BeaconStatus::On => "[+]",
        BeaconStatus::Off => "[-]",
    };

    let _ = writeln!(out, "=== Ambulance Tracker ===");
    let _ = writeln!(out, "Status:    {} {}", indicator, state.beacon_status);
    let _ = writeln!(
        out,
        "Latitude:  {}",
        format_component(state.beacon_position.map(|p| p.latitude))
    );
    let _ = writeln!(
        out,
        "Longitude: {}",
        format_component(state.beacon_position.map(|p| p.longitude))
    );

    if let Some((observer, beacon)) = state.map_markers() {
        let _ = writeln!(out, "--- Map ---");
        let _ = writeln!(
            out,
            "  Your Location:      {:.6}, {:.6}",
            observer.latitude, observer.longitude
        );
        let _ = writeln!(
            out,
            "  Ambulance Location: {:.6}, {:.6}",
            beacon.latitude, beacon.longitude
        );
        let _ = writeln!(
            out,
            "  Your location to ambulance: {}",
            distance_label(&observer, &beacon, mode)
        );
        let _ = writeln!(out, "  [c] Close");
    }

    if state.alert_visible {
        let _ = writeln!(out, "!!! Proximity Alert !!!");
        let _ = writeln!(
            out,
            "An ambulance is within 1km of your location. Please proceed with caution."
        );
        let _ = writeln!(out, "  [d] Dismiss   [m] View Map");
    } else {
        let _ = writeln!(out, "[m] View on Map   [q] Quit");
    }
    out
}

/// Writes frames to stdout, skipping frames identical to the last one.
pub struct TerminalView {
    mode: DistanceMode,
    last_frame: Option<String>,
}

impl TerminalView {
    pub fn new(mode: DistanceMode) -> Self {
        TerminalView {
            mode,
            last_frame: None,
        }
    }
}

impl View for TerminalView {
    fn render(&mut self, state: &TrackerState) {
        let frame = render_to_string(state, self.mode);
        if self.last_frame.as_ref() == Some(&frame) {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{}", frame).and_then(|_| stdout.flush()) {
            error!("Error rendering tracker: {:?}", err);
        }
        self.last_frame = Some(frame);
    }
}

#[cfg(test)]
pub mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::messages::{BeaconSnapshot, Event};

    /// Records every snapshot it is asked to render.
    #[derive(Clone, Default)]
    pub struct RecordingView {
        pub frames: Arc<Mutex<Vec<TrackerState>>>,
    }

    impl View for RecordingView {
        fn render(&mut self, state: &TrackerState) {
            self.frames.lock().unwrap().push(state.clone());
        }
    }

    fn mapped_state() -> TrackerState {
        TrackerState::default()
            .apply(Event::BeaconPolled(Ok(BeaconSnapshot {
                status: BeaconStatus::On,
                latitude: Some(12.9),
                longitude: Some(77.6),
            })))
            .apply(Event::LocationRequested)
            .apply(Event::LocationResolved {
                request_id: 1,
                result: Ok(Coordinates::new(12.95, 77.55).unwrap()),
            })
    }

    #[test]
    fn test_initial_frame() {
        let frame = render_to_string(&TrackerState::default(), DistanceMode::Haversine);
        assert!(frame.contains("Status:    [-] OFF"));
        assert!(frame.contains("Latitude:  N/A"));
        assert!(frame.contains("Longitude: N/A"));
        assert!(!frame.contains("Proximity Alert"));
        assert!(!frame.contains("--- Map ---"));
    }

    #[test]
    fn test_alert_frame() {
        let state = TrackerState::default().apply(Event::BeaconPolled(Ok(BeaconSnapshot {
            status: BeaconStatus::On,
            latitude: Some(12.9),
            longitude: Some(77.6),
        })));
        let frame = render_to_string(&state, DistanceMode::Haversine);
        assert!(frame.contains("[+] ON"));
        assert!(frame.contains("Latitude:  12.900000"));
        assert!(frame.contains("Longitude: 77.600000"));
        assert!(frame.contains("Proximity Alert"));
        assert!(frame.contains("[d] Dismiss"));
    }

    #[test]
    fn test_map_frame_distance_modes() {
        let state = mapped_state();
        let frame = render_to_string(&state, DistanceMode::Haversine);
        assert!(frame.contains("--- Map ---"));
        assert!(frame.contains("Your Location:      12.950000, 77.550000"));
        assert!(frame.contains("to ambulance: 7.8 km"));
        assert!(!frame.contains("Proximity Alert"));

        let frame = render_to_string(&state, DistanceMode::Placeholder);
        assert!(frame.contains("to ambulance: 2.4 km"));
    }

    #[test]
    fn test_closed_map_not_rendered() {
        let state = mapped_state().apply(Event::MapClosed);
        let frame = render_to_string(&state, DistanceMode::Haversine);
        assert!(!frame.contains("--- Map ---"));
    }
}
