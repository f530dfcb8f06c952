use serde_derive::Deserialize;

use crate::geo::Coordinates;
use crate::location::LocationError;
use crate::remote::PollError;

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BeaconStatus {
    #[serde(rename = "ON")]
    On,
    #[default]
    #[serde(rename = "OFF")]
    Off,
}

impl std::fmt::Display for BeaconStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeaconStatus::On => write!(f, "ON"),
            BeaconStatus::Off => write!(f, "OFF"),
        }
    }
}

/// One poll's worth of beacon state, as returned by the status endpoint.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct BeaconSnapshot {
    pub status: BeaconStatus,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl BeaconSnapshot {
    /// Position carried by the snapshot, if both halves are present and in range.
    pub fn position(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
            _ => None,
        }
    }
}

/// Identifies one observer location request. Ids only ever increase.
pub type RequestId = u64;

/// Everything that can change tracker state, serialized onto one queue.
#[derive(Debug)]
pub enum Event {
    BeaconPolled(Result<BeaconSnapshot, PollError>),
    LocationRequested,
    LocationResolved {
        request_id: RequestId,
        result: Result<Coordinates, LocationError>,
    },
    AlertDismissed,
    MapClosed,
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_json() {
        let snapshot: BeaconSnapshot =
            serde_json::from_str(r#"{"status":"ON","latitude":12.9,"longitude":77.6}"#).unwrap();
        assert_eq!(snapshot.status, BeaconStatus::On);
        assert_eq!(snapshot.position(), Coordinates::new(12.9, 77.6));
    }

    #[test]
    fn test_snapshot_null_and_missing_coordinates() {
        let snapshot: BeaconSnapshot =
            serde_json::from_str(r#"{"status":"OFF","latitude":null}"#).unwrap();
        assert_eq!(snapshot.status, BeaconStatus::Off);
        assert_eq!(snapshot.latitude, None);
        assert_eq!(snapshot.longitude, None);
        assert_eq!(snapshot.position(), None);
    }

    #[test]
    fn test_snapshot_half_or_out_of_range_position() {
        let half = BeaconSnapshot {
            status: BeaconStatus::On,
            latitude: Some(12.9),
            longitude: None,
        };
        assert_eq!(half.position(), None);

        let bogus = BeaconSnapshot {
            status: BeaconStatus::On,
            latitude: Some(120.0),
            longitude: Some(77.6),
        };
        assert_eq!(bogus.position(), None);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result: Result<BeaconSnapshot, _> = serde_json::from_str(r#"{"status":"MAYBE"}"#);
        assert!(result.is_err());
    }
}
