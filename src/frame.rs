use crate::error::Error;
use crate::sample::{Point, Sample};
use serde_derive::{Deserialize, Serialize};

/// Hand id reported for pointables that are not attached to any hand.
pub const NO_HAND: i32 = -1;

/// Tracked fingertip as reported by the device
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pointable {
    pub id: i32,
    pub hand_id: i32,
    pub tip_position: [f64; 3],
}

impl Pointable {
    #[inline]
    pub fn has_hand(&self) -> bool {
        self.hand_id != NO_HAND
    }
}

/// One snapshot of every visible pointable.
///
/// Field names follow the device's JSON frame layout so a recorded frame
/// deserializes directly; fields the detector does not need are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Frame {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub timestamp: u64, // in microseconds
    #[serde(default)]
    pub pointables: Vec<Pointable>,
}

impl Frame {
    pub fn from_json(src: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(src)?)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pointables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pointables.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Pointable> {
        self.pointables.iter()
    }

    /// Samples of every pointable attached to a hand, stamped with the frame time.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.pointables
            .iter()
            .filter(|p| p.has_hand())
            .map(move |p| {
                let [x, y, z] = p.tip_position;
                Sample::new(p.id, Point::new(x, y, z, p.hand_id), self.timestamp)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_FRAME: &str = r#"{
        "currentFrameRate": 110.2,
        "id": 8841,
        "timestamp": 1700050,
        "hands": [{"id": 7, "palmPosition": [0.0, 180.0, 0.0]}],
        "pointables": [
            {"id": 70, "handId": 7, "length": 48.1, "tipPosition": [-12.5, 190.0, 3.25], "tool": false},
            {"id": 71, "handId": 7, "tipPosition": [10.0, 185.5, -4.0]},
            {"id": 90, "handId": -1, "tipPosition": [0.0, 0.0, 0.0], "tool": true}
        ]
    }"#;

    #[test]
    fn decodes_device_frame() {
        let frame = Frame::from_json(DEVICE_FRAME).unwrap();
        assert_eq!(frame.id, 8841);
        assert_eq!(frame.timestamp, 1_700_050);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.pointables[1].hand_id, 7);
        assert_eq!(frame.pointables[0].tip_position, [-12.5, 190.0, 3.25]);
    }

    #[test]
    fn samples_skip_handless_pointables() {
        let frame = Frame::from_json(DEVICE_FRAME).unwrap();
        let samples: Vec<_> = frame.samples().collect();

        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.hand_id() == 7));
        assert!(samples.iter().all(|s| s.timestamp == 1_700_050));
        assert_eq!(samples[1].finger_id, 71);
        assert_eq!(samples[1].point.pos.y, 185.5);
    }

    #[test]
    fn frame_without_pointables_is_empty() {
        let frame = Frame::from_json(r#"{"id": 1, "timestamp": 5}"#).unwrap();
        assert!(frame.is_empty());
        assert!(Frame::from_json("{not json").is_err());
    }
}
