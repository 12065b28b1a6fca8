use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Fingertip position in device space together with the hand it belongs to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub pos: na::Point3<f64>,
    pub hand_id: i32,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64, hand_id: i32) -> Self {
        Self {
            pos: na::Point3::new(x, y, z),
            hand_id,
        }
    }

    /// Sum of squared per-axis differences.
    #[inline(always)]
    pub fn distance_squared(&self, other: &Point) -> f64 {
        na::distance_squared(&self.pos, &other.pos)
    }
}

/// One observation of a single finger
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub finger_id: i32,
    pub point: Point,
    pub timestamp: u64, // in microseconds
}

impl Sample {
    #[inline]
    pub fn new(finger_id: i32, point: Point, timestamp: u64) -> Self {
        Self {
            finger_id,
            point,
            timestamp,
        }
    }

    #[inline(always)]
    pub fn hand_id(&self) -> i32 {
        self.point.hand_id
    }
}

/// A detected pinch, carrying one of the two converging fingertips
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PinchEvent {
    pub hand_id: i32,
    pub point: Point,
    pub timestamp: u64, // in microseconds
}
