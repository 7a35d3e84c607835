//! Areas of interest on the stimulus screen.
//!
//! Stimulus objects sit in the screen corners. The `drop` area covers the
//! top-left and bottom-right corners, the `rise` area the top-right and
//! bottom-left corners. Samples in neither area are left out of the
//! area-specific analysis.

use crate::input::types::GazeSample;
use serde::{Deserialize, Serialize};

/// Area of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Drop,
    Rise,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Drop, Region::Rise];

    pub fn name(&self) -> &'static str {
        match self {
            Region::Drop => "drop",
            Region::Rise => "rise",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(Region::Drop),
            "rise" => Ok(Region::Rise),
            other => Err(format!("unknown region '{other}'")),
        }
    }
}

/// Screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenGeometry {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 1024.0,
        }
    }
}

/// Inner corner lines of the four corner quadrants.
///
/// A point is in a corner when it lies strictly beyond both of that
/// corner's lines. Bounds must satisfy `x_low <= x_high` and
/// `y_low <= y_high`, which keeps the two areas disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AoiBounds {
    pub x_low: f64,
    pub x_high: f64,
    pub y_low: f64,
    pub y_high: f64,
}

impl Default for AoiBounds {
    fn default() -> Self {
        Self::corner_objects()
    }
}

impl AoiBounds {
    /// Quadrants around the corner stimulus objects on a 1280x1024 screen.
    pub fn corner_objects() -> Self {
        Self {
            x_low: 478.0,
            x_high: 802.0,
            y_low: 382.0,
            y_high: 642.0,
        }
    }

    /// The full screen split into four quadrants at its centre.
    pub fn screen_quadrants(screen: &ScreenGeometry) -> Self {
        let cx = screen.width / 2.0;
        let cy = screen.height / 2.0;
        Self {
            x_low: cx,
            x_high: cx,
            y_low: cy,
            y_high: cy,
        }
    }

    /// Whether the bounds keep the drop and rise areas disjoint.
    pub fn is_well_formed(&self) -> bool {
        self.x_low <= self.x_high && self.y_low <= self.y_high
    }

    /// Area containing a screen point, if any.
    pub fn classify(&self, x: f64, y: f64) -> Option<Region> {
        let left = x < self.x_low;
        let right = x > self.x_high;
        let top = y < self.y_low;
        let bottom = y > self.y_high;

        if (left && top) || (right && bottom) {
            Some(Region::Drop)
        } else if (right && top) || (left && bottom) {
            Some(Region::Rise)
        } else {
            None
        }
    }
}

/// Samples of one phase split by area of interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionPartition {
    pub drop: Vec<GazeSample>,
    pub rise: Vec<GazeSample>,
}

impl RegionPartition {
    pub fn region(&self, region: Region) -> &[GazeSample] {
        match region {
            Region::Drop => &self.drop,
            Region::Rise => &self.rise,
        }
    }
}

/// Split samples into the drop and rise areas, keeping recorded order.
pub fn partition(samples: &[GazeSample], bounds: &AoiBounds) -> RegionPartition {
    let mut parts = RegionPartition::default();
    for sample in samples {
        match bounds.classify(sample.x, sample.y) {
            Some(Region::Drop) => parts.drop.push(*sample),
            Some(Region::Rise) => parts.rise.push(*sample),
            None => {}
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_classification() {
        let b = AoiBounds::corner_objects();
        assert_eq!(b.classify(100.0, 100.0), Some(Region::Drop)); // top-left
        assert_eq!(b.classify(1000.0, 900.0), Some(Region::Drop)); // bottom-right
        assert_eq!(b.classify(1000.0, 100.0), Some(Region::Rise)); // top-right
        assert_eq!(b.classify(100.0, 900.0), Some(Region::Rise)); // bottom-left
    }

    #[test]
    fn test_outside_both_regions() {
        let b = AoiBounds::corner_objects();
        assert_eq!(b.classify(640.0, 512.0), None); // centre
        assert_eq!(b.classify(100.0, 512.0), None); // left edge band
        assert_eq!(b.classify(478.0, 100.0), None); // on the boundary line
        assert_eq!(b.classify(640.0, 100.0), None); // top centre

        let samples = vec![GazeSample::new(0.0, 640.0, 512.0)];
        let parts = partition(&samples, &b);
        assert!(parts.drop.is_empty());
        assert!(parts.rise.is_empty());
    }

    #[test]
    fn test_regions_are_disjoint() {
        for bounds in [
            AoiBounds::corner_objects(),
            AoiBounds::screen_quadrants(&ScreenGeometry::default()),
        ] {
            let mut samples = Vec::new();
            for xi in -2..=66 {
                for yi in -2..=53 {
                    samples.push(GazeSample::new(0.0, xi as f64 * 20.0, yi as f64 * 20.0));
                }
            }

            let parts = partition(&samples, &bounds);
            for s in &parts.drop {
                assert!(!parts.rise.contains(s), "{s:?} in both regions");
            }
            assert!(parts.drop.len() + parts.rise.len() <= samples.len());
            assert!(!parts.drop.is_empty() && !parts.rise.is_empty());
        }
    }

    #[test]
    fn test_screen_quadrants() {
        let b = AoiBounds::screen_quadrants(&ScreenGeometry::default());
        assert_eq!(b.x_low, 640.0);
        assert_eq!(b.y_high, 512.0);
        assert_eq!(b.classify(639.0, 511.0), Some(Region::Drop));
        assert_eq!(b.classify(641.0, 511.0), Some(Region::Rise));
        assert_eq!(b.classify(640.0, 300.0), None);
    }

    #[test]
    fn test_partition_keeps_order() {
        let samples = vec![
            GazeSample::new(0.0, 100.0, 100.0),
            GazeSample::new(0.1, 1000.0, 100.0),
            GazeSample::new(0.2, 1000.0, 900.0),
        ];
        let parts = partition(&samples, &AoiBounds::default());
        assert_eq!(parts.region(Region::Drop).len(), 2);
        assert_eq!(parts.drop[0].time, 0.0);
        assert_eq!(parts.drop[1].time, 0.2);
        assert_eq!(parts.region(Region::Rise).len(), 1);
    }

    #[test]
    fn test_malformed_bounds() {
        let b = AoiBounds {
            x_low: 900.0,
            ..AoiBounds::default()
        };
        assert!(!b.is_well_formed());
        assert!(AoiBounds::default().is_well_formed());
    }
}
