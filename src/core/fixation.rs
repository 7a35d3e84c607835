//! Dispersion-threshold fixation detection.
//!
//! A single pass over the samples keeps an anchor sample and opens a
//! candidate fixation as soon as a sample lies within `max_dispersion` of
//! the anchor. The candidate closes at the first sample beyond that
//! distance and is kept if it lasted at least `min_duration`.
//!
//! Two properties are part of the output contract:
//! - a fixation reports the anchor sample's coordinate, not a centroid;
//! - a candidate still open when the samples run out is never emitted.

use crate::input::types::GazeSample;
use serde::{Deserialize, Serialize};

/// Detector thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Maximum distance from the anchor sample, in screen pixels
    pub max_dispersion: f64,
    /// Minimum fixation duration, in seconds
    pub min_duration: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            max_dispersion: 25.0,
            min_duration: 0.25,
        }
    }
}

/// A detected fixation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fixation {
    pub start: f64,
    pub end: f64,
    /// Always `end - start`
    pub duration: f64,
    /// Anchor sample coordinates
    pub x: f64,
    pub y: f64,
}

/// Detect fixations in a time-ordered sample sequence.
///
/// Coordinates are used as given; see [`FixationDetector`] for the
/// screen-space variant that flips the vertical axis first.
pub fn detect_fixations(samples: &[GazeSample], params: &DetectorParams) -> Vec<Fixation> {
    let mut fixations = Vec::new();
    let mut anchor = 0;
    let mut open_start: Option<f64> = None;

    for i in 1..samples.len() {
        let dist = samples[anchor].distance(&samples[i]);

        match open_start {
            None if dist <= params.max_dispersion => {
                anchor = i;
                open_start = Some(samples[i].time);
            }
            Some(start) if dist > params.max_dispersion => {
                let end = samples[i - 1].time;
                if end - start >= params.min_duration {
                    fixations.push(Fixation {
                        start,
                        end,
                        duration: end - start,
                        x: samples[anchor].x,
                        y: samples[anchor].y,
                    });
                }
                anchor = i;
                open_start = None;
            }
            // walk the anchor forward while nothing is open
            None => anchor += 1,
            Some(_) => {}
        }
    }

    fixations
}

/// Flip the vertical axis from a top-left to a bottom-left origin.
pub fn flip_vertical(samples: &[GazeSample], screen_height: f64) -> Vec<GazeSample> {
    samples
        .iter()
        .map(|s| GazeSample::new(s.time, s.x, screen_height - s.y))
        .collect()
}

/// Fixation detection on screen-space samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixationDetector {
    params: DetectorParams,
    screen_height: f64,
}

impl FixationDetector {
    pub fn new(params: DetectorParams, screen_height: f64) -> Self {
        Self {
            params,
            screen_height,
        }
    }

    /// Detect fixations after flipping `y` to a bottom-left origin.
    ///
    /// Reported `y` coordinates are in the flipped space.
    pub fn detect(&self, samples: &[GazeSample]) -> Vec<Fixation> {
        detect_fixations(&flip_vertical(samples, self.screen_height), &self.params)
    }
}

impl Default for FixationDetector {
    fn default() -> Self {
        Self::new(DetectorParams::default(), 1024.0)
    }
}
