//! Frame sets and timing

use std::ops::Range;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::SkinId;

/// Class toggled on the element while a non-default skin "talks"
pub const ROCKING_CLASS: &str = "rocking-animation";

/// Image paths for the base skin's animation frames
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MascotFrames {
    /// Resting frame
    pub default: String,
    /// Eyes-closed frame
    pub blinking: String,
    /// Mouth-open frame
    pub talking: String,
}

impl Default for MascotFrames {
    fn default() -> Self {
        Self {
            default: "/static/img/IMG_8442.PNG".to_string(),
            blinking: "/static/img/IMG_8435.PNG".to_string(),
            talking: "/static/img/IMG_8441.PNG".to_string(),
        }
    }
}

/// Which frame of the set to show
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Resting
    Default,
    /// Eyes closed
    Blinking,
    /// Mouth open
    Talking,
}

impl MascotFrames {
    /// Path for a frame
    pub fn path(&self, frame: Frame) -> &str {
        match frame {
            Frame::Default => &self.default,
            Frame::Blinking => &self.blinking,
            Frame::Talking => &self.talking,
        }
    }
}

/// How the mascot animates for the equipped skin
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SkinMode {
    /// Base skin: frame swaps for blink and talk
    #[default]
    Frames,
    /// Any other skin: talk rocks the element, blink does nothing
    Rocking,
}

impl SkinMode {
    /// Mode for an equipped skin
    pub fn for_skin(skin: &SkinId) -> Self {
        if skin.is_default() {
            Self::Frames
        } else {
            Self::Rocking
        }
    }
}

/// Idle-loop timing, in milliseconds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MascotTiming {
    /// Shortest wait before a blink
    pub blink_min_ms: u64,
    /// Longest wait before a blink (exclusive)
    pub blink_max_ms: u64,
    /// How long the eyes stay closed
    pub blink_ms: u64,
    /// Shortest wait before a talk roll
    pub talk_min_ms: u64,
    /// Longest wait before a talk roll (exclusive)
    pub talk_max_ms: u64,
    /// Chance that a talk roll actually talks
    pub talk_probability: f64,
    /// Mouth-open time per repetition
    pub talk_frame_ms: u64,
    /// Mouth-closed time after each repetition
    pub talk_gap_ms: u64,
    /// Mouth movements per talk
    pub talk_repetitions: u8,
    /// Rocking duration for non-default skins
    pub rock_ms: u64,
}

impl Default for MascotTiming {
    fn default() -> Self {
        Self {
            blink_min_ms: 2000,
            blink_max_ms: 5000,
            blink_ms: 150,
            talk_min_ms: 5000,
            talk_max_ms: 15000,
            talk_probability: 0.4,
            talk_frame_ms: 200,
            talk_gap_ms: 150,
            talk_repetitions: 2,
            rock_ms: 400,
        }
    }
}

impl MascotTiming {
    /// Blink wait window
    pub fn blink_window(&self) -> Range<u64> {
        self.blink_min_ms..self.blink_max_ms
    }

    /// Talk wait window
    pub fn talk_window(&self) -> Range<u64> {
        self.talk_min_ms..self.talk_max_ms
    }

    /// Total length of a frame-based talk
    pub fn talk_duration(&self) -> Duration {
        Duration::from_millis(
            (self.talk_frame_ms + self.talk_gap_ms) * u64::from(self.talk_repetitions),
        )
    }

    /// Check bounds and probability
    pub fn validate(&self) -> Result<(), String> {
        if self.blink_min_ms > self.blink_max_ms {
            return Err(format!(
                "blink interval is inverted: {} > {}",
                self.blink_min_ms, self.blink_max_ms
            ));
        }
        if self.talk_min_ms > self.talk_max_ms {
            return Err(format!(
                "talk interval is inverted: {} > {}",
                self.talk_min_ms, self.talk_max_ms
            ));
        }
        if !(0.0..=1.0).contains(&self.talk_probability) {
            return Err(format!(
                "talk probability {} is outside [0, 1]",
                self.talk_probability
            ));
        }
        Ok(())
    }
}
