//! Blend ratio between the two quad textures

use winit::keyboard::KeyCode;

/// Two-valued input that nudges the blend ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendDirection {
    Increase,
    Decrease,
}

impl BlendDirection {
    /// Up arrow increases, down arrow decreases; other keys are ignored
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ArrowUp => Some(BlendDirection::Increase),
            KeyCode::ArrowDown => Some(BlendDirection::Decrease),
            _ => None,
        }
    }
}

/// Mix ratio in [0, 1], moved in fixed steps of 0.02
///
/// Stored as a whole number of steps so that repeated adjustments land
/// exactly on the bounds instead of accumulating float error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendRatio {
    steps: u32,
}

impl BlendRatio {
    /// Steps between 0.0 and 1.0
    pub const STEPS: u32 = 50;
    pub const STEP: f32 = 1.0 / Self::STEPS as f32;

    /// Nearest representable ratio, clamped to [0, 1]
    pub fn new(ratio: f32) -> Self {
        let steps = if ratio.is_nan() {
            0
        } else {
            (ratio.clamp(0.0, 1.0) * Self::STEPS as f32).round() as u32
        };
        Self { steps }
    }

    pub fn value(&self) -> f32 {
        self.steps as f32 / Self::STEPS as f32
    }

    /// Move one step in the given direction.
    ///
    /// Increasing only happens below 1.0 and decreasing only above 0.0;
    /// at a bound the call leaves the ratio untouched. Returns whether the
    /// ratio changed.
    pub fn adjust(&mut self, direction: BlendDirection) -> bool {
        match direction {
            BlendDirection::Increase if self.steps < Self::STEPS => {
                self.steps += 1;
                true
            }
            BlendDirection::Decrease if self.steps > 0 => {
                self.steps -= 1;
                true
            }
            _ => false,
        }
    }
}

impl Default for BlendRatio {
    fn default() -> Self {
        Self::new(0.2)
    }
}
