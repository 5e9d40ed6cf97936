//! Wind sway layered on top of a generated structure at render time.

use crate::generation::Appearance;

/// Wind state for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    /// 0 = calm, 1 = the configured full sway amplitude
    pub strength: f32,
    /// Seconds since the scene started
    pub time: f32,
    /// Angular frequency of the sway, radians per second
    pub frequency: f32,
}

impl Wind {
    pub const CALM: Wind = Wind { strength: 0.0, time: 0.0, frequency: 1.5 };

    pub fn new(strength: f32, time: f32) -> Self {
        Self { strength, time, ..Self::CALM }
    }
}

impl Default for Wind {
    fn default() -> Self {
        Self::CALM
    }
}

/// Extra bend (radians) for a branch this frame
pub fn sway_offset(appearance: &Appearance, wind: &Wind) -> f32 {
    appearance.sway_amplitude
        * wind.strength
        * (wind.time * wind.frequency + appearance.sway_phase).sin()
}
