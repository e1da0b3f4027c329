//! Presentation settings
//!
//! Affect only how the simulation looks and sounds, never what it does.

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Disc segments per pixel of radius
    pub fn disc_detail(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 2.0,
        }
    }

    /// Next preset in the Low -> Medium -> High cycle
    pub fn next(self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Star afterimage trails
    pub trails: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            trails: true,
            master_volume: 0.8,
        }
    }
}
