//! Scale / rotation settings for placing environment objects

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const SCALE_MIN: f32 = 0.1;
pub const SCALE_MAX: f32 = 5.0;
pub const ROTATION_MIN: f32 = 0.0;
pub const ROTATION_MAX: f32 = 360.0;

/// Placement tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    pub random_scale: bool,
    pub random_rotation: bool,
    pub scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Degrees
    pub rotation: f32,
    pub min_rotation: f32,
    pub max_rotation: f32,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            random_scale: false,
            random_rotation: false,
            scale: 1.0,
            min_scale: 0.5,
            max_scale: 1.5,
            rotation: 0.0,
            min_rotation: 0.0,
            max_rotation: 360.0,
        }
    }
}

impl PlacementSettings {
    /// Reset every out-of-range value to its default
    ///
    /// Returns one message per corrected field.
    pub fn validate(&mut self) -> Vec<String> {
        let defaults = PlacementSettings::default();
        let mut corrected = Vec::new();

        let scale_fields: [(&str, &mut f32, f32); 3] = [
            ("scale", &mut self.scale, defaults.scale),
            ("min_scale", &mut self.min_scale, defaults.min_scale),
            ("max_scale", &mut self.max_scale, defaults.max_scale),
        ];
        for (label, value, default) in scale_fields {
            if !(SCALE_MIN..=SCALE_MAX).contains(&*value) {
                corrected.push(format!(
                    "{} {} outside {}..{}, reset to {}",
                    label, value, SCALE_MIN, SCALE_MAX, default
                ));
                *value = default;
            }
        }

        let rotation_fields: [(&str, &mut f32, f32); 3] = [
            ("rotation", &mut self.rotation, defaults.rotation),
            ("min_rotation", &mut self.min_rotation, defaults.min_rotation),
            ("max_rotation", &mut self.max_rotation, defaults.max_rotation),
        ];
        for (label, value, default) in rotation_fields {
            if !(ROTATION_MIN..=ROTATION_MAX).contains(&*value) {
                corrected.push(format!(
                    "{} {} outside {}..{}, reset to {}",
                    label, value, ROTATION_MIN, ROTATION_MAX, default
                ));
                *value = default;
            }
        }

        for message in &corrected {
            log::warn!("placement settings: {}", message);
        }
        corrected
    }

    /// Scale and rotation for the next placed object
    pub fn sample(&self, rng: &mut impl Rng) -> (f32, f32) {
        let scale = if self.random_scale {
            sample_range(rng, self.min_scale, self.max_scale)
        } else {
            self.scale
        };
        let rotation = if self.random_rotation {
            sample_range(rng, self.min_rotation, self.max_rotation)
        } else {
            self.rotation
        };
        (scale, rotation)
    }
}

fn sample_range(rng: &mut impl Rng, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo == hi {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_validate_resets_out_of_range() {
        let mut settings = PlacementSettings {
            scale: 9.0,
            min_rotation: -10.0,
            ..Default::default()
        };
        let corrected = settings.validate();
        assert_eq!(corrected.len(), 2);
        assert_eq!(settings.scale, 1.0);
        assert_eq!(settings.min_rotation, 0.0);

        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_sample_fixed_and_random() {
        let mut rng = StdRng::seed_from_u64(7);
        let fixed = PlacementSettings {
            scale: 2.0,
            rotation: 90.0,
            ..Default::default()
        };
        assert_eq!(fixed.sample(&mut rng), (2.0, 90.0));

        // Inverted bounds are tolerated
        let random = PlacementSettings {
            random_scale: true,
            random_rotation: true,
            min_scale: 3.0,
            max_scale: 0.5,
            ..Default::default()
        };
        for _ in 0..100 {
            let (scale, rotation) = random.sample(&mut rng);
            assert!((0.5..=3.0).contains(&scale));
            assert!((0.0..=360.0).contains(&rotation));
        }
    }
}
