// SPDX-License-Identifier: MIT OR Apache-2.0
//! Randomly placed decorative particles.
//!
//! Randomness is injected: presenters scatter their particles once, at
//! construction, from a caller-supplied [`Rng`], so a built sequence is
//! fully determined by its presenter.

use rand::Rng;

/// One scattered particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Resting position
    pub anchor: [f32; 2],
    /// Start delay in seconds
    pub delay: f32,
    /// Offset travelled while the particle fades
    pub drift: [f32; 2],
}

/// Bounds particles are drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterField {
    /// Half width and half height of the area around the center
    pub half_extent: [f32; 2],
    /// Delays are drawn from `[0, max_delay)`
    pub max_delay: f32,
    /// Each drift component is drawn from `[-max_drift, max_drift)`
    pub max_drift: f32,
}

fn spread(rng: &mut impl Rng, half: f32) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..half)
    } else {
        0.0
    }
}

/// Scatter `count` particles over `field`
pub fn scatter(rng: &mut impl Rng, count: usize, field: ScatterField) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            anchor: [spread(rng, field.half_extent[0]), spread(rng, field.half_extent[1])],
            delay: if field.max_delay > 0.0 {
                rng.gen_range(0.0..field.max_delay)
            } else {
                0.0
            },
            drift: [spread(rng, field.max_drift), spread(rng, field.max_drift)],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FIELD: ScatterField = ScatterField {
        half_extent: [160.0, 120.0],
        max_delay: 0.3,
        max_drift: 25.0,
    };

    #[test]
    fn test_scatter_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let particles = scatter(&mut rng, 30, FIELD);
        assert_eq!(particles.len(), 30);
        for p in &particles {
            assert!(p.anchor[0].abs() <= 160.0 && p.anchor[1].abs() <= 120.0);
            assert!((0.0..0.3).contains(&p.delay));
            assert!(p.drift.iter().all(|d| d.abs() <= 25.0));
        }
    }

    #[test]
    fn test_same_seed_same_particles() {
        let a = scatter(&mut StdRng::seed_from_u64(42), 5, FIELD);
        let b = scatter(&mut StdRng::seed_from_u64(42), 5, FIELD);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_field_is_centered() {
        let field = ScatterField {
            half_extent: [0.0, 0.0],
            max_delay: 0.0,
            max_drift: 0.0,
        };
        let particles = scatter(&mut StdRng::seed_from_u64(1), 3, field);
        assert!(particles.iter().all(|p| p.anchor == [0.0, 0.0] && p.delay == 0.0));
    }
}
