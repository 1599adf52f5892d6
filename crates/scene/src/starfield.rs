//! Drifting, twinkling point-cloud backdrop.
//!
//! Stars live in a cube `[-extent, extent]^3` and drift with a constant
//! per-star velocity. A star that leaves the cube on an axis teleports to the
//! opposite face, keeping the field continuous.

use foundation::math::Vec3;
use rand::Rng;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Star {
    pub position: Vec3,
    /// Displacement per reference frame.
    pub velocity: Vec3,
    /// Twinkle phase offset (radians).
    pub phase: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StarfieldParams {
    pub count: usize,
    pub extent: f64,
    /// Largest per-axis speed, in units per reference frame.
    pub max_speed: f64,
    /// Per-star twinkle on top of the global pulse.
    pub twinkle: bool,
}

impl Default for StarfieldParams {
    fn default() -> Self {
        Self {
            count: 1000,
            extent: 1000.0,
            max_speed: 0.05,
            twinkle: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Starfield {
    stars: Vec<Star>,
    extent: f64,
    twinkle: bool,
    global_opacity: f64,
    opacities: Vec<f32>,
}

impl Starfield {
    pub fn generate<R: Rng>(params: StarfieldParams, rng: &mut R) -> Self {
        let extent = params.extent.abs();
        let speed = params.max_speed.abs();
        let mut coord = |half: f64| {
            if half > 0.0 {
                rng.gen_range(-half..=half)
            } else {
                0.0
            }
        };

        let mut stars = Vec::with_capacity(params.count);
        for _ in 0..params.count {
            let position = Vec3::new(coord(extent), coord(extent), coord(extent));
            let velocity = Vec3::new(coord(speed), coord(speed), coord(speed));
            let phase = coord(std::f64::consts::PI) + std::f64::consts::PI;
            stars.push(Star {
                position,
                velocity,
                phase,
            });
        }

        Self::from_stars(stars, extent, params.twinkle)
    }

    pub fn from_stars(stars: Vec<Star>, extent: f64, twinkle: bool) -> Self {
        let opacities = vec![1.0; stars.len()];
        Self {
            stars,
            extent,
            twinkle,
            global_opacity: 1.0,
            opacities,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Opacity applied to the whole field.
    pub fn global_opacity(&self) -> f64 {
        self.global_opacity
    }

    /// Per-star opacity factors, parallel to [`Starfield::stars`].
    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    /// Advance by `steps` reference frames and refresh opacities for
    /// `time_s` seconds of elapsed time.
    pub fn step(&mut self, steps: f64, time_s: f64) {
        let extent = self.extent;
        for star in &mut self.stars {
            star.position += star.velocity * steps;
            star.position = Vec3::new(
                wrap_coordinate(star.position.x, extent),
                wrap_coordinate(star.position.y, extent),
                wrap_coordinate(star.position.z, extent),
            );
        }

        self.global_opacity = global_opacity_at(time_s);
        if self.twinkle {
            for (o, star) in self.opacities.iter_mut().zip(&self.stars) {
                *o = twinkle_at(time_s, star.phase) as f32;
            }
        }
    }
}

/// Slow pulse shared by the whole field, in `[0, 1]`.
pub fn global_opacity_at(time_s: f64) -> f64 {
    0.5 + 0.5 * time_s.sin()
}

/// Fast per-star twinkle, in `[0, 1]`.
pub fn twinkle_at(time_s: f64, phase: f64) -> f64 {
    0.5 + 0.5 * (10.0 * time_s + phase).sin()
}

/// Teleport `v` to the opposite side of `[-extent, extent]` once it leaves.
pub fn wrap_coordinate(v: f64, extent: f64) -> f64 {
    if extent <= 0.0 || !v.is_finite() {
        return 0.0;
    }
    if v.abs() <= extent {
        return v;
    }
    let span = 2.0 * extent;
    let shifted = v - v.signum() * span;
    if shifted.abs() <= extent {
        shifted
    } else {
        (v + extent).rem_euclid(span) - extent
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Star, Starfield, StarfieldParams, global_opacity_at, twinkle_at, wrap_coordinate,
    };
    use foundation::math::Vec3;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn generated_stars_start_inside_the_cube() {
        let mut rng = SmallRng::seed_from_u64(7);
        let field = Starfield::generate(StarfieldParams::default(), &mut rng);
        assert_eq!(field.len(), 1000);
        for s in field.stars() {
            for c in s.position.as_array() {
                assert!(c.abs() <= 1000.0);
            }
            for v in s.velocity.as_array() {
                assert!(v.abs() <= 0.05);
            }
        }
    }

    #[test]
    fn wrap_teleports_to_opposite_side() {
        assert_eq!(wrap_coordinate(1000.5, 1000.0), -999.5);
        assert_eq!(wrap_coordinate(-1000.25, 1000.0), 999.75);
        assert_eq!(wrap_coordinate(1000.0, 1000.0), 1000.0);
        let far = wrap_coordinate(12_345.0, 1000.0);
        assert!(far.abs() <= 1000.0);
    }

    #[test]
    fn stars_stay_in_bounds_under_repeated_steps() {
        let stars = vec![
            Star {
                position: Vec3::new(999.9, -999.9, 0.0),
                velocity: Vec3::new(0.05, -0.05, 0.05),
                phase: 0.0,
            },
            Star {
                position: Vec3::ZERO,
                velocity: Vec3::new(37.0, -91.0, 500.0),
                phase: 1.0,
            },
        ];
        let mut field = Starfield::from_stars(stars, 1000.0, true);
        for i in 0..10_000 {
            field.step(1.0 + (i % 15) as f64, i as f64 / 60.0);
            for s in field.stars() {
                for c in s.position.as_array() {
                    assert!(c.abs() <= 1000.0, "escaped: {c}");
                }
            }
        }
    }

    #[test]
    fn opacities_follow_time() {
        let stars = vec![Star {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            phase: 0.5,
        }];
        let mut field = Starfield::from_stars(stars.clone(), 1000.0, true);
        field.step(1.0, 2.0);
        assert_eq!(field.global_opacity(), global_opacity_at(2.0));
        assert_eq!(field.opacities()[0], twinkle_at(2.0, 0.5) as f32);

        let mut flat = Starfield::from_stars(stars, 1000.0, false);
        flat.step(1.0, 2.0);
        assert_eq!(flat.opacities()[0], 1.0);
    }
}
