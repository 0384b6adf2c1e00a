//! Light sources. This module is private but reexported by its parent.

use crate::math::{FreePoint, FreeVector, Rgb};

// -------------------------------------------------------------------------------------------------

/// Distance falloff for a point light.
///
/// The light's contribution is divided by
/// `constant + linear·d + exponential·d²` where `d` is the distance from the light to
/// the lit point. The default, [`Attenuation::NONE`], divides by 1 (no falloff).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    /// Distance-independent term.
    pub constant: f32,
    /// Term proportional to distance.
    pub linear: f32,
    /// Term proportional to distance squared.
    pub exponential: f32,
}

impl Attenuation {
    /// No falloff: full brightness at any distance.
    pub const NONE: Self = Self {
        constant: 1.0,
        linear: 0.0,
        exponential: 0.0,
    };

    /// The divisor applied to a light `distance` away.
    #[inline]
    pub fn divisor(&self, distance: f32) -> f32 {
        self.constant + self.linear * distance + self.exponential * distance * distance
    }
}

impl Default for Attenuation {
    #[inline]
    fn default() -> Self {
        Self::NONE
    }
}

// -------------------------------------------------------------------------------------------------

/// A light source contributing radiance to surface points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    /// Uniform light from everywhere; independent of position and orientation.
    Ambient {
        /// Radiance added to every surface point.
        color: Rgb,
    },
    /// Light radiating from a position in the scene. The only kind that casts shadows.
    Point {
        /// Where the light is.
        position: FreePoint,
        /// Radiance at divisor 1 (see [`Attenuation`]).
        color: Rgb,
        /// Distance falloff.
        attenuation: Attenuation,
    },
    /// Parallel light arriving from a fixed direction, as from a very distant source.
    Directional {
        /// The direction the light *travels*; unit length (normalized on construction).
        direction: FreeVector,
        /// Radiance on a surface facing the light head-on.
        color: Rgb,
    },
}

impl Light {
    /// Uniform light of the given color.
    pub fn ambient(color: Rgb) -> Self {
        Light::Ambient { color }
    }

    /// A point light with no distance falloff.
    pub fn point(position: FreePoint, color: Rgb) -> Self {
        Light::Point {
            position,
            color,
            attenuation: Attenuation::NONE,
        }
    }

    /// A point light with the given distance falloff.
    pub fn point_attenuated(position: FreePoint, color: Rgb, attenuation: Attenuation) -> Self {
        Light::Point {
            position,
            color,
            attenuation,
        }
    }

    /// A directional light traveling along `direction` (normalized here).
    pub fn directional(direction: FreeVector, color: Rgb) -> Self {
        Light::Directional {
            direction: direction.normalize(),
            color,
        }
    }

    /// The radiance this light contributes to a surface at `point` with unit normal
    /// `normal`, before any shadowing.
    ///
    /// Surfaces facing away from the light receive black.
    pub fn contribution(&self, point: FreePoint, normal: FreeVector) -> Rgb {
        match *self {
            Light::Ambient { color } => color,
            Light::Point {
                position,
                color,
                attenuation,
            } => {
                let to_light = position - point;
                let distance = to_light.length();
                let angle = normal.dot(to_light / distance);
                if angle <= 0.0 {
                    Rgb::BLACK
                } else {
                    color * (angle / attenuation.divisor(distance))
                }
            }
            Light::Directional { direction, color } => {
                // `direction` is where the light is going; the surface must face the
                // opposite way.
                let angle = normal.dot(-direction);
                if angle <= 0.0 { Rgb::BLACK } else { color * angle }
            }
        }
    }

    /// Whether surfaces can be shadowed from this light.
    pub fn casts_shadow(&self) -> bool {
        self.shadow_source().is_some()
    }

    /// The point occlusion should be measured toward, for lights that cast shadows.
    pub fn shadow_source(&self) -> Option<FreePoint> {
        match *self {
            Light::Point { position, .. } => Some(position),
            Light::Ambient { .. } | Light::Directional { .. } => None,
        }
    }
}
