use nalgebra::Unit;

use crate::{
    geometry::{FloatType, WorldPoint, WorldVector},
    util::Color,
};

/// Ambient light, the intensity is pre-scaled by its coefficient.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub intensity: Color,
}

impl AmbientLight {
    pub fn new(color: Color, ka: FloatType) -> AmbientLight {
        AmbientLight {
            intensity: color * ka,
        }
    }

    pub fn none() -> AmbientLight {
        AmbientLight::new(Color::default(), 0.0)
    }
}

/// Point light with distance attenuation `1 / (kc + kl*d + kq*d^2)`.
/// A positive radius makes it an area light for soft shadows.
#[derive(Copy, Clone, Debug)]
pub struct PointLight {
    pub intensity: Color,
    pub position: WorldPoint,
    pub kc: FloatType,
    pub kl: FloatType,
    pub kq: FloatType,
    pub radius: FloatType,
}

impl PointLight {
    pub fn new(intensity: Color, position: WorldPoint) -> PointLight {
        PointLight {
            intensity,
            position,
            kc: 1.0,
            kl: 0.0,
            kq: 0.0,
            radius: 0.0,
        }
    }

    pub fn with_attenuation(self, kc: FloatType, kl: FloatType, kq: FloatType) -> PointLight {
        PointLight { kc, kl, kq, ..self }
    }

    pub fn with_radius(self, radius: FloatType) -> PointLight {
        PointLight { radius, ..self }
    }

    fn intensity_at(&self, point: &WorldPoint) -> Color {
        let d = (point - self.position).norm();
        self.intensity * (1.0 / (self.kc + self.kl * d + self.kq * d * d))
    }
}

#[derive(Copy, Clone, Debug)]
pub enum Light {
    Directional {
        intensity: Color,
        direction: Unit<WorldVector>,
    },
    Point(PointLight),
    Spot {
        light: PointLight,
        direction: Unit<WorldVector>,
        /// Exponent narrowing the beam, 1 is the plain cosine falloff.
        narrow_beam: FloatType,
    },
}

impl Light {
    pub fn directional(intensity: Color, direction: Unit<WorldVector>) -> Light {
        Light::Directional {
            intensity,
            direction,
        }
    }

    pub fn spot(light: PointLight, direction: Unit<WorldVector>) -> Light {
        Light::Spot {
            light,
            direction,
            narrow_beam: 1.0,
        }
    }

    /// Light intensity arriving at the point.
    pub fn intensity(&self, point: &WorldPoint) -> Color {
        match self {
            Light::Directional { intensity, .. } => *intensity,
            Light::Point(light) => light.intensity_at(point),
            Light::Spot {
                light,
                direction,
                narrow_beam,
            } => match Unit::try_new(point - light.position, 0.0) {
                Some(l) => {
                    let factor = direction.dot(&l).max(0.0).powf(*narrow_beam);
                    light.intensity_at(point) * factor
                }
                None => light.intensity_at(point),
            },
        }
    }

    /// Direction from the point towards the light source and the distance to it.
    /// None if the point coincides with the light position.
    pub fn towards(&self, point: &WorldPoint) -> Option<(Unit<WorldVector>, FloatType)> {
        match self {
            Light::Directional { direction, .. } => Some((-*direction, FloatType::INFINITY)),
            Light::Point(light) | Light::Spot { light, .. } => {
                let (l, distance) = Unit::try_new_and_get(light.position - point, 0.0)?;
                Some((l, distance))
            }
        }
    }

    /// Area light description: position and radius, if the light has an extent.
    pub fn area(&self) -> Option<(WorldPoint, FloatType)> {
        match self {
            Light::Directional { .. } => None,
            Light::Point(light) | Light::Spot { light, .. } => {
                (light.radius > 0.0).then_some((light.position, light.radius))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{geometry::EPSILON, util::WHITE};
    use assert2::{assert, let_assert};

    #[test]
    fn point_light_attenuation() {
        let light = Light::Point(
            PointLight::new(WHITE * 10.0, WorldPoint::origin()).with_attenuation(1.0, 1.0, 0.5),
        );
        let i = light.intensity(&WorldPoint::new(2.0, 0.0, 0.0));
        // 10 / (1 + 2 + 0.5 * 4)
        assert!((i.r - 2.0).abs() < EPSILON);
    }

    #[test]
    fn point_light_direction_and_distance() {
        let light = Light::Point(PointLight::new(WHITE, WorldPoint::new(0.0, 0.0, 4.0)));
        let_assert!(Some((l, d)) = light.towards(&WorldPoint::new(0.0, 3.0, 0.0)));
        assert!((d - 5.0).abs() < EPSILON);
        assert!((l.into_inner() - WorldVector::new(0.0, -0.6, 0.8)).norm() < EPSILON);
    }

    #[test]
    fn directional_light_points_back() {
        let light = Light::directional(WHITE, Unit::new_normalize(WorldVector::new(0.0, -1.0, 0.0)));
        let_assert!(Some((l, d)) = light.towards(&WorldPoint::new(5.0, 5.0, 5.0)));
        assert!(d == FloatType::INFINITY);
        assert!(l.into_inner() == WorldVector::y());
        assert!(light.intensity(&WorldPoint::origin()) == WHITE);
    }

    #[test]
    fn spot_light_falls_off_sideways() {
        let light = Light::spot(
            PointLight::new(WHITE, WorldPoint::origin()),
            Unit::new_normalize(WorldVector::new(0.0, 0.0, -1.0)),
        );
        let ahead = light.intensity(&WorldPoint::new(0.0, 0.0, -1.0));
        let sideways = light.intensity(&WorldPoint::new(1.0, 0.0, 0.0));
        let behind = light.intensity(&WorldPoint::new(0.0, 0.0, 1.0));
        assert!((ahead.g - 1.0).abs() < EPSILON);
        assert!(sideways.g.abs() < EPSILON);
        assert!(behind.g == 0.0);
    }

    #[test]
    fn only_sized_lights_have_area() {
        let point = PointLight::new(WHITE, WorldPoint::origin());
        assert!(Light::Point(point).area().is_none());
        assert!(Light::Point(point.with_radius(0.5)).area() == Some((WorldPoint::origin(), 0.5)));
    }
}
