use std::num::NonZeroU32;

use nalgebra::Unit;

use crate::{
    geometry::{EPSILON, FloatType, Ray, SamplingGrid, WorldVector, is_zero, orthonormal_basis},
    scene::{Intersection, Light, Material},
    util::{BLACK, Color, WHITE, max_component, modulate},
};

use super::ray_tracer::{IntersectionSource, Tracer};

impl<S: IntersectionSource> Tracer<'_, S> {
    /// Color of a hit seen directly along a traced ray, including the ambient light.
    pub(super) fn primary_color(
        &self,
        hit: &Intersection,
        ray: &Ray,
        rng: &mut impl rand::Rng,
    ) -> Color {
        let ambient = modulate(self.scene.ambient_light.intensity, hit.material().ka);
        ambient + self.shade(hit, ray, self.scene.tracing.max_depth, WHITE, rng)
    }

    /// Emission, local lighting and the recursive global effects at a hit.
    /// `level` is the remaining recursion depth, `k` the attenuation accumulated along the path.
    fn shade(
        &self,
        hit: &Intersection,
        ray: &Ray,
        level: u32,
        k: Color,
        rng: &mut impl rand::Rng,
    ) -> Color {
        let material = hit.material();
        let v = ray.direction;

        let normal = hit.surface.normal(&hit.point);
        let nv = normal.dot(&v);
        // Facing the viewer
        let normal = if nv > 0.0 { -normal } else { normal };

        let mut color = hit.surface.emission;
        if !is_zero(nv) {
            color += self.local_effects(hit, material, &normal, &v, k, rng);
        }
        if level > 1 {
            color += self.global_effects(hit, material, &normal, ray, level, k, rng);
        }
        color
    }

    fn local_effects(
        &self,
        hit: &Intersection,
        material: &Material,
        normal: &Unit<WorldVector>,
        v: &Unit<WorldVector>,
        k: Color,
        rng: &mut impl rand::Rng,
    ) -> Color {
        let settings = &self.scene.tracing;
        let mut color = BLACK;

        for light in &self.scene.lights {
            let Some((l, light_distance)) = light.towards(&hit.point) else {
                continue;
            };
            let nl = normal.dot(&l);
            if nl <= EPSILON {
                continue;
            }

            let ktr = self.transparency(hit, light, &l, light_distance, normal, rng);
            if max_component(modulate(k, ktr)) <= settings.min_contribution {
                continue;
            }

            let intensity = modulate(light.intensity(&hit.point), ktr);
            let r = normal.as_ref() * (2.0 * nl) - l.as_ref();
            let vr = -v.dot(&r);
            let specular = if vr > 0.0 {
                material.ks * vr.powf(material.shininess)
            } else {
                BLACK
            };
            color += modulate(material.kd * nl + specular, intensity);
        }

        color
    }

    /// How much of the light reaches the hit point, averaged over the area of the light.
    fn transparency(
        &self,
        hit: &Intersection,
        light: &Light,
        l: &Unit<WorldVector>,
        light_distance: FloatType,
        normal: &Unit<WorldVector>,
        rng: &mut impl rand::Rng,
    ) -> Color {
        let samples = self.scene.tracing.shadow_samples;
        let area = light.area().filter(|_| samples.get() > 1);

        let Some((position, radius)) = area else {
            let ray = Ray::offset(hit.point, *l, normal);
            return self.ray_transparency(&ray, light_distance);
        };

        let (u, w) = orthonormal_basis(l);
        let mut sum = BLACK;
        let mut count = 0;
        for point in SamplingGrid::square(samples, 2.0 * radius).disc_points(&position, &u, &w, rng)
        {
            let Some((direction, distance)) = Unit::try_new_and_get(point - hit.point, EPSILON)
            else {
                continue;
            };
            let ray = Ray::offset(hit.point, direction, normal);
            sum += self.ray_transparency(&ray, distance);
            count += 1;
        }

        if count == 0 {
            WHITE
        } else {
            sum * (1.0 / count as FloatType)
        }
    }

    /// Product of transparencies of everything between the ray origin and `max_distance`.
    fn ray_transparency(&self, ray: &Ray, max_distance: FloatType) -> Color {
        let settings = &self.scene.tracing;
        let Some(occluders) =
            self.source
                .occluders(ray, max_distance, settings.transparent_shadows)
        else {
            return WHITE;
        };
        if !settings.transparent_shadows {
            return BLACK;
        }

        let mut ktr = WHITE;
        for occluder in occluders {
            ktr = modulate(ktr, occluder.material().kt);
            if max_component(ktr) <= settings.min_contribution {
                return BLACK;
            }
        }
        ktr
    }

    fn global_effects(
        &self,
        hit: &Intersection,
        material: &Material,
        normal: &Unit<WorldVector>,
        ray: &Ray,
        level: u32,
        k: Color,
        rng: &mut impl rand::Rng,
    ) -> Color {
        let d = ray.direction;
        let reflected = Unit::new_normalize(d.as_ref() - normal.as_ref() * (2.0 * d.dot(normal)));

        let reflection = Ray::offset(hit.point, reflected, normal);
        let refraction = Ray::offset(hit.point, d, normal);

        self.global_effect(&reflection, material.kr, material.glossiness, level, k, rng)
            + self.global_effect(&refraction, material.kt, material.blurriness, level, k, rng)
    }

    /// Color arriving along a secondary ray, weighted by `kx`.
    /// A positive cone angle spreads the ray into a jittered cone of rays around it.
    fn global_effect(
        &self,
        ray: &Ray,
        kx: Color,
        cone_angle: FloatType,
        level: u32,
        k: Color,
        rng: &mut impl rand::Rng,
    ) -> Color {
        let kkx = modulate(k, kx);
        if max_component(kkx) <= self.scene.tracing.min_contribution {
            return BLACK;
        }

        let samples = self.scene.tracing.glossy_samples;
        let rays = if cone_angle > 0.0 && samples.get() > 1 {
            cone_rays(ray, cone_angle, samples, rng)
        } else {
            vec![*ray]
        };

        let mut sum = BLACK;
        for ray in &rays {
            sum += match self.source.closest_intersection(ray, FloatType::INFINITY) {
                Some(hit) => self.shade(&hit, ray, level - 1, kkx, rng),
                None => self.scene.background,
            };
        }
        modulate(sum * (1.0 / rays.len() as FloatType), kx)
    }
}

/// Rays from the origin of `ray` spread over a cone with the given half angle around its direction.
fn cone_rays(
    ray: &Ray,
    half_angle: FloatType,
    resolution: NonZeroU32,
    rng: &mut impl rand::Rng,
) -> Vec<Ray> {
    let size = 2.0 * half_angle.min(std::f64::consts::FRAC_PI_2 - 1e-3).tan();
    let grid = SamplingGrid::square(resolution, size);
    let (u, w) = orthonormal_basis(&ray.direction);
    let center = ray.point_at(1.0);

    grid.disc_points(&center, &u, &w, rng)
        .into_iter()
        .map(|point| Ray::new(ray.origin, Unit::new_normalize(point - ray.origin)))
        .collect()
}
