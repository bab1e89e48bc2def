use bon::Builder;

use crate::{
    geometry::FloatType,
    util::{BLACK, Color, WHITE},
};

/// Attenuation coefficients of a surface.
///
/// All `k*` values are per channel weights. `glossiness` and `blurriness` are
/// half-angles (radians) of the cones sampled around the reflected and refracted
/// directions, zero means a perfect mirror / perfectly clear refraction.
#[derive(Copy, Clone, Debug, PartialEq, Builder)]
pub struct Material {
    /// Diffuse
    #[builder(default = BLACK)]
    pub kd: Color,
    /// Specular
    #[builder(default = BLACK)]
    pub ks: Color,
    /// Ambient
    #[builder(default = WHITE)]
    pub ka: Color,
    /// Transparency
    #[builder(default = BLACK)]
    pub kt: Color,
    /// Reflection
    #[builder(default = BLACK)]
    pub kr: Color,
    #[builder(default = 0.0)]
    pub shininess: FloatType,
    #[builder(default = 0.0)]
    pub glossiness: FloatType,
    #[builder(default = 0.0)]
    pub blurriness: FloatType,
}

impl Default for Material {
    fn default() -> Self {
        Material::builder().build()
    }
}

impl Material {
    /// Uniform diffuse + specular material.
    pub fn plastic(kd: FloatType, ks: FloatType, shininess: FloatType) -> Material {
        Material::builder()
            .kd(WHITE * kd)
            .ks(WHITE * ks)
            .shininess(shininess)
            .build()
    }
}
