mod stats;

pub use stats::Stats;

use crate::geometry::FloatType;

pub type Color = rgb::RGB<FloatType>;

pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
};
pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
};

/// Componentwise product of two colors.
pub fn modulate(a: Color, b: Color) -> Color {
    Color::new(a.r * b.r, a.g * b.g, a.b * b.b)
}

/// Largest absolute component, used to decide whether a contribution is worth tracing.
pub fn max_component(c: Color) -> FloatType {
    c.r.abs().max(c.g.abs()).max(c.b.abs())
}

/// Maps a 0-1 color to pixel type compatible with module image.
pub fn color_to_image(color: Color) -> image::Rgb<u8> {
    image::Rgb([
        (color.r * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.g * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.b * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
