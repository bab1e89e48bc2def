use rand::{SeedableRng, rngs::SmallRng};

use crate::{
    camera::Camera,
    geometry::{FloatType, ScreenPoint},
    renderer::RayTracer,
    util::{BLACK, Color},
};

pub struct Worker {
    id: usize,
    rng: SmallRng,
}

impl Worker {
    /// With a seed, the worker's random sequence depends only on the seed and the worker id.
    pub fn new(id: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => SmallRng::from_os_rng(),
        };
        Self { id, rng }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Renders a single image row, one color per pixel.
    pub fn render_row<T: RayTracer>(
        &mut self,
        tracer: &T,
        camera: &Camera,
        y: u32,
        row: &mut [Color],
    ) {
        for (x, pixel) in (0u32..).zip(row.iter_mut()) {
            *pixel = self.render_pixel(tracer, camera, &ScreenPoint::new(x, y));
        }
    }

    /// Average color of all camera rays of the pixel.
    fn render_pixel<T: RayTracer>(
        &mut self,
        tracer: &T,
        camera: &Camera,
        point: &ScreenPoint,
    ) -> Color {
        let rays = camera.construct_rays(point, &mut self.rng);
        let mut sum = BLACK;
        for ray in &rays {
            sum += tracer.trace_ray(ray, &mut self.rng);
        }
        sum * (1.0 / rays.len() as FloatType)
    }
}
