use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Instant,
};

use anyhow::anyhow;
use image::RgbImage;

use crate::{
    camera::Camera,
    geometry::FloatType,
    renderer::{RayTracer, RenderSettings, worker::Worker},
    util::{BLACK, Color, color_to_image},
};

/// Receives the rendered image, one call per pixel.
pub trait ImageSink {
    fn write_pixel(&mut self, x: u32, y: u32, color: Color);
}

impl ImageSink for RgbImage {
    fn write_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.put_pixel(x, y, color_to_image(color));
    }
}

/// Rows of colors, indexed `[y][x]`.
impl ImageSink for Vec<Vec<Color>> {
    fn write_pixel(&mut self, x: u32, y: u32, color: Color) {
        self[y as usize][x as usize] = color;
    }
}

/// Renders the camera's view into the sink.
///
/// Image rows are striped over the workers, row `i` is rendered by worker `i % worker_count`.
/// `progress` is called with the finished fraction of the image every time another
/// `settings.progress_interval` of it is done.
pub fn render<T, S, P>(
    tracer: &T,
    camera: &Camera,
    settings: &RenderSettings,
    sink: &mut S,
    progress: P,
) -> anyhow::Result<()>
where
    T: RayTracer,
    S: ImageSink + ?Sized,
    P: Fn(FloatType) + Sync,
{
    settings.validate()?;

    let resolution = camera.resolution();
    let (width, height) = (resolution.x as usize, resolution.y as usize);
    let worker_count = settings.worker_count.resolve().min(height);
    let start = Instant::now();
    log::info!(
        "Rendering {width}x{height} pixels, {} rays per pixel, {worker_count} workers",
        camera.rays_per_pixel()
    );

    let mut rows = vec![vec![BLACK; width]; height];
    let mut assignments: Vec<Vec<(u32, &mut Vec<Color>)>> =
        (0..worker_count).map(|_| Vec::new()).collect();
    for (y, row) in (0u32..).zip(rows.iter_mut()) {
        assignments[y as usize % worker_count].push((y, row));
    }

    let cores = core_affinity::get_core_ids().unwrap_or_default();
    let finished_rows = AtomicUsize::new(0);
    let finished_rows = &finished_rows;
    let progress = &progress;

    thread::scope(|scope| -> anyhow::Result<()> {
        let handles = assignments
            .into_iter()
            .enumerate()
            .map(|(worker_id, rows)| {
                let core = (!cores.is_empty()).then(|| cores[worker_id % cores.len()]);
                thread::Builder::new()
                    .name(format!("worker{worker_id}"))
                    .spawn_scoped(scope, move || {
                        if let Some(core) = core {
                            core_affinity::set_for_current(core);
                        }
                        let mut worker = Worker::new(worker_id, settings.seed);
                        log::debug!("Worker {} starting on {} rows", worker.id(), rows.len());

                        for (y, row) in rows {
                            worker.render_row(tracer, camera, y, row);
                            let done = finished_rows.fetch_add(1, Ordering::AcqRel) + 1;
                            report_progress(done, height, settings.progress_interval, progress);
                        }
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow!("A render worker panicked"))?;
        }
        Ok(())
    })?;

    for (y, row) in (0u32..).zip(&rows) {
        for (x, color) in (0u32..).zip(row) {
            sink.write_pixel(x, y, *color);
        }
    }

    log::info!("Rendered in {:.2?}", start.elapsed());
    Ok(())
}

/// Calls the callback if finishing row number `done` crossed a multiple of the interval.
fn report_progress(
    done: usize,
    total: usize,
    interval: FloatType,
    callback: &(impl Fn(FloatType) + Sync),
) {
    let step = |rows: usize| (rows as FloatType / total as FloatType / interval).floor() as u64;
    if step(done) > step(done - 1) || done == total {
        callback(done as FloatType / total as FloatType);
    }
}

#[cfg(test)]
mod test {
    use std::{num::NonZeroUsize, sync::Mutex};

    use super::*;
    use crate::{
        geometry::{Ray, ScreenSize, WorldPoint, WorldVector},
        renderer::WorkerCount,
    };
    use assert2::{assert, let_assert};
    use test_case::test_case;

    /// Encodes the pixel position into the color
    struct PositionTracer {
        camera: Camera,
    }

    impl RayTracer for PositionTracer {
        fn trace_ray<R: rand::Rng>(&self, ray: &Ray, _rng: &mut R) -> Color {
            // Point on the view plane at z = -1
            let point = ray.point_at(1.0 / -ray.direction.z);
            let resolution = self.camera.resolution();
            Color::new(
                point.x + resolution.x as FloatType / 2.0 - 0.5,
                resolution.y as FloatType / 2.0 - 0.5 - point.y,
                1.0,
            )
        }
    }

    /// One unit of view plane per pixel, so that the position tracer returns pixel coordinates
    fn camera(width: u32, height: u32) -> Camera {
        Camera::builder()
            .location(WorldPoint::origin())
            .to(-WorldVector::z())
            .up(WorldVector::y())
            .width(width as FloatType)
            .height(height as FloatType)
            .distance(1.0)
            .resolution(ScreenSize::new(width, height))
            .build()
            .unwrap()
    }

    /// Counts writes per pixel
    struct CountingSink {
        writes: Vec<Vec<usize>>,
        colors: Vec<Vec<Color>>,
    }

    impl ImageSink for CountingSink {
        fn write_pixel(&mut self, x: u32, y: u32, color: Color) {
            self.writes[y as usize][x as usize] += 1;
            self.colors[y as usize][x as usize] = color;
        }
    }

    fn settings(workers: usize) -> RenderSettings {
        RenderSettings {
            worker_count: WorkerCount::Manual(NonZeroUsize::new(workers).unwrap()),
            progress_interval: 0.25,
            seed: Some(1),
        }
    }

    #[test_case(1, 7, 5; "single_worker")]
    #[test_case(3, 7, 5; "uneven_rows")]
    #[test_case(8, 3, 4; "more_workers_than_rows")]
    fn every_pixel_once(workers: usize, width: u32, height: u32) {
        let camera = camera(width, height);
        let tracer = PositionTracer { camera };
        let mut sink = CountingSink {
            writes: vec![vec![0; width as usize]; height as usize],
            colors: vec![vec![BLACK; width as usize]; height as usize],
        };

        let_assert!(Ok(()) = render(&tracer, &camera, &settings(workers), &mut sink, |_| {}));

        for (y, (writes, colors)) in sink.writes.iter().zip(&sink.colors).enumerate() {
            for (x, (count, color)) in writes.iter().zip(colors).enumerate() {
                assert!(*count == 1);
                assert!((color.r - x as FloatType).abs() < 1e-9);
                assert!((color.g - y as FloatType).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn progress_fires_per_interval() {
        let camera = camera(2, 8);
        let tracer = PositionTracer { camera };
        let mut image = vec![vec![BLACK; 2]; 8];
        let reports = Mutex::new(Vec::new());

        let_assert!(
            Ok(()) = render(&tracer, &camera, &settings(3), &mut image, |fraction| {
                reports.lock().unwrap().push(fraction)
            })
        );

        let mut reports = reports.into_inner().unwrap();
        reports.sort_by(|a, b| a.total_cmp(b));
        assert!(reports == [0.25, 0.5, 0.75, 1.0]);
        assert!(image.iter().flatten().all(|c| c.b == 1.0));
    }

    #[test]
    fn invalid_settings() {
        let camera = camera(2, 2);
        let tracer = PositionTracer { camera };
        let mut image = vec![vec![BLACK; 2]; 2];
        let settings = RenderSettings {
            progress_interval: 0.0,
            ..settings(1)
        };
        assert!(render(&tracer, &camera, &settings, &mut image, |_| {}).is_err());
    }

    #[test]
    fn writes_rgb_image() {
        let camera = camera(3, 2);
        let tracer = PositionTracer { camera };
        let mut image = RgbImage::new(3, 2);
        let_assert!(Ok(()) = render(&tracer, &camera, &settings(2), &mut image, |_| {}));
        assert!(image.get_pixel(1, 1) == &image::Rgb([255, 255, 255]));
        assert!(image.get_pixel(0, 0) == &image::Rgb([0, 0, 255]));
    }

    #[test_case(1, 4, 0.25, true; "first_quarter")]
    #[test_case(2, 8, 0.25, true; "exact_boundary")]
    #[test_case(3, 8, 0.25, false; "between")]
    #[test_case(10, 10, 1.0, true; "last_row")]
    #[test_case(5, 10, 1.0, false; "coarse_interval")]
    fn progress_steps(done: usize, total: usize, interval: FloatType, fires: bool) {
        let fired = std::sync::atomic::AtomicBool::new(false);
        report_progress(done, total, interval, &|_| {
            fired.store(true, Ordering::Relaxed)
        });
        assert!(fired.into_inner() == fires);
    }
}
