mod machinery;
mod ray_tracer;
mod shading;
mod worker;

pub use machinery::{ImageSink, render};
pub use ray_tracer::{GridRayTracer, IntersectionSource, RayTracer, SimpleRayTracer, Tracer};

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::geometry::FloatType;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerCount {
    /// One worker per available CPU
    Auto,
    Manual(NonZeroUsize),
    /// All available CPUs except the given number, at least one worker
    AllButN(usize),
}

impl WorkerCount {
    /// Interprets a signed thread count: zero is automatic, negative numbers are
    /// relative to the number of available CPUs.
    pub fn from_signed(count: i64) -> WorkerCount {
        match NonZeroUsize::new(count.unsigned_abs() as usize) {
            None => WorkerCount::Auto,
            Some(n) if count > 0 => WorkerCount::Manual(n),
            Some(n) => WorkerCount::AllButN(n.get()),
        }
    }

    pub fn resolve(self) -> usize {
        match self {
            WorkerCount::Auto => num_cpus::get(),
            WorkerCount::Manual(n) => n.get(),
            WorkerCount::AllButN(n) => num_cpus::get().saturating_sub(n).max(1),
        }
    }
}

#[derive(Copy, Clone, Debug, Error, PartialEq)]
pub enum RenderSettingsError {
    #[error("progress interval must be in (0, 1], got {0}")]
    ProgressInterval(FloatType),
}

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    pub worker_count: WorkerCount,
    /// Fraction of the image between two progress reports
    pub progress_interval: FloatType,
    /// Seed for the per-worker random generators, random if not set
    pub seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            worker_count: WorkerCount::Auto,
            progress_interval: 0.1,
            seed: None,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<(), RenderSettingsError> {
        if self.progress_interval > 0.0 && self.progress_interval <= 1.0 {
            Ok(())
        } else {
            Err(RenderSettingsError::ProgressInterval(
                self.progress_interval,
            ))
        }
    }
}
