use serde::{Deserialize, Serialize};

use crate::models::{
    fractal::fractal_descriptor::FractalDescriptor, range::Range, raster::RasterInfo,
};

use super::Rank;

/// First message on a new connection, worker to coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerHello {
    pub worker_name: String,
}

impl WorkerHello {
    pub fn new(worker_name: String) -> Self {
        Self { worker_name }
    }
}

/// Everything a worker needs to compute rows. Identical for every worker
/// and immutable for the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub raster: RasterInfo,
    pub fractal: FractalDescriptor,
    pub max_iterations: u32,
    pub range: Range,
}

/// Coordinator's answer to a [`WorkerHello`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handshake {
    pub rank: Rank,
    pub size: usize,
    pub job: Job,
}
