use crate::models::{
    chunk::Chunk, fractal::fractal_descriptor::FractalDescriptor, range::Range,
    raster::RasterInfo,
};
use crate::networking::handshake::Job;

/// Fills the pixels of a chunk. `pixels` is exactly `row_count * total_cols`
/// bytes, row-major.
pub trait RowComputer: Send + Sync {
    fn compute(&self, raster: &RasterInfo, chunk: Chunk, pixels: &mut [u8]);
}

/// Escape-time renderer: a pixel is its iteration count scaled to `0..=255`.
#[derive(Debug, Clone, Copy)]
pub struct FractalComputer {
    pub fractal: FractalDescriptor,
    pub max_iterations: u32,
    pub range: Range,
}

impl FractalComputer {
    pub fn new(fractal: FractalDescriptor, max_iterations: u32, range: Range) -> Self {
        Self {
            fractal,
            max_iterations,
            range,
        }
    }

    pub fn from_job(job: &Job) -> Self {
        Self::new(job.fractal, job.max_iterations, job.range)
    }

    fn intensity(&self, iterations: u32) -> u8 {
        let max = self.max_iterations.max(1) as u64;
        (iterations as u64 * 255 / max) as u8
    }
}

impl RowComputer for FractalComputer {
    fn compute(&self, raster: &RasterInfo, chunk: Chunk, pixels: &mut [u8]) {
        let cols = raster.total_cols as usize;
        if cols == 0 {
            return;
        }
        for (row, line) in chunk.rows().zip(pixels.chunks_exact_mut(cols)) {
            for (col, pixel) in line.iter_mut().enumerate() {
                let point =
                    self.range
                        .project(col as u32, row, raster.total_cols, raster.total_rows);
                *pixel = self.intensity(self.fractal.escape_time(self.max_iterations, point));
            }
        }
    }
}
