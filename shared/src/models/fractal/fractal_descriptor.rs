use super::{julia::Julia, mandelbrot::Mandelbrot};
use crate::models::{point::Point, range::Range};

use serde::{Deserialize, Serialize};
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FractalDescriptor {
    Julia(Julia),
    Mandelbrot(Mandelbrot),
}

impl FractalDescriptor {
    pub fn escape_time(&self, max_iterations: u32, point: Point) -> u32 {
        match self {
            FractalDescriptor::Julia(julia) => julia.escape_time(max_iterations, point),
            FractalDescriptor::Mandelbrot(mandelbrot) => {
                mandelbrot.escape_time(max_iterations, point)
            }
        }
    }

    /// The part of the plane where the fractal is worth looking at.
    pub fn default_range(&self) -> Range {
        match self {
            FractalDescriptor::Julia(_) => Range::new(Point::new(-1.6, -1.2), Point::new(1.6, 1.2)),
            FractalDescriptor::Mandelbrot(_) => {
                Range::new(Point::new(-2.2, -1.2), Point::new(1.0, 1.2))
            }
        }
    }
}
