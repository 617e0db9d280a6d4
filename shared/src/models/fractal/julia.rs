use complex_rs::complex::Complex;
use serde::{Deserialize, Serialize};

use crate::models::point::Point;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Julia {
    pub c: Complex,
    pub divergence_threshold_square: f64,
}

impl Julia {
    pub fn new(c: Complex, divergence_threshold_square: f64) -> Self {
        Self {
            c,
            divergence_threshold_square,
        }
    }

    pub fn escape_time(&self, max_iterations: u32, point: Point) -> u32 {
        let z = Complex::new(point.x, point.y);
        Complex::escape_time(z, self.c, self.divergence_threshold_square, max_iterations)
    }
}

impl Default for Julia {
    fn default() -> Self {
        Self::new(Complex::new(0.285, 0.013), 4.0)
    }
}
