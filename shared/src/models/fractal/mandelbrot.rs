use complex_rs::complex::Complex;
use serde::{Deserialize, Serialize};

use crate::models::point::Point;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Mandelbrot {}

impl Mandelbrot {
    pub fn new() -> Self {
        Self {}
    }

    pub fn escape_time(&self, max_iterations: u32, point: Point) -> u32 {
        let c = Complex::new(point.x, point.y);
        Complex::escape_time(Complex::ZERO, c, 4.0, max_iterations)
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self::new()
    }
}
