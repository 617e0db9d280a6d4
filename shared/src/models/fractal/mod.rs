pub mod fractal_descriptor;
pub mod julia;
pub mod mandelbrot;
