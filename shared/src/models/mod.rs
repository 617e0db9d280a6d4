pub mod chunk;
pub mod fractal;
pub mod point;
pub mod range;
pub mod raster;
