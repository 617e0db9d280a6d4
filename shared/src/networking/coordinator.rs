use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::fractal::fractal_descriptor::FractalDescriptor;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    pub address: String,
    pub port: u16,
    pub workers: usize,
    pub width: u32,
    pub height: u32,
    pub fractal: FractalDescriptor,
    pub max_iterations: u32,
    pub output: PathBuf,
}

impl CoordinatorConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
