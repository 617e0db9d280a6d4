use std::path::PathBuf;

use clap::{Args, Parser};
use shared::{env, networking::coordinator::CoordinatorConfig};

use super::FractalKind;

/// 🖼️ Image options shared by the coordinator and local runs.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// 📏 Image width in pixels
    #[arg(long, value_name = "WIDTH", default_value_t = 640)]
    pub width: u32,

    /// 📐 Image height in pixels
    #[arg(long, value_name = "HEIGHT", default_value_t = 480)]
    pub height: u32,

    /// 👥 Number of workers to wait for
    #[arg(short, long, value_name = "COUNT", default_value_t = 4)]
    pub workers: usize,

    /// 🌀 Fractal to render
    #[arg(short, long, value_enum, default_value_t = FractalKind::Mandelbrot)]
    pub fractal: FractalKind,

    /// 🔁 Escape-time iteration cap
    #[arg(long, value_name = "ITERATIONS", default_value_t = 256)]
    pub max_iterations: u32,

    /// 💾 Where to write the PNG
    #[arg(short, long, value_name = "PATH", default_value = "fractal.png")]
    pub output: PathBuf,
}

/// 🖥️ Coordinator Command
///
/// Listens for workers, distributes the rows and collects the image.
#[derive(Parser, Debug)]
#[command(name = "coordinator", about = "🚀 Start and configure the coordinator.", long_about = None)]
pub struct CoordinatorCommand {
    /// 📌 Coordinator IP address
    ///
    /// Falls back to `ROWPULL_ADDRESS`, then `localhost`.
    #[arg(short, long, value_name = "ADDRESS")]
    pub address: Option<String>,

    /// 🚪 Coordinator port
    ///
    /// Falls back to `ROWPULL_PORT`, then 8787.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    #[command(flatten)]
    pub render: RenderArgs,
}

impl CoordinatorCommand {
    pub fn into_config(self) -> CoordinatorConfig {
        let address = self.address.unwrap_or_else(env::address);
        let port = self.port.unwrap_or_else(env::port);
        self.render.into_config(address, port)
    }
}

impl RenderArgs {
    pub fn into_config(self, address: String, port: u16) -> CoordinatorConfig {
        CoordinatorConfig {
            address,
            port,
            workers: self.workers,
            width: self.width,
            height: self.height,
            fractal: self.fractal.descriptor(),
            max_iterations: self.max_iterations,
            output: self.output,
        }
    }
}
