use clap::{Subcommand, ValueEnum};
use shared::models::fractal::{
    fractal_descriptor::FractalDescriptor, julia::Julia, mandelbrot::Mandelbrot,
};

use self::{coordinator::CoordinatorCommand, local::LocalCommand, worker::WorkerCommand};

pub mod coordinator;
pub mod local;
pub mod worker;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 🚀 Start Coordinator
    ///
    /// Wait for the workers, hand out rows and write the finished image.
    Coordinator(CoordinatorCommand),

    /// 👷 Worker Mode
    ///
    /// Connect to a coordinator and compute the rows it assigns.
    Worker(WorkerCommand),

    /// 🧪 Local Run
    ///
    /// Run the coordinator and its workers as tasks of this process.
    Local(LocalCommand),
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum FractalKind {
    #[default]
    Mandelbrot,
    Julia,
}

impl FractalKind {
    pub fn descriptor(self) -> FractalDescriptor {
        match self {
            FractalKind::Mandelbrot => FractalDescriptor::Mandelbrot(Mandelbrot::new()),
            FractalKind::Julia => FractalDescriptor::Julia(Julia::default()),
        }
    }
}
