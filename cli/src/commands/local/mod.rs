use clap::Parser;
use shared::networking::coordinator::CoordinatorConfig;

use super::coordinator::RenderArgs;

#[derive(Parser, Debug)]
pub struct LocalCommand {
    #[command(flatten)]
    pub render: RenderArgs,
}

impl LocalCommand {
    pub fn into_config(self) -> CoordinatorConfig {
        // Nothing listens in a local run.
        self.render.into_config(String::new(), 0)
    }
}
