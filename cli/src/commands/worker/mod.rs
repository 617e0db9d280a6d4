use clap::Parser;
use shared::{env, networking::worker::WorkerConfig};
use uuid::Uuid;

#[derive(Parser, Debug)]
pub struct WorkerCommand {
    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub address: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,
}

impl WorkerCommand {
    pub fn into_config(self) -> WorkerConfig {
        let name = self
            .name
            .unwrap_or_else(|| format!("worker-{}", Uuid::new_v4()));
        let address = self.address.unwrap_or_else(env::address);
        let port = self.port.unwrap_or_else(env::port);
        WorkerConfig::new(name, address, port)
    }
}
