use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub name: String,
    pub address: String,
    pub port: u16,
}

impl WorkerConfig {
    pub fn new(name: String, address: String, port: u16) -> Self {
        Self {
            name,
            address,
            port,
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
