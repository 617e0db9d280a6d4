use log::debug;

pub const ADDRESS_VAR: &str = "ROWPULL_ADDRESS";
pub const PORT_VAR: &str = "ROWPULL_PORT";

pub const DEFAULT_ADDRESS: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8787;

/// Loads a `.env` file from the working directory, if any.
pub fn init() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found, using the process environment"),
    }
}

pub fn address() -> String {
    std::env::var(ADDRESS_VAR).unwrap_or_else(|_| DEFAULT_ADDRESS.to_string())
}

pub fn port() -> u16 {
    std::env::var(PORT_VAR)
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
