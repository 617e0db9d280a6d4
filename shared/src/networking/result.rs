use super::error::NetworkingError;

pub type NetworkingResult<T> = std::result::Result<T, NetworkingError>;
