use crate::autoconfigure::ConfigurationError;
use crate::discovery::DiscoveryError;
use crate::lifecycle::ListenerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BootError>;

#[derive(Debug, Error)]
pub enum BootError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}
