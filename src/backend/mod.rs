pub mod memory;

pub use memory::InMemoryDeviceBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDevice {
    pub id: String,
    pub name: String,
    pub room: String,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("device backend unavailable: {0}")]
    Unavailable(String),
    #[error("device command failed: {0}")]
    Command(String),
}

/// Source of truth for audio devices. Tool handlers only ever talk to this
/// trait, so a network-backed implementation can replace the in-memory one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceBackend: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<AudioDevice>, BackendError>;

    /// `Ok(None)` means no device has this id.
    async fn get_volume(&self, id: &str) -> Result<Option<i32>, BackendError>;

    /// Implementations decide what happens for unknown ids; callers do not
    /// check existence first.
    async fn set_volume(&self, id: &str, volume: i32) -> Result<(), BackendError>;
}
