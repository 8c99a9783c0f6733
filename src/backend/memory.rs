use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{AudioDevice, BackendError, DeviceBackend};
use crate::config::DeviceConfig;

/// Device table held in process memory. Volume changes for known devices are
/// kept until restart; unknown ids are accepted and ignored.
pub struct InMemoryDeviceBackend {
    devices: Vec<AudioDevice>,
    volumes: RwLock<HashMap<String, i32>>,
}

impl InMemoryDeviceBackend {
    pub fn new(seed: &[DeviceConfig]) -> Self {
        let devices = seed
            .iter()
            .map(|d| AudioDevice {
                id: d.id.clone(),
                name: d.name.clone(),
                room: d.room.clone(),
                model: d.model.clone(),
            })
            .collect();
        let volumes = seed.iter().map(|d| (d.id.clone(), d.volume)).collect();

        Self {
            devices,
            volumes: RwLock::new(volumes),
        }
    }
}

#[async_trait]
impl DeviceBackend for InMemoryDeviceBackend {
    async fn list_devices(&self) -> Result<Vec<AudioDevice>, BackendError> {
        Ok(self.devices.clone())
    }

    async fn get_volume(&self, id: &str) -> Result<Option<i32>, BackendError> {
        Ok(self.volumes.read().await.get(id).copied())
    }

    async fn set_volume(&self, id: &str, volume: i32) -> Result<(), BackendError> {
        let mut volumes = self.volumes.write().await;
        match volumes.get_mut(id) {
            Some(current) => *current = volume,
            None => debug!(device_id = %id, "set_volume for unknown device ignored"),
        }
        Ok(())
    }
}
