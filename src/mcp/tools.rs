use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::backend::DeviceBackend;
use crate::error::{AppError, Result};
use crate::mcp::registry::{ToolName, ToolRegistry};
use crate::mcp::types::ContentEnvelope;

/// Second-level dispatch for `tools/call`: resolves the tool, validates its
/// arguments against the registry schema and runs it against the backend.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    backend: Arc<dyn DeviceBackend>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, backend: Arc<dyn DeviceBackend>) -> Self {
        Self { registry, backend }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn call(&self, name: &str, arguments: &Map<String, Value>) -> Result<ContentEnvelope> {
        let Some(tool) = self.registry.resolve(name) else {
            debug!(tool = %name, "unknown tool requested");
            return Ok(ContentEnvelope::text(format!("Unknown tool: {}", name)));
        };

        self.registry.descriptor(tool).validate(arguments)?;
        info!(tool = %name, "invoking tool");

        match tool {
            ToolName::GetSystemStatus => Ok(ContentEnvelope::text("System is running")),
            ToolName::GetDevices => self.get_devices().await,
            ToolName::GetDeviceVolume => self.get_device_volume(arguments).await,
            ToolName::SetDeviceVolume => self.set_device_volume(arguments).await,
        }
    }

    async fn get_devices(&self) -> Result<ContentEnvelope> {
        let devices = self.backend.list_devices().await?;
        Ok(ContentEnvelope::json(&devices)?)
    }

    async fn get_device_volume(&self, args: &Map<String, Value>) -> Result<ContentEnvelope> {
        let id = required_str(args, "id")?;

        let text = match self.backend.get_volume(id).await? {
            Some(volume) => format!("Volume for device {} is {}", id, volume),
            None => format!("No device found with id {}", id),
        };
        Ok(ContentEnvelope::text(text))
    }

    async fn set_device_volume(&self, args: &Map<String, Value>) -> Result<ContentEnvelope> {
        let id = required_str(args, "id")?;
        let volume = required_i32(args, "volume")?;

        self.backend.set_volume(id, volume).await?;
        Ok(ContentEnvelope::text(format!(
            "Volume for device {} set to {}",
            id, volume
        )))
    }
}

fn required_str<'a>(args: &'a Map<String, Value>, field: &str) -> Result<&'a str> {
    args.get(field)
        .ok_or_else(|| AppError::missing_field(field))?
        .as_str()
        .ok_or_else(|| AppError::invalid_field(field, "a string"))
}

fn required_i32(args: &Map<String, Value>, field: &str) -> Result<i32> {
    let value = args
        .get(field)
        .ok_or_else(|| AppError::missing_field(field))?;

    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| AppError::invalid_field(field, "a 32-bit integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AudioDevice, BackendError, InMemoryDeviceBackend, MockDeviceBackend};
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dispatcher_with(backend: impl DeviceBackend + 'static) -> ToolDispatcher {
        ToolDispatcher::new(Arc::new(ToolRegistry::new()), Arc::new(backend))
    }

    fn dispatcher() -> ToolDispatcher {
        dispatcher_with(InMemoryDeviceBackend::new(&Config::default().devices))
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    async fn call_text(dispatcher: &ToolDispatcher, name: &str, arguments: Value) -> String {
        dispatcher
            .call(name, &args(arguments))
            .await
            .unwrap()
            .first_text()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn get_system_status_reports_running() {
        assert_eq!(
            call_text(&dispatcher(), "get_system_status", json!({})).await,
            "System is running"
        );
    }

    #[tokio::test]
    async fn get_devices_flattens_list_to_text() {
        let text = call_text(&dispatcher(), "get_devices", json!({})).await;
        let devices: Vec<AudioDevice> = serde_json::from_str(&text).unwrap();
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].name, "Living Room");
        assert_eq!(devices[2].id, "3");
    }

    #[tokio::test]
    async fn get_device_volume_known_and_unknown() {
        let dispatcher = dispatcher();
        for (id, volume) in [("1", 25), ("2", 40), ("3", 15)] {
            assert_eq!(
                call_text(&dispatcher, "get_device_volume", json!({ "id": id })).await,
                format!("Volume for device {} is {}", id, volume)
            );
        }
        assert_eq!(
            call_text(&dispatcher, "get_device_volume", json!({ "id": "7" })).await,
            "No device found with id 7"
        );
    }

    #[tokio::test]
    async fn set_device_volume_confirms_unknown_device() {
        assert_eq!(
            call_text(&dispatcher(), "set_device_volume", json!({ "id": "9", "volume": 50 })).await,
            "Volume for device 9 set to 50"
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_soft() {
        assert_eq!(
            call_text(&dispatcher(), "reboot_device", json!({})).await,
            "Unknown tool: reboot_device"
        );
    }

    #[tokio::test]
    async fn missing_required_argument_is_hard_fault() {
        let err = dispatcher()
            .call("set_device_volume", &args(json!({ "id": "1" })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn wrongly_typed_argument_is_hard_fault() {
        let err = dispatcher()
            .call("set_device_volume", &args(json!({ "id": "1", "volume": "loud" })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid params: Field volume must be an integer");
    }

    #[tokio::test]
    async fn out_of_range_volume_is_hard_fault() {
        let err = dispatcher()
            .call(
                "set_device_volume",
                &args(json!({ "id": "1", "volume": 5_000_000_000i64 })),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid params: Field volume must be a 32-bit integer"
        );
    }

    #[tokio::test]
    async fn volume_reads_come_from_backend() {
        let mut backend = MockDeviceBackend::new();
        backend
            .expect_get_volume()
            .times(1)
            .returning(|id| Ok(if id == "kitchen" { Some(77) } else { None }));

        let text = call_text(
            &dispatcher_with(backend),
            "get_device_volume",
            json!({ "id": "kitchen" }),
        )
        .await;
        assert_eq!(text, "Volume for device kitchen is 77");
    }

    #[tokio::test]
    async fn set_volume_is_forwarded_to_backend() {
        let mut backend = MockDeviceBackend::new();
        backend
            .expect_set_volume()
            .times(1)
            .returning(|_, volume| {
                assert_eq!(volume, 12);
                Ok(())
            });

        let text = call_text(
            &dispatcher_with(backend),
            "set_device_volume",
            json!({ "id": "4", "volume": 12 }),
        )
        .await;
        assert_eq!(text, "Volume for device 4 set to 12");
    }

    #[tokio::test]
    async fn backend_failure_is_hard_fault() {
        let mut backend = MockDeviceBackend::new();
        backend
            .expect_list_devices()
            .returning(|| Err(BackendError::Unavailable("bridge offline".into())));

        let err = dispatcher_with(backend)
            .call("get_devices", &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
    }

    #[tokio::test]
    async fn validation_runs_before_backend() {
        // No expectations set: any backend call would panic.
        let backend = MockDeviceBackend::new();
        let err = dispatcher_with(backend)
            .call("get_device_volume", &Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid params: Missing field: id");
    }
}
