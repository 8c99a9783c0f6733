use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetSystemStatus,
    GetDevices,
    GetDeviceVolume,
    SetDeviceVolume,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::GetSystemStatus,
        ToolName::GetDevices,
        ToolName::GetDeviceVolume,
        ToolName::SetDeviceVolume,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::GetSystemStatus => "get_system_status",
            ToolName::GetDevices => "get_devices",
            ToolName::GetDeviceVolume => "get_device_volume",
            ToolName::SetDeviceVolume => "set_device_volume",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    String,
    Integer,
}

impl ArgType {
    fn matches(self, value: &Value) -> bool {
        match self {
            ArgType::String => value.is_string(),
            ArgType::Integer => value.is_i64() || value.is_u64(),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            ArgType::String => "a string",
            ArgType::Integer => "an integer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: ArgType,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: BTreeMap<&'static str, PropertySchema>,
    pub required: Vec<&'static str>,
}

impl InputSchema {
    fn object(properties: &[(&'static str, ArgType, &'static str)]) -> Self {
        Self {
            kind: "object",
            properties: properties
                .iter()
                .map(|&(name, kind, description)| (name, PropertySchema { kind, description }))
                .collect(),
            required: properties.iter().map(|&(name, _, _)| name).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

impl ToolDescriptor {
    /// Check every required argument is present with its declared type.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<()> {
        for field in &self.input_schema.required {
            let value = arguments
                .get(*field)
                .ok_or_else(|| AppError::missing_field(field))?;

            if let Some(schema) = self.input_schema.properties.get(field) {
                if !schema.kind.matches(value) {
                    return Err(AppError::invalid_field(field, schema.kind.expected()));
                }
            }
        }
        Ok(())
    }
}

const DEVICE_ID_DESCRIPTION: &str = "The ID of the device";

fn descriptor(name: ToolName) -> ToolDescriptor {
    let (description, input_schema) = match name {
        ToolName::GetSystemStatus => ("Checks the status of the system", InputSchema::object(&[])),
        ToolName::GetDevices => (
            "Retrieves the list of sonos devices in the system",
            InputSchema::object(&[]),
        ),
        ToolName::GetDeviceVolume => (
            "Retrieves the current volume level of a device by ID",
            InputSchema::object(&[("id", ArgType::String, DEVICE_ID_DESCRIPTION)]),
        ),
        ToolName::SetDeviceVolume => (
            "Sets the volume level of a device by ID",
            InputSchema::object(&[
                ("id", ArgType::String, DEVICE_ID_DESCRIPTION),
                ("volume", ArgType::Integer, "The new volume level (0–100)"),
            ]),
        ),
    };

    ToolDescriptor {
        name: name.as_str(),
        description,
        input_schema,
    }
}

/// Immutable tool catalog, built once at startup.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    by_name: HashMap<&'static str, ToolName>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: ToolName::ALL.iter().map(|&name| descriptor(name)).collect(),
            by_name: ToolName::ALL.iter().map(|&name| (name.as_str(), name)).collect(),
        }
    }

    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn resolve(&self, name: &str) -> Option<ToolName> {
        self.by_name.get(name).copied()
    }

    pub fn descriptor(&self, name: ToolName) -> &ToolDescriptor {
        // `tools` follows `ToolName::ALL` order.
        &self.tools[name as usize]
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn list_returns_four_tools_in_fixed_order() {
        let registry = ToolRegistry::new();
        let names: Vec<&str> = registry.list().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "get_system_status",
                "get_devices",
                "get_device_volume",
                "set_device_volume"
            ]
        );
    }

    #[test]
    fn descriptor_lookup_matches_name() {
        let registry = ToolRegistry::new();
        for name in ToolName::ALL {
            assert_eq!(registry.descriptor(name).name, name.as_str());
            assert_eq!(registry.resolve(name.as_str()), Some(name));
        }
        assert_eq!(registry.resolve("reboot_device"), None);
    }

    #[test]
    fn set_device_volume_schema_serializes() {
        let registry = ToolRegistry::new();
        let value = serde_json::to_value(registry.descriptor(ToolName::SetDeviceVolume)).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "set_device_volume",
                "description": "Sets the volume level of a device by ID",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "The ID of the device" },
                        "volume": { "type": "integer", "description": "The new volume level (0–100)" }
                    },
                    "required": ["id", "volume"]
                }
            })
        );
    }

    #[test]
    fn argumentless_tools_have_empty_schema() {
        let registry = ToolRegistry::new();
        let value = serde_json::to_value(registry.descriptor(ToolName::GetDevices)).unwrap();
        assert_eq!(
            value["inputSchema"],
            json!({ "type": "object", "properties": {}, "required": [] })
        );
    }

    #[test]
    fn validate_reports_missing_argument() {
        let registry = ToolRegistry::new();
        let args = json!({ "id": "1" });
        let err = registry
            .descriptor(ToolName::SetDeviceVolume)
            .validate(args.as_object().unwrap())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid params: Missing field: volume");
    }

    #[test]
    fn validate_reports_type_mismatch() {
        let registry = ToolRegistry::new();
        let args = json!({ "id": 1 });
        let err = registry
            .descriptor(ToolName::GetDeviceVolume)
            .validate(args.as_object().unwrap())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid params: Field id must be a string");
    }

    #[test]
    fn validate_accepts_extra_arguments() {
        let registry = ToolRegistry::new();
        let args = json!({ "id": "1", "volume": 30, "fade": true });
        assert!(registry
            .descriptor(ToolName::SetDeviceVolume)
            .validate(args.as_object().unwrap())
            .is_ok());
    }
}
