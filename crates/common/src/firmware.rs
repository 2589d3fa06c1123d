//! Device models and firmware versions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownDevice;

/// Supported device models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    NanoS,
    NanoSP,
    NanoX,
    Stax,
    Flex,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::NanoS => "nanos",
            Device::NanoSP => "nanosp",
            Device::NanoX => "nanox",
            Device::Stax => "stax",
            Device::Flex => "flex",
        }
    }

    /// Nano screens render light text on a black background
    pub fn is_nano(&self) -> bool {
        matches!(self, Device::NanoS | Device::NanoSP | Device::NanoX)
    }

    pub fn has_touchscreen(&self) -> bool {
        matches!(self, Device::Stax | Device::Flex)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = UnknownDevice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nanos" => Ok(Device::NanoS),
            "nanosp" => Ok(Device::NanoSP),
            "nanox" => Ok(Device::NanoX),
            "stax" => Ok(Device::Stax),
            "flex" => Ok(Device::Flex),
            _ => Err(UnknownDevice(s.to_string())),
        }
    }
}

/// Device model plus firmware version under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firmware {
    pub device: Device,
    pub version: String,
}

impl Firmware {
    pub fn new(device: Device, version: impl Into<String>) -> Self {
        Self {
            device,
            version: version.into(),
        }
    }

    /// Parse from a device name such as `"nanos"`
    pub fn parse(device: &str, version: impl Into<String>) -> Result<Self, UnknownDevice> {
        Ok(Self::new(device.parse()?, version))
    }

    /// Directory segment used for this device's snapshots
    pub fn device_name(&self) -> &'static str {
        self.device.as_str()
    }
}
