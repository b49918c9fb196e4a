//! Identification of the device a run executed on.

use std::fmt;

use serde::Serialize;

/// Device class requested from (and reported by) the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Gpu,
    Cpu,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Gpu => write!(f, "GPU"),
            DeviceKind::Cpu => write!(f, "CPU"),
        }
    }
}

/// Identification strings and limits of the selected device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    /// Platform name (e.g. "NVIDIA CUDA", "Portable Computing Language").
    pub platform: String,
    /// Device name (e.g. "NVIDIA GeForce RTX 3080").
    pub name: String,
    pub vendor: String,
    pub kind: DeviceKind,
    /// True when the preferred class was missing and the fallback was used.
    pub fell_back: bool,
    pub max_work_group_size: usize,
    pub global_mem_bytes: u64,
}

impl DeviceInfo {
    /// Global memory in MiB, for display.
    pub fn global_mem_mib(&self) -> f64 {
        self.global_mem_bytes as f64 / (1024.0 * 1024.0)
    }

    /// One-line label: "<name> (<kind>, <platform>)".
    pub fn label(&self) -> String {
        format!("{} ({}, {})", self.name, self.kind, self.platform)
    }
}
