//! Platform and device discovery.
//!
//! Only the first platform reported by the ICD loader is considered. The
//! preferred device class is tried first; if the platform has none, one
//! retry is made with the fallback class. There is no further search.

use opencl3::device::{Device, CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_GPU};
use opencl3::platform::{get_platforms, Platform};
use opencl3::types::{cl_device_id, cl_device_type};

use crate::error::{ComputeError, STATUS_DEVICE_NOT_FOUND, STATUS_PLATFORM_NOT_FOUND};
use crate::hardware::{DeviceInfo, DeviceKind};

fn type_mask(kind: DeviceKind) -> cl_device_type {
    match kind {
        DeviceKind::Gpu => CL_DEVICE_TYPE_GPU,
        DeviceKind::Cpu => CL_DEVICE_TYPE_CPU,
    }
}

/// The selected device plus its identification strings.
pub struct DeviceHandle {
    device: Device,
    info: DeviceInfo,
}

impl DeviceHandle {
    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn id(&self) -> cl_device_id {
        self.device.id()
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Pick one device: `preferred` class first, then `fallback` if given.
pub fn discover_device(
    preferred: DeviceKind,
    fallback: Option<DeviceKind>,
) -> Result<DeviceHandle, ComputeError> {
    let platform = get_platforms()
        .map_err(|e| ComputeError::NoPlatform { status: e.0 })?
        .into_iter()
        .next()
        .ok_or(ComputeError::NoPlatform {
            status: STATUS_PLATFORM_NOT_FOUND,
        })?;
    let platform_name = platform.name().unwrap_or_default().trim().to_string();
    tracing::info!(platform = %platform_name, "platform selected");

    let (id, kind, fell_back) = match first_device(&platform, preferred) {
        Ok(id) => (id, preferred, false),
        Err(status) => {
            let Some(fallback) = fallback else {
                return Err(ComputeError::NoDevice {
                    platform: platform_name,
                    status,
                });
            };
            tracing::warn!(
                preferred = %preferred,
                fallback = %fallback,
                status,
                "preferred device class not found, retrying with fallback"
            );
            let id = first_device(&platform, fallback).map_err(|status| ComputeError::NoDevice {
                platform: platform_name.clone(),
                status,
            })?;
            (id, fallback, true)
        }
    };

    let device = Device::new(id);
    let info = DeviceInfo {
        platform: platform_name,
        name: device.name().unwrap_or_default().trim().to_string(),
        vendor: device.vendor().unwrap_or_default().trim().to_string(),
        kind,
        fell_back,
        max_work_group_size: device.max_work_group_size().unwrap_or(1),
        global_mem_bytes: device.global_mem_size().unwrap_or(0),
    };
    tracing::info!(device = %info.name, kind = %info.kind, "device selected");

    Ok(DeviceHandle { device, info })
}

fn first_device(platform: &Platform, kind: DeviceKind) -> Result<cl_device_id, i32> {
    match platform.get_devices(type_mask(kind)) {
        Ok(ids) => ids.first().copied().ok_or(STATUS_DEVICE_NOT_FOUND),
        Err(e) => Err(e.0),
    }
}
