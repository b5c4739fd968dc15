//! Agent actions implemented with [candle](https://crates.io/crates/candle-core).
//!
//! [`AgentAction`] holds the actions produced by a policy as tensors and
//! converts them to and from the named arrays of a flat buffer
//! ([`ArrayDict`](mlagents_core::ArrayDict)).
mod agent_action;
pub mod util;
pub use agent_action::AgentAction;
use anyhow::Result;
use candle_core::DeviceLocation;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Eq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// A CUDA device with the given ordinal.
    Cuda(usize),

    /// A Metal device with the given ordinal.
    Metal(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}

impl Device {
    /// Creates the corresponding [`candle_core::Device`].
    ///
    /// Fails if candle was built without support for the device.
    pub fn to_candle(self) -> Result<candle_core::Device> {
        Ok(match self {
            Self::Cpu => candle_core::Device::Cpu,
            Self::Cuda(n) => candle_core::Device::new_cuda(n)?,
            Self::Metal(n) => candle_core::Device::new_metal(n)?,
        })
    }
}

impl From<&candle_core::Device> for Device {
    fn from(device: &candle_core::Device) -> Self {
        match device.location() {
            DeviceLocation::Cpu => Self::Cpu,
            DeviceLocation::Cuda { gpu_id } => Self::Cuda(gpu_id),
            DeviceLocation::Metal { gpu_id } => Self::Metal(gpu_id),
        }
    }
}
