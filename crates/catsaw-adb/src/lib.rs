//! adb client for catsaw
//!
//! This crate wraps the `adb` command line: device discovery, pid lookup,
//! device clock queries, package listing, and the logcat command itself.

mod client;
mod error;

pub use client::{AdbClient, parse_devices, select_device};
pub use error::AdbError;

// Re-export types that are used in our public API
pub use catsaw_types::{DeviceBridge, DeviceInfo, DeviceState};
