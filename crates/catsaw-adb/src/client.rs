use std::process::{Command, Stdio};

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::AdbError;
use catsaw_types::{DeviceBridge, DeviceInfo, DeviceState};

/// Thin wrapper around the `adb` executable
#[derive(Clone, Debug)]
pub struct AdbClient {
    program: String,
    serial: Option<String>,
}

impl AdbClient {
    /// Create a client that runs the given adb executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            serial: None,
        }
    }

    /// Target a specific device for every following call
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    fn device_args(&self) -> Vec<String> {
        match &self.serial {
            Some(serial) => vec!["-s".to_string(), serial.clone()],
            None => Vec::new(),
        }
    }

    fn map_spawn_error(&self, e: std::io::Error) -> AdbError {
        if e.kind() == std::io::ErrorKind::NotFound {
            AdbError::NotFound {
                program: self.program.clone(),
            }
        } else {
            AdbError::Io(e)
        }
    }

    /// List attached devices
    pub fn devices(&self) -> Result<Vec<DeviceInfo>, AdbError> {
        let output = Command::new(&self.program)
            .arg("devices")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(AdbError::Command {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_devices(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Run `adb shell <args>` and return trimmed stdout, `None` when empty or failed
    fn shell(&self, args: &[&str]) -> Option<String> {
        let result = Command::new(&self.program)
            .args(self.device_args())
            .arg("shell")
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        match result {
            Ok(output) => {
                let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if text.is_empty() { None } else { Some(text) }
            }
            Err(e) => {
                warn!("adb shell {:?} failed: {}", args, e);
                None
            }
        }
    }

    /// Year on the device, required to date threadtime records
    pub fn session_year(&self) -> Result<i32, AdbError> {
        self.current_device_year().ok_or(AdbError::YearUnavailable)
    }

    /// Build the long-running logcat command in threadtime format
    pub fn logcat_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(self.device_args())
            .args(["logcat", "-v", "threadtime"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Start `adb logcat` with piped output
    pub fn spawn_logcat(&self) -> Result<tokio::process::Child, AdbError> {
        self.logcat_command()
            .spawn()
            .map_err(|e| self.map_spawn_error(e))
    }
}

impl DeviceBridge for AdbClient {
    fn lookup_pid(&self, process_name: &str) -> Option<String> {
        // pidof may print several pids; the first one is the main process
        let pid = self
            .shell(&["pidof", process_name])?
            .split_whitespace()
            .next()
            .map(str::to_string);
        debug!("pidof {} -> {:?}", process_name, pid);
        pid
    }

    fn current_device_time(&self) -> Option<NaiveDateTime> {
        let output = self.shell(&["date", "'+%s %z'"])?;
        parse_device_clock(&output)
    }

    fn current_device_year(&self) -> Option<i32> {
        self.shell(&["date", "+%Y"])?.parse().ok()
    }

    fn list_packages(&self) -> Vec<String> {
        self.shell(&["cmd", "package", "list", "packages", "-e"])
            .map(|out| {
                out.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Parse the output of `adb devices`
pub fn parse_devices(output: &str) -> Vec<DeviceInfo> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("List of devices") && !l.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            Some(DeviceInfo::new(serial.to_string(), DeviceState::from(state)))
        })
        .collect()
}

fn device_listing(devices: &[DeviceInfo]) -> String {
    if devices.is_empty() {
        return "  (none)".to_string();
    }
    devices
        .iter()
        .map(|d| format!("  {}\t{}", d.serial, d.state.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pick the device to read logs from
///
/// With a requested serial that device must be attached and ready. Without
/// one, exactly one ready device must be attached.
pub fn select_device(devices: &[DeviceInfo], wanted: Option<&str>) -> Result<DeviceInfo, AdbError> {
    let listing = device_listing(devices);

    let device = match wanted {
        Some(serial) => devices
            .iter()
            .find(|d| d.serial == serial)
            .ok_or_else(|| AdbError::UnknownSerial {
                serial: serial.to_string(),
                listing: listing.clone(),
            })?,
        None => {
            let ready: Vec<&DeviceInfo> = devices.iter().filter(|d| d.is_ready()).collect();
            match ready.as_slice() {
                [] => return Err(AdbError::NoDevice { listing }),
                [single] => *single,
                _ => return Err(AdbError::AmbiguousDevice { listing }),
            }
        }
    };

    if !device.is_ready() {
        return Err(AdbError::DeviceNotReady {
            serial: device.serial.clone(),
            state: device.state.as_str().to_string(),
        });
    }

    Ok(device.clone())
}

/// Parse `<epoch seconds> <+hhmm>` into the device's local wall-clock time
fn parse_device_clock(output: &str) -> Option<NaiveDateTime> {
    let mut parts = output.split_whitespace();
    let seconds: i64 = parts.next()?.parse().ok()?;
    let offset = match parts.next().and_then(parse_utc_offset) {
        Some(offset) => offset,
        None => FixedOffset::east_opt(0)?,
    };

    let utc = DateTime::from_timestamp(seconds, 0)?;
    Some(utc.with_timezone(&offset).naive_local())
}

/// Parse a `date +%z` style offset such as `+0200` or `-0530`
fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let (sign, digits) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
