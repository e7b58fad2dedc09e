use thiserror::Error;

/// Errors from talking to adb or picking a device
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("'{program}' not found. Ensure adb is installed and in your PATH.")]
    NotFound { program: String },

    #[error("Failed to run adb: {0}")]
    Io(#[from] std::io::Error),

    #[error("adb exited with an error: {message}")]
    Command { message: String },

    #[error("No device available. Attached devices:\n{listing}")]
    NoDevice { listing: String },

    #[error("More than one device attached, choose one with --serial. Attached devices:\n{listing}")]
    AmbiguousDevice { listing: String },

    #[error("Device '{serial}' not found. Attached devices:\n{listing}")]
    UnknownSerial { serial: String, listing: String },

    #[error("Device '{serial}' is {state}, cannot read its logs")]
    DeviceNotReady { serial: String, state: String },

    #[error("Could not read the current year from the device")]
    YearUnavailable,
}
