use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identity errors
    #[error("Invalid controller uid: {message}")]
    InvalidUid { message: String },

    // Telemetry decoding errors
    #[error("Invalid battery status code: {code}")]
    InvalidBatteryStatus { code: i32 },

    #[error("Invalid switch position code: {code}")]
    InvalidSwitchPosition { code: i32 },

    #[error("Invalid button label code: {code}")]
    InvalidButtonLabel { code: i32 },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
