use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaneError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing trigger output")]
    MissingTrigger,
    #[error("missing echo input")]
    MissingEcho,
    #[error("missing buzzer")]
    MissingBuzzer,
    #[error("missing light sensor")]
    MissingLightSensor,
    #[error("missing led output")]
    MissingLed,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
