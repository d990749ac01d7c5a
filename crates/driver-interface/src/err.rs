use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// A register window, interrupt line or pin state could not be acquired.
    #[error("resource `{0}` unavailable")]
    ResourceUnavailable(&'static str),
    #[error("failed to allocate rc device")]
    DecoderAllocationFailed,
    #[error("failed to register rc device")]
    RegistrationFailed,
    #[error("parameter `{name}` is invalid")]
    InvalidParameter { name: &'static str },
    #[error("not supported")]
    NotSupported,
}

pub type DriverResult<T = ()> = core::result::Result<T, DriverError>;
