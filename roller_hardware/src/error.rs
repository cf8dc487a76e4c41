use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("feedback bus already released")]
    Released,
    #[error("unsupported {what}: {value}")]
    Unsupported { what: &'static str, value: u32 },
}

pub type Result<T> = std::result::Result<T, HwError>;
