//! Core conversion abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use currency::{ConversionRequest, CurrencyConverter, CurrencyMapping, ProviderQuery};
pub use error::{CommandError, ConversionError};
