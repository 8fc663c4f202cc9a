#![deny(unsafe_code)]

use core::convert::Infallible;
use core::num::TryFromIntError;
use hcsr04_mux::ConfigError;

#[derive(Debug)]
pub enum Error {
    Sonar(hcsr04_mux::Error<Infallible>),
    Config(ConfigError),
    ConversionError(TryFromIntError),
    AlreadyInitialized,
}

impl From<hcsr04_mux::Error<Infallible>> for Error {
    fn from(sonar_error: hcsr04_mux::Error<Infallible>) -> Self {
        Error::Sonar(sonar_error)
    }
}

impl From<ConfigError> for Error {
    fn from(config_error: ConfigError) -> Self {
        Error::Config(config_error)
    }
}

impl From<TryFromIntError> for Error {
    fn from(error: TryFromIntError) -> Self {
        Error::ConversionError(error)
    }
}

// GPIO writes on this chip can not fail.
impl From<Infallible> for Error {
    fn from(error: Infallible) -> Self {
        match error {}
    }
}
