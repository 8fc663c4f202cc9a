#![deny(unsafe_code)]

use core::fmt::{Display, Formatter};

use crate::config::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Error<E> {
    Pin(E),
    Config(ConfigError),
}

impl<E> From<ConfigError> for Error<E> {
    fn from(config_error: ConfigError) -> Self {
        Error::Config(config_error)
    }
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Pin(error) => write!(f, "pin error: {}", error),
            Error::Config(error) => write!(f, "invalid configuration: {}", error),
        }
    }
}
