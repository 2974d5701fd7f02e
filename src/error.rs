use core::convert::Infallible;

use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can go wrong inside the clock core or one of its collaborators.
#[derive(Debug, Display, Error, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[display("timer slot period must be greater than zero")]
    InvalidPeriod,

    #[display("no free timer slots left")]
    SchedulerFull,

    #[display("no timer slot with that id")]
    UnknownSlot,

    #[display("ambient light sensor unavailable")]
    SensorUnavailable,

    #[display("network time unavailable")]
    TimeUnavailable,

    #[display("timestamp out of range")]
    InvalidTimestamp,

    #[display("hardware transfer failed")]
    Transfer,

    #[display("text buffer too small")]
    Format,
}

impl From<Infallible> for Error {
    fn from(_: Infallible) -> Self {
        Self::Transfer
    }
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Self::Format
    }
}

impl From<time::error::ComponentRange> for Error {
    fn from(_: time::error::ComponentRange) -> Self {
        Self::InvalidTimestamp
    }
}
