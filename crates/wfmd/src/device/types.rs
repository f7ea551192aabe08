//! Value types exchanged with the device.

use std::fmt;

/// Trigger types the server can program. Only edge triggering is offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fire when the source crosses the level on the selected slope.
    #[default]
    Edge,
}

impl TriggerMode {
    /// Parses a `TRIG:MODE` argument (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        value.eq_ignore_ascii_case("EDGE").then_some(Self::Edge)
    }
}

/// Edge direction for edge triggers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerSlope {
    /// Low-to-high crossing.
    #[default]
    Rising,
    /// High-to-low crossing.
    Falling,
    /// Either crossing.
    Either,
}

impl TriggerSlope {
    /// Parses a `TRIG:EDGE:DIR` argument; anything unrecognised means either.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("RISING") {
            Self::Rising
        } else if value.eq_ignore_ascii_case("FALLING") {
            Self::Falling
        } else {
            Self::Either
        }
    }
}

/// Number of records captured per arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionMode {
    /// One buffer per trigger event.
    Single,
    /// Free-running acquisition.
    Continuous,
}

/// Sample-rate limits of the device, in hertz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    /// Slowest supported sample rate.
    pub min_hz: f64,
    /// Fastest supported sample rate.
    pub max_hz: f64,
}

/// Fields of the identification string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Manufacturer name.
    pub vendor: String,
    /// Model name.
    pub model: String,
    /// Unit serial number.
    pub serial: String,
    /// Firmware or driver version.
    pub firmware: String,
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{},{},{},{}",
            self.vendor, self.model, self.serial, self.firmware
        )
    }
}
