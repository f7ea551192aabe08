//! `mockall` double for the Device Control Port, shared by unit tests.

use mockall::mock;

use super::{
    AcquisitionMode, DeviceControl, DeviceIdentity, DeviceResult, FrequencyRange, TriggerMode,
    TriggerSlope,
};

mock! {
    pub Device {}
    impl DeviceControl for Device {
        fn identity(&self) -> DeviceIdentity;
        fn channel_count(&self) -> usize;
        fn reset(&mut self) -> DeviceResult<()>;
        fn set_channel_enable(&mut self, channel: usize, enabled: bool) -> DeviceResult<()>;
        fn set_offset(&mut self, channel: usize, volts: f64) -> DeviceResult<()>;
        fn set_attenuation(&mut self, channel: usize, factor: f64) -> DeviceResult<()>;
        fn set_range(&mut self, channel: usize, volts: f64) -> DeviceResult<()>;
        fn set_sample_rate(&mut self, hz: u64) -> DeviceResult<()>;
        fn set_buffer_size(&mut self, samples: u64) -> DeviceResult<()>;
        fn set_trigger_type(&mut self, mode: TriggerMode) -> DeviceResult<()>;
        fn set_trigger_slope(&mut self, slope: TriggerSlope) -> DeviceResult<()>;
        fn set_trigger_level(&mut self, volts: f64) -> DeviceResult<()>;
        fn set_trigger_source(&mut self, channel: usize) -> DeviceResult<()>;
        fn set_auto_trigger_timeout(&mut self, seconds: f64) -> DeviceResult<()>;
        fn set_trigger_position(&mut self, seconds: f64) -> DeviceResult<f64>;
        fn frequency_range(&mut self) -> DeviceResult<FrequencyRange>;
        fn configure(&mut self, reconfigure: bool, start: bool) -> DeviceResult<()>;
        fn set_acquisition_mode(&mut self, mode: AcquisitionMode) -> DeviceResult<()>;
    }
}

/// Builds a mock with a fixed channel count and permissive lifecycle calls.
///
/// Tests add their own expectations for the calls they care about; the
/// arm/disarm calls succeed any number of times.
pub(crate) fn permissive_device(channels: usize) -> MockDevice {
    let mut device = MockDevice::new();
    device.expect_channel_count().return_const(channels);
    device.expect_configure().returning(|_, _| Ok(()));
    device.expect_set_acquisition_mode().returning(|_| Ok(()));
    device
}
