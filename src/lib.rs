#![cfg_attr(not(test), no_std)]

mod fmt; // must stay first so the logging macros are visible below

pub mod accessors;
pub mod bus_operation;
pub mod consts;
pub mod enable;

#[allow(unused_imports)]
use accessors::*;
pub use bus_operation::*;
use consts::*;
pub use enable::*;

use embedded_hal::{
    i2c::{I2c, SevenBitAddress},
    digital::OutputPin,
    delay::DelayNs
};

use bitfield::bitfield;

pub struct Gp2ap03vt00f<B: BusOperation, EN: EnableLine, T: DelayNs> {
    pub(crate) bus: Option<B>,
    pub(crate) en: Option<EN>,
    pub(crate) config: Config,
    pub(crate) lifecycle: Lifecycle,

    pub tim: T
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<B> {
    Bus(B),
    Pin,
    NoBus,
    UnexpectedId { got: u8, expected: u8 },
    Timeout,
    InvalidParam,
}

impl<B: core::fmt::Debug> core::fmt::Display for Error<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {e:?}"),
            Error::Pin => write!(f, "enable line error"),
            Error::NoBus => write!(f, "no bus bound to the sensor"),
            Error::UnexpectedId { got, expected } => {
                write!(f, "unexpected device id {got:#04x}, expected {expected:#04x}")
            }
            Error::Timeout => write!(f, "measurement did not complete in time"),
            Error::InvalidParam => write!(f, "invalid parameter"),
        }
    }
}

/// Driver-side view of the handle. The device keeps its own power state in
/// the operating mode register; this tag is informational and never used to
/// reject a call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lifecycle {
    /// No bus has been handed to the driver.
    Unbound,
    /// A bus is held but the sensor is not configured (identification failed,
    /// or the sensor was shut down with `end`).
    Bound,
    /// Identification passed and the configuration table was written.
    Ready,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeMode {
    Short,
    Long,
}

impl RangeMode {
    pub fn configuration(self) -> &'static [(u8, u8); GP2AP03VT00F_CONFIGURATION_SIZE] {
        match self {
            RangeMode::Short => &GP2AP03VT00F_SHORT_RANGE_CONFIGURATION,
            RangeMode::Long => &GP2AP03VT00F_LONG_RANGE_CONFIGURATION,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub range_mode: RangeMode,
    /// Upper bound on completion polls in `wait_measurement_end`. `None` polls
    /// forever; `Some(0)` times out without touching the bus.
    pub max_polls: Option<u32>,
    /// Delay between two completion polls, in ms.
    pub poll_interval_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            range_mode: RangeMode::Long,
            max_polls: None,
            poll_interval_ms: 1,
        }
    }
}

bitfield! {
    /// Quality flags of the last measurement, as read from the range status register.
    #[derive(Copy, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct RangeStatus(u8);
    impl Debug;
    pub vcsel_short, _: 0;
    pub low_signal, _: 1;
    pub low_sn, _: 2;
    pub too_much_ambient, _: 3;
    pub wide_angle_fault, _: 4;
    pub calibration_error, _: 5;
    pub crosstalk_error, _: 7;
}

impl RangeStatus {
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// No flag raised: distance data can be trusted.
    pub fn is_valid(&self) -> bool {
        self.0 == GP2AP03VT00F_RANGE_STATUS_VALID_DATA
    }
}

impl From<u8> for RangeStatus {
    fn from(value: u8) -> Self {
        RangeStatus(value)
    }
}

impl From<RangeStatus> for u8 {
    fn from(status: RangeStatus) -> Self {
        status.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementSample {
    pub coarse: u8,
    pub fine: u8,
    pub status: RangeStatus,
}

impl<B: BusOperation, EN: EnableLine, T: DelayNs> Gp2ap03vt00f<B, EN, T> {
    /// Creates an unbound handle. Nothing touches the hardware until [`begin`](Self::begin).
    pub fn new(tim: T) -> Self {
        Self::with_config(tim, Config::default())
    }

    pub fn with_config(tim: T, config: Config) -> Self {
        Gp2ap03vt00f {
            bus: None,
            en: None,
            config,
            lifecycle: Lifecycle::Unbound,
            tim,
        }
    }

    /// Reads `rbuf.len()` bytes starting at `reg`. Leaves `rbuf` untouched when no bus is bound.
    pub fn read_from_register(&mut self, reg: u8, rbuf: &mut [u8]) -> Result<(), Error<B::Error>> {
        let Some(bus) = self.bus.as_mut() else {
            return Ok(());
        };
        if rbuf.is_empty() {
            return Err(Error::InvalidParam);
        }
        bus.write(&[reg]).map_err(Error::Bus)?;
        bus.read(rbuf).map_err(Error::Bus)?;
        trace!("read {:#x} -> {} byte(s)", reg, rbuf.len());

        Ok(())
    }

    /// Writes `wbuf` starting at `reg` in a single transaction.
    pub fn write_to_register(&mut self, reg: u8, wbuf: &[u8]) -> Result<(), Error<B::Error>> {
        let Some(bus) = self.bus.as_mut() else {
            return Ok(());
        };
        if wbuf.is_empty() {
            return Ok(());
        }
        if wbuf.len() > GP2AP03VT00F_MAX_WRITE_SIZE {
            return Err(Error::InvalidParam);
        }
        let mut tmp: [u8; GP2AP03VT00F_MAX_WRITE_SIZE + 1] = [0; GP2AP03VT00F_MAX_WRITE_SIZE + 1];
        tmp[0] = reg;
        tmp[1..1 + wbuf.len()].copy_from_slice(wbuf);
        bus.write(&tmp[..1 + wbuf.len()]).map_err(Error::Bus)?;
        trace!("write {:#x} <- {} byte(s)", reg, wbuf.len());

        Ok(())
    }

    pub fn get_register(&mut self, reg: u8) -> Result<u8, Error<B::Error>> {
        let mut data: [u8; 1] = [0];
        self.read_from_register(reg, &mut data)?;

        Ok(data[0])
    }

    pub fn set_register(&mut self, reg: u8, val: u8) -> Result<(), Error<B::Error>> {
        self.write_to_register(reg, &[val])
    }

    pub fn delay(&mut self, ms: u32) {
        self.tim.delay_ms(ms);
    }

    pub(crate) fn on(&mut self) -> Result<(), Error<B::Error>> {
        if let Some(en) = self.en.as_mut() {
            en.assert_enable().map_err(|_| Error::Pin)?;
        }
        Ok(())
    }

    pub(crate) fn off(&mut self) -> Result<(), Error<B::Error>> {
        if let Some(en) = self.en.as_mut() {
            en.release().map_err(|_| Error::Pin)?;
        }
        Ok(())
    }

    /**
     * Software reset. The start pulse between reset and shutdown is what
     * actually lets the device leave reset.
     */
    pub fn reset(&mut self) -> Result<(), Error<B::Error>> {
        self.set_register(GP2AP03VT00F_SOFTWARE_RESET, GP2AP03VT00F_SOFTWARE_RESET_VALUE)?;
        self.set_register(GP2AP03VT00F_OPERATING_MODE, GP2AP03VT00F_OPERATING_MODE_START_MEASUREMENT)?;
        self.delay(GP2AP03VT00F_RESET_DELAY_MS);
        self.set_register(GP2AP03VT00F_OPERATING_MODE, GP2AP03VT00F_OPERATING_MODE_SHUTDOWN)?;

        Ok(())
    }

    /// Checks that the device answering on the bus is a GP2AP03VT00F.
    pub fn is_alive(&mut self) -> Result<(), Error<B::Error>> {
        let device_id: u8 = self.get_register(GP2AP03VT00F_DEVICE_ID)?;
        if device_id != GP2AP03VT00F_CHIP_ID {
            warn!("unexpected device id {:#x}", device_id);
            return Err(Error::UnexpectedId { got: device_id, expected: GP2AP03VT00F_CHIP_ID });
        }

        Ok(())
    }

    /// Writes the configuration table for the current range mode. No read-back.
    pub fn init(&mut self) -> Result<(), Error<B::Error>> {
        for &(reg, val) in self.config.range_mode.configuration().iter() {
            self.set_register(reg, val)?;
        }

        Ok(())
    }

    /// Binds the handle and brings the sensor up.
    ///
    /// The enable line, if any, is driven high before anything else, even when
    /// no bus is supplied. On an identification mismatch the handle keeps the
    /// bus but no tuning register is written.
    pub fn begin(&mut self, en: Option<EN>, bus: Option<B>) -> Result<(), Error<B::Error>> {
        self.bus = bus;
        self.en = en;
        self.lifecycle = if self.bus.is_some() { Lifecycle::Bound } else { Lifecycle::Unbound };

        self.on()?;

        if self.bus.is_none() {
            warn!("begin called without a bus");
            return Err(Error::NoBus);
        }

        self.reset()?;
        self.set_register(GP2AP03VT00F_RANGE1_STATUS, GP2AP03VT00F_RANGE_STATUS_VALID_DATA)?;

        self.is_alive()?;
        self.init()?;
        self.lifecycle = Lifecycle::Ready;
        debug!("sensor ready");

        Ok(())
    }

    /// Shuts the sensor down and lets go of the enable line. The bus stays bound.
    pub fn end(&mut self) -> Result<(), Error<B::Error>> {
        self.shutdown()?;
        if self.lifecycle == Lifecycle::Ready {
            self.lifecycle = Lifecycle::Bound;
        }

        self.off()
    }

    /// Gives back everything the handle owns.
    pub fn release(self) -> (Option<B>, Option<EN>, T) {
        (self.bus, self.en, self.tim)
    }

    pub fn shutdown(&mut self) -> Result<(), Error<B::Error>> {
        self.set_register(GP2AP03VT00F_OPERATING_MODE, GP2AP03VT00F_OPERATING_MODE_SHUTDOWN)
    }

    /// Clears the completion flag, then starts ranging. Clearing first keeps a
    /// flag left over from the previous cycle from being read as this one.
    pub fn start_measurement(&mut self) -> Result<(), Error<B::Error>> {
        self.clear_measurement_end()?;
        self.set_register(GP2AP03VT00F_OPERATING_MODE, GP2AP03VT00F_OPERATING_MODE_START_MEASUREMENT)
    }

    /// Non-blocking completion poll. Does not clear the flag.
    pub fn check_measurement_end(&mut self) -> Result<bool, Error<B::Error>> {
        let status: u8 = self.get_register(GP2AP03VT00F_MEASUREMENT_STATUS)?;

        Ok(status & GP2AP03VT00F_MEASUREMENT_STATUS_FLAG == GP2AP03VT00F_MEASUREMENT_STATUS_FLAG)
    }

    pub fn clear_measurement_end(&mut self) -> Result<(), Error<B::Error>> {
        self.set_register(GP2AP03VT00F_MEASUREMENT_STATUS, GP2AP03VT00F_MEASUREMENT_STATUS_CLEAR)
    }

    /// Polls for completion, waiting `poll_interval_ms` between polls.
    ///
    /// # Return
    ///
    /// Number of polls it took. Fails with `Error::Timeout` once `max_polls`
    /// is reached; with `max_polls == None` it never gives up.
    pub fn wait_measurement_end(&mut self) -> Result<u32, Error<B::Error>> {
        if self.config.max_polls == Some(0) {
            return Err(Error::Timeout);
        }
        let mut polls: u32 = 0;

        loop {
            polls = polls.saturating_add(1);
            if self.check_measurement_end()? {
                return Ok(polls);
            }
            if let Some(max_polls) = self.config.max_polls {
                if polls >= max_polls {
                    return Err(Error::Timeout);
                }
            }
            self.delay(self.config.poll_interval_ms);
        }
    }

    /* Selects a measurement buffer, then reads it back. Byte 0 is padding. */
    fn read_measurement_data(&mut self, offset: u8) -> Result<u8, Error<B::Error>> {
        let mut data: [u8; 2] = [0; 2];
        self.set_register(GP2AP03VT00F_MEASUREMENT_DATA, offset)?;
        self.read_from_register(GP2AP03VT00F_MEASUREMENT_DATA, &mut data)?;

        Ok(data[1])
    }

    pub fn read_coarse_distance(&mut self) -> Result<u8, Error<B::Error>> {
        self.read_measurement_data(GP2AP03VT00F_MEASUREMENT_DATA_COARSE)
    }

    pub fn read_fine_distance(&mut self) -> Result<u8, Error<B::Error>> {
        self.read_measurement_data(GP2AP03VT00F_MEASUREMENT_DATA_FINE)
    }

    pub fn read_range_status(&mut self) -> Result<u8, Error<B::Error>> {
        self.get_register(GP2AP03VT00F_RANGE1_STATUS)
    }

    /// Runs one full cycle: start, wait for completion, read both distances and the status.
    pub fn measure(&mut self) -> Result<MeasurementSample, Error<B::Error>> {
        self.start_measurement()?;
        self.wait_measurement_end()?;

        let coarse: u8 = self.read_coarse_distance()?;
        let fine: u8 = self.read_fine_distance()?;
        let status: RangeStatus = self.get_range_status()?;

        Ok(MeasurementSample { coarse, fine, status })
    }
}
