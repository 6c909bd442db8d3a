use crate::{BusOperation, Gp2ap03vt00f, Error, EnableLine, DelayNs, Config, Lifecycle, RangeMode, RangeStatus};


impl<B: BusOperation, EN: EnableLine, T: DelayNs> Gp2ap03vt00f<B, EN, T> {

    /// This function reads the range status register and decodes it.
    ///
    /// # Return
    ///
    /// `status` : Quality flags of the last measurement. `status.is_valid()` is true when no flag is raised.
    pub fn get_range_status(&mut self) -> Result<RangeStatus, Error<B::Error>> {
        let status: u8 = self.read_range_status()?;

        Ok(RangeStatus::from(status))
    }

    /// This function gets the range mode the configuration table is built for.
    pub fn get_range_mode(&self) -> RangeMode {
        self.config.range_mode
    }

    /// This function sets a new range mode. If the sensor is already configured,
    /// the matching configuration table is written right away, otherwise it is
    /// used by the next `begin`.
    ///
    /// # Arguments
    ///
    /// * `range_mode` : `RangeMode::Long` (default) or `RangeMode::Short`.
    pub fn set_range_mode(&mut self, range_mode: RangeMode) -> Result<(), Error<B::Error>> {
        self.config.range_mode = range_mode;
        if self.lifecycle == Lifecycle::Ready {
            self.init()?;
        }

        Ok(())
    }

    pub fn get_config(&self) -> Config {
        self.config
    }

    /// This function replaces the polling policy and range mode. Unlike
    /// `set_range_mode`, nothing is written to the sensor.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_bound(&self) -> bool {
        self.bus.is_some()
    }
}
