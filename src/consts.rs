use embedded_hal::i2c::SevenBitAddress;

pub const GP2AP03VT00F_DEFAULT_I2C_ADDRESS: SevenBitAddress = 0x29;

pub const GP2AP03VT00F_CHIP_ID: u8 = 0x2F;

/* Largest payload accepted by a single register write */
pub const GP2AP03VT00F_MAX_WRITE_SIZE: usize = 16;

/* Registers */
pub const GP2AP03VT00F_OPERATING_MODE: u8 = 0x00;
pub const GP2AP03VT00F_MEASUREMENT_STATUS: u8 = 0x01;
pub const GP2AP03VT00F_SOFTWARE_RESET: u8 = 0x02;
/* Same address as the software reset, different meaning on write */
pub const GP2AP03VT00F_INT_TERMINAL: u8 = 0x02;
pub const GP2AP03VT00F_VCSEL_CURRENT: u8 = 0x04;
pub const GP2AP03VT00F_MEASUREMENT_TIME: u8 = 0x2B;
pub const GP2AP03VT00F_RANGE1_STATUS: u8 = 0x2E;
pub const GP2AP03VT00F_MEASUREMENT_DATA: u8 = 0x38;
pub const GP2AP03VT00F_DEVICE_ID: u8 = 0x41;

/* Operating mode */
pub const GP2AP03VT00F_OPERATING_MODE_SHUTDOWN: u8 = 0x00;
pub const GP2AP03VT00F_OPERATING_MODE_START_MEASUREMENT: u8 = 0x80;

/* Measurement status */
pub const GP2AP03VT00F_MEASUREMENT_STATUS_FLAG: u8 = 0x02;
pub const GP2AP03VT00F_MEASUREMENT_STATUS_CLEAR: u8 = 0x0D;

pub const GP2AP03VT00F_SOFTWARE_RESET_VALUE: u8 = 0x01;
pub const GP2AP03VT00F_INT_TERMINAL_VALUE: u8 = 0x34;

/* VCSEL current */
pub const GP2AP03VT00F_VCSEL_CURRENT_SHORT_RANGE: u8 = 0x07;
pub const GP2AP03VT00F_VCSEL_CURRENT_LONG_RANGE: u8 = 0x0F;

pub const GP2AP03VT00F_MEASUREMENT_TIME_NORMAL: u8 = 0x03;

/* Range status flags */
pub const GP2AP03VT00F_RANGE_STATUS_VALID_DATA: u8 = 0x00;
pub const GP2AP03VT00F_RANGE_STATUS_VCSEL_SHORT: u8 = 0x01;
pub const GP2AP03VT00F_RANGE_STATUS_LOW_SIGNAL: u8 = 0x02;
pub const GP2AP03VT00F_RANGE_STATUS_LOW_SN: u8 = 0x04;
pub const GP2AP03VT00F_RANGE_STATUS_TOO_MUCH_AMB: u8 = 0x08;
pub const GP2AP03VT00F_RANGE_STATUS_WAF: u8 = 0x10;
pub const GP2AP03VT00F_RANGE_STATUS_CAL_ERROR: u8 = 0x20;
pub const GP2AP03VT00F_RANGE_STATUS_CROSSTALK_ERROR: u8 = 0x80;

/* Range-dependent tuning values */
pub const GP2AP03VT00F_REG_06H_BASE_VALUE: u8 = 0x60;
pub const GP2AP03VT00F_REG_14H_SHORT_RANGE: u8 = 0x28;
pub const GP2AP03VT00F_REG_14H_LONG_RANGE: u8 = 0x14;
pub const GP2AP03VT00F_REG_43H_SHORT_RANGE: u8 = 0xC0;
pub const GP2AP03VT00F_REG_43H_LONG_RANGE: u8 = 0xD0;
pub const GP2AP03VT00F_REG_47H_SHORT_RANGE: u8 = 0x20;
pub const GP2AP03VT00F_REG_47H_LONG_RANGE: u8 = 0x00;

/* Measurement buffer offsets, selected through GP2AP03VT00F_MEASUREMENT_DATA */
pub const GP2AP03VT00F_MEASUREMENT_DATA_COARSE: u8 = 100;
pub const GP2AP03VT00F_MEASUREMENT_DATA_FINE: u8 = 110;

/* Reset pulse width in ms */
pub const GP2AP03VT00F_RESET_DELAY_MS: u32 = 2;

pub const GP2AP03VT00F_CONFIGURATION_SIZE: usize = 27;

/// Register writes issued after a successful identification, in order.
pub const GP2AP03VT00F_LONG_RANGE_CONFIGURATION: [(u8, u8); GP2AP03VT00F_CONFIGURATION_SIZE] =
    configuration(
        GP2AP03VT00F_VCSEL_CURRENT_LONG_RANGE,
        GP2AP03VT00F_REG_14H_LONG_RANGE,
        GP2AP03VT00F_REG_43H_LONG_RANGE,
        GP2AP03VT00F_REG_47H_LONG_RANGE,
    );

pub const GP2AP03VT00F_SHORT_RANGE_CONFIGURATION: [(u8, u8); GP2AP03VT00F_CONFIGURATION_SIZE] =
    configuration(
        GP2AP03VT00F_VCSEL_CURRENT_SHORT_RANGE,
        GP2AP03VT00F_REG_14H_SHORT_RANGE,
        GP2AP03VT00F_REG_43H_SHORT_RANGE,
        GP2AP03VT00F_REG_47H_SHORT_RANGE,
    );

const fn configuration(vcsel: u8, reg_14h: u8, reg_43h: u8, reg_47h: u8) -> [(u8, u8); GP2AP03VT00F_CONFIGURATION_SIZE] {
    [
        (GP2AP03VT00F_MEASUREMENT_TIME, GP2AP03VT00F_MEASUREMENT_TIME_NORMAL),
        (GP2AP03VT00F_INT_TERMINAL, GP2AP03VT00F_INT_TERMINAL_VALUE),
        (0x03, 0x00),
        (GP2AP03VT00F_VCSEL_CURRENT, vcsel),
        (0x05, 0x0C),
        (0x06, GP2AP03VT00F_REG_06H_BASE_VALUE | vcsel),
        (0x07, 0xDF),
        (0x0D, 0x82),
        (0x0E, 0x02),
        (0x11, 0xAD),
        (0x12, 0x00),
        (0x13, 0x15),
        (0x14, reg_14h),
        (0x15, 0x01),
        (0x1A, 0xAA),
        (0x1B, 0xAA),
        (0x1C, 0xAA),
        (0x1D, 0xAA),
        (0x1E, 0xF4),
        (0x1F, 0xF7),
        (0x28, 0x84),
        (0x2A, 0x0B),
        (0x43, reg_43h),
        (0x45, 0x04),
        (0x47, reg_47h),
        (0x4D, 0x06),
        (0x4E, 0x3E),
    ]
}
