#![no_std]
#![no_main]

use gp2ap03vt00f::{
    EnableLine,
    Gp2ap03vt00f,
    Gp2ap03vt00fI2C,
    RangeStatus
};

use panic_halt as _;
use cortex_m_rt::entry;
use cortex_m_semihosting::hprintln;

use core::{fmt::Write, cell::RefCell};

use stm32f4xx_hal::{
    gpio::{
        Alternate,
        DynamicPin,
        Pin,
        gpioa,
        gpiob},
    pac::{USART2, Peripherals, TIM1},
    prelude::*,
    serial::{Config, Tx},
    timer::Delay,
    rcc::{Rcc, Clocks}
};

// I2C related imports
use stm32f4xx_hal::{
    pac::I2C1,
    i2c::{I2c as StmI2c, I2c1, Mode}};
use embedded_hal_bus::i2c::RefCellDevice;

/* PB0 drives the sensor enable pin and is floated again on teardown */
struct EnablePin(DynamicPin<'B', 0>);

impl EnableLine for EnablePin {
    type Error = ();

    fn assert_enable(&mut self) -> Result<(), Self::Error> {
        self.0.make_push_pull_output();
        self.0.set_high().map_err(|_| ())
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.0.make_floating_input();
        Ok(())
    }
}

fn write_sample(tx: &mut Tx<USART2>, count: u32, coarse: u8, fine: u8, status: RangeStatus) {
    write!(tx, "#{:<6} coarse {:>3}  fine {:>3}  ", count, coarse, fine).unwrap();
    if status.is_valid() {
        writeln!(tx, "valid").unwrap();
        return;
    }
    write!(tx, "status {:#04x}", status.bits()).unwrap();
    if status.vcsel_short() { write!(tx, " vcsel-short").unwrap(); }
    if status.low_signal() { write!(tx, " low-signal").unwrap(); }
    if status.low_sn() { write!(tx, " low-s/n").unwrap(); }
    if status.too_much_ambient() { write!(tx, " ambient").unwrap(); }
    if status.wide_angle_fault() { write!(tx, " waf").unwrap(); }
    if status.calibration_error() { write!(tx, " cal").unwrap(); }
    if status.crosstalk_error() { write!(tx, " crosstalk").unwrap(); }
    writeln!(tx, "").unwrap();
}

#[entry]
fn main() -> ! {
    let dp: Peripherals = Peripherals::take().unwrap();
    let rcc: Rcc = dp.RCC.constrain();
    let clocks: Clocks = rcc.cfgr.use_hse(8.MHz()).sysclk(48.MHz()).freeze();
    let tim_top: Delay<TIM1, 1000> = dp.TIM1.delay_ms(&clocks);

    let gpioa: gpioa::Parts = dp.GPIOA.split();
    let gpiob: gpiob::Parts = dp.GPIOB.split();

    let en_pin = EnablePin(gpiob.pb0.into_dynamic());
    let tx_pin: Pin<'A', 2, Alternate<7>> = gpioa.pa2.into_alternate();

    let mut tx: Tx<USART2> = dp.USART2.tx(
        tx_pin,
        Config::default()
        .baudrate(460800.bps())
        .wordlength_8()
        .parity_none(),
        &clocks).unwrap();

    let scl: Pin<'B', 8> = gpiob.pb8;
    let sda: Pin<'B', 9> = gpiob.pb9;

    let i2c: StmI2c<I2C1> = I2c1::new(
        dp.I2C1,
        (scl, sda),
        Mode::Standard{frequency:400.kHz()},
        &clocks);

    let i2c_bus: RefCell<StmI2c<I2C1>> = RefCell::new(i2c);
    let i2c = RefCellDevice::new(&i2c_bus);

    let mut sensor_top: Gp2ap03vt00f<Gp2ap03vt00fI2C<_>, EnablePin, _> = Gp2ap03vt00f::new(tim_top);

    if let Err(e) = sensor_top.begin_i2c(Some(en_pin), i2c) {
        hprintln!("GP2AP03VT00F init failed: {:?}", e);
        loop {}
    }

    writeln!(tx, "\x1B[2J").unwrap();
    writeln!(tx, "GP2AP03VT00F Simple Ranging demo application\n").unwrap();

    let mut count: u32 = 0;
    loop {
        sensor_top.start_measurement().unwrap();
        while !sensor_top.check_measurement_end().unwrap() {} // Wait for the measurement to end
        let coarse: u8 = sensor_top.read_coarse_distance().unwrap();
        let fine: u8 = sensor_top.read_fine_distance().unwrap();
        let status: RangeStatus = sensor_top.get_range_status().unwrap();
        write_sample(&mut tx, count, coarse, fine, status);
        count = count.wrapping_add(1);
    }
}
