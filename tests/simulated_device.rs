//! Scenarios run against a register-file model of the sensor, so ordering
//! between bus traffic, delays and the enable line can be checked on one log.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};

use gp2ap03vt00f::{Config, EnableLine, Error, Gp2ap03vt00f, Gp2ap03vt00fI2C, Lifecycle, MeasurementSample};

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Write(Vec<u8>),
    Read(u8, usize),
    Delay(u32),
    EnableHigh,
    EnableReleased,
}

type Log = Rc<RefCell<Vec<Event>>>;

struct SimDevice {
    log: Log,
    regs: [u8; 256],
    pointer: u8,
    selected_buffer: u8,
    coarse: u8,
    fine: u8,
    measuring: bool,
    polls: u32,
    polls_until_done: u32,
}

impl SimDevice {
    fn new(log: Log, chip_id: u8) -> Self {
        let mut regs = [0u8; 256];
        regs[0x41] = chip_id;
        SimDevice {
            log,
            regs,
            pointer: 0,
            selected_buffer: 0,
            coarse: 0,
            fine: 0,
            measuring: false,
            polls: 0,
            polls_until_done: 1,
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.log.borrow_mut().push(Event::Write(bytes.to_vec()));
        self.pointer = bytes[0];
        for (i, &b) in bytes[1..].iter().enumerate() {
            let reg = self.pointer.wrapping_add(i as u8);
            match (reg, b) {
                (0x00, 0x80) => {
                    self.measuring = true;
                    self.polls = 0;
                }
                (0x00, 0x00) => self.measuring = false,
                /* Writing the clear pattern drops the completion bit, keeps the rest */
                (0x01, 0x0D) => {
                    self.regs[0x01] &= !0x02;
                    continue;
                }
                (0x38, offset) => self.selected_buffer = offset,
                _ => {}
            }
            self.regs[reg as usize] = b;
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8]) {
        self.log.borrow_mut().push(Event::Read(self.pointer, buf.len()));
        match self.pointer {
            0x01 => {
                if self.measuring {
                    self.polls += 1;
                    if self.polls >= self.polls_until_done {
                        self.regs[0x01] |= 0x02;
                    }
                }
                /* Unrelated status bits stay set to exercise the masked compare */
                buf[0] = self.regs[0x01] | 0x01;
            }
            0x38 => {
                buf[0] = 0xA5;
                buf[1] = match self.selected_buffer {
                    100 => self.coarse,
                    110 => self.fine,
                    _ => 0,
                };
            }
            start => {
                for (i, b) in buf.iter_mut().enumerate() {
                    *b = self.regs[start.wrapping_add(i as u8) as usize];
                }
            }
        }
    }
}

impl ErrorType for SimDevice {
    type Error = ErrorKind;
}

impl I2c for SimDevice {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        assert_eq!(address, 0x29);
        for op in operations {
            match op {
                Operation::Write(bytes) => self.write_bytes(bytes),
                Operation::Read(buf) => self.read_bytes(buf),
            }
        }
        Ok(())
    }
}

struct LogDelay(Log);

impl DelayNs for LogDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(Event::Delay(ms));
    }
}

struct LogEnable(Log);

impl EnableLine for LogEnable {
    type Error = Infallible;

    fn assert_enable(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(Event::EnableHigh);
        Ok(())
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(Event::EnableReleased);
        Ok(())
    }
}

type Sensor = Gp2ap03vt00f<Gp2ap03vt00fI2C<SimDevice>, LogEnable, LogDelay>;

fn bring_up(device: SimDevice, log: &Log) -> Sensor {
    let mut sensor: Sensor = Gp2ap03vt00f::new(LogDelay(log.clone()));
    sensor.begin_i2c(Some(LogEnable(log.clone())), device).unwrap();
    sensor
}

#[test]
fn bring_up_order_is_enable_reset_pulse_delay_shutdown() {
    let log: Log = Rc::default();
    let sensor = bring_up(SimDevice::new(log.clone(), 0x2F), &log);

    let events = log.borrow();
    assert_eq!(
        events[..8],
        [
            Event::EnableHigh,
            Event::Write(vec![0x02, 0x01]),
            Event::Write(vec![0x00, 0x80]),
            Event::Delay(2),
            Event::Write(vec![0x00, 0x00]),
            Event::Write(vec![0x2E, 0x00]),
            Event::Write(vec![0x41]),
            Event::Read(0x41, 1),
        ]
    );
    /* 8 bring-up events followed by the configuration table */
    assert_eq!(events.len(), 8 + 27);
    assert_eq!(sensor.lifecycle(), Lifecycle::Ready);
}

#[test]
fn measurement_round_trip_completes_on_nth_poll() {
    let log: Log = Rc::default();
    let mut device = SimDevice::new(log.clone(), 0x2F);
    device.polls_until_done = 4;
    device.coarse = 0x37;
    device.fine = 0xC2;
    let mut sensor = bring_up(device, &log);

    sensor.start_measurement().unwrap();
    let polls: Vec<bool> = (0..4).map(|_| sensor.check_measurement_end().unwrap()).collect();
    assert_eq!(polls, vec![false, false, false, true]);

    assert_eq!(sensor.read_coarse_distance().unwrap(), 0x37);
    assert_eq!(sensor.read_fine_distance().unwrap(), 0xC2);
    assert!(sensor.get_range_status().unwrap().is_valid());
}

#[test]
fn stale_completion_flag_is_cleared_by_next_start() {
    let log: Log = Rc::default();
    let mut device = SimDevice::new(log.clone(), 0x2F);
    device.polls_until_done = 2;
    let mut sensor = bring_up(device, &log);

    sensor.start_measurement().unwrap();
    while !sensor.check_measurement_end().unwrap() {}

    sensor.start_measurement().unwrap();
    assert!(!sensor.check_measurement_end().unwrap());
    assert!(sensor.check_measurement_end().unwrap());
}

#[test]
fn measure_runs_a_full_cycle() {
    let log: Log = Rc::default();
    let mut device = SimDevice::new(log.clone(), 0x2F);
    device.polls_until_done = 3;
    device.coarse = 12;
    device.fine = 200;
    let mut sensor = bring_up(device, &log);
    sensor.set_config(Config { max_polls: Some(10), poll_interval_ms: 5, ..Config::default() });
    log.borrow_mut().clear();

    let sample: MeasurementSample = sensor.measure().unwrap();

    assert_eq!(sample.coarse, 12);
    assert_eq!(sample.fine, 200);
    assert!(sample.status.is_valid());

    let events = log.borrow();
    assert_eq!(events[0], Event::Write(vec![0x01, 0x0D]));
    assert_eq!(events[1], Event::Write(vec![0x00, 0x80]));
    let delays = events.iter().filter(|e| **e == Event::Delay(5)).count();
    assert_eq!(delays, 2);
}

#[test]
fn measure_gives_up_when_device_never_completes() {
    let log: Log = Rc::default();
    let mut device = SimDevice::new(log.clone(), 0x2F);
    device.polls_until_done = u32::MAX;
    let mut sensor = bring_up(device, &log);
    sensor.set_config(Config { max_polls: Some(5), ..Config::default() });

    assert_eq!(sensor.measure(), Err(Error::Timeout));
}

#[test]
fn end_shuts_down_releases_enable_and_stops_traffic() {
    let log: Log = Rc::default();
    let mut sensor = bring_up(SimDevice::new(log.clone(), 0x2F), &log);
    log.borrow_mut().clear();

    sensor.end().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![Event::Write(vec![0x00, 0x00]), Event::EnableReleased]
    );
    assert_eq!(sensor.lifecycle(), Lifecycle::Bound);
}

#[test]
fn failed_identification_leaves_enable_driven_and_skips_tuning() {
    let log: Log = Rc::default();
    let mut sensor: Sensor = Gp2ap03vt00f::new(LogDelay(log.clone()));

    let result = sensor.begin_i2c(Some(LogEnable(log.clone())), SimDevice::new(log.clone(), 0x00));

    assert_eq!(result, Err(Error::UnexpectedId { got: 0x00, expected: 0x2F }));
    let events = log.borrow();
    assert_eq!(events.len(), 8);
    assert_eq!(events[0], Event::EnableHigh);
    assert!(!events.contains(&Event::EnableReleased));
}

#[test]
fn handle_can_be_rebound_after_end() {
    let log: Log = Rc::default();
    let mut sensor = bring_up(SimDevice::new(log.clone(), 0x2F), &log);
    sensor.end().unwrap();

    sensor
        .begin_i2c(Some(LogEnable(log.clone())), SimDevice::new(log.clone(), 0x2F))
        .unwrap();
    assert_eq!(sensor.lifecycle(), Lifecycle::Ready);

    let (bus, en, _tim) = sensor.release();
    assert!(bus.is_some());
    assert!(en.is_some());
}
