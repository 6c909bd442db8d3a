use consts::*;
use crate::{consts, Gp2ap03vt00f, Error, EnableLine, SevenBitAddress, I2c, DelayNs};

/// Raw byte transport to the sensor. Register addressing is layered on top by
/// the driver, so implementations only move bytes.
pub trait BusOperation {
    type Error;

    fn read(&mut self, rbuf: &mut [u8]) -> Result<(), Self::Error>;
    fn write(&mut self, wbuf: &[u8]) -> Result<(), Self::Error>;
}

pub struct Gp2ap03vt00fI2C<P> {
    i2c: P,
    address: SevenBitAddress,
}

impl<P: I2c> Gp2ap03vt00fI2C<P> {
    pub fn new(i2c: P) -> Self {
        Gp2ap03vt00fI2C { i2c, address: GP2AP03VT00F_DEFAULT_I2C_ADDRESS }
    }

    /// For boards that place the sensor behind an address translator.
    pub fn with_address(i2c: P, address: SevenBitAddress) -> Self {
        Gp2ap03vt00fI2C { i2c, address }
    }

    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    pub fn release(self) -> P {
        self.i2c
    }
}

impl<P: I2c> BusOperation for Gp2ap03vt00fI2C<P> {
    type Error = P::Error;

    #[inline]
    fn read(&mut self, rbuf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.read(self.address, rbuf)?;

        Ok(())
    }

    #[inline]
    fn write(&mut self, wbuf: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.address, wbuf)?;

        Ok(())
    }
}

impl<P, EN, T> Gp2ap03vt00f<Gp2ap03vt00fI2C<P>, EN, T>
    where
    P: I2c,
    EN: EnableLine,
    T: DelayNs
{
    /// Binds the handle to an I2C bus at the default address and runs [`begin`](Self::begin).
    pub fn begin_i2c(&mut self, en: Option<EN>, i2c: P) -> Result<(), Error<P::Error>> {
        self.begin(en, Some(Gp2ap03vt00fI2C::new(i2c)))
    }

    /// Address the bound adapter talks to, if any.
    pub fn i2c_address(&self) -> Option<SevenBitAddress> {
        self.bus.as_ref().map(|bus| bus.address())
    }
}
