use log::trace;
use serde::{Deserialize, Serialize};

use crate::{signal::Reg, Error};

/// Divides the system clock into a one-edge-wide enable pulse.
///
/// The pulse is high on every `divisor`-th edge, the first time on edge
/// `divisor` after reset.
#[derive(Debug, Serialize, Deserialize)]
pub struct BaudRateGenerator {
    divisor: u32,
    count: Reg<u32>,
}

impl BaudRateGenerator {
    pub fn new(divisor: u32) -> Result<Self, Error> {
        if divisor == 0 {
            return Err(Error::InvalidDivisor(divisor));
        }
        Ok(Self {
            divisor,
            count: Reg::new(0),
        })
    }

    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    /// Enable level for the edge being evaluated, derived from the committed
    /// counter only.
    pub fn enable(&self) -> bool {
        self.count.get() == self.divisor - 1
    }

    /// Consumes one clock edge and returns this edge's enable.
    pub fn tick(&mut self) -> bool {
        let enable = self.enable();
        if enable {
            trace!("baud enable");
            self.count.set(0);
        } else {
            self.count.set(self.count.get() + 1);
        }
        enable
    }

    pub fn commit(&mut self) {
        self.count.commit();
    }

    /// Checks a generator restored from a save state.
    pub fn validate(&self) -> Result<(), Error> {
        let divisor = self.divisor;
        if divisor == 0 {
            return Err(Error::InvalidDivisor(divisor));
        }
        if !self.count.all(|count| count < divisor) {
            return Err(Error::OutOfRange("baud counter"));
        }
        Ok(())
    }
}
