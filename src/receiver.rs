use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::{
    consts::DATA_BITS,
    context::{BaudClock, SerialIn},
    signal::Reg,
    util::trait_alias,
    Error,
};

trait_alias!(pub trait Context = BaudClock + SerialIn);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RxState {
    Idle,
    // bit 0..8: data, 8: stop bit check
    Receiving { shift: u8, bit: u8 },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Receiver {
    state: Reg<RxState>,
    data_out: Reg<u8>,
    valid: Reg<bool>,
    framing_errors: Reg<u64>,
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Receiver {
    pub fn new() -> Self {
        Self {
            state: Reg::new(RxState::Idle),
            data_out: Reg::new(0),
            valid: Reg::new(false),
            framing_errors: Reg::new(0),
        }
    }

    pub fn state(&self) -> RxState {
        self.state.get()
    }

    pub fn active(&self) -> bool {
        matches!(self.state.get(), RxState::Receiving { .. })
    }

    pub fn data_out(&self) -> u8 {
        self.data_out.get()
    }

    /// High for exactly the one edge after a good stop bit was sampled.
    pub fn valid(&self) -> bool {
        self.valid.get()
    }

    pub fn framing_errors(&self) -> u64 {
        self.framing_errors.get()
    }

    pub fn tick(&mut self, ctx: &impl Context) {
        self.valid.set(false);

        match self.state.get() {
            RxState::Idle => {
                if !ctx.rx() {
                    trace!("RX start bit detected");
                    self.state.set(RxState::Receiving { shift: 0, bit: 0 });
                }
            }
            RxState::Receiving { shift, bit } => {
                if !ctx.baud_enable() {
                    return;
                }

                let rx = ctx.rx();
                if bit < DATA_BITS {
                    trace!("RX bit {bit}: {}", rx as u8);
                    self.state.set(RxState::Receiving {
                        shift: (shift >> 1) | (rx as u8) << 7,
                        bit: bit + 1,
                    });
                    return;
                }

                if rx {
                    debug!("RX done: 0x{shift:02X}");
                    self.data_out.set(shift);
                    self.valid.set(true);
                } else {
                    warn!("Framing error, discarding 0x{shift:02X}");
                    self.framing_errors.set(self.framing_errors.get() + 1);
                }
                self.state.set(RxState::Idle);
            }
        }
    }

    pub fn commit(&mut self) {
        self.state.commit();
        self.data_out.commit();
        self.valid.commit();
        self.framing_errors.commit();
    }

    /// Checks a receiver restored from a save state.
    pub fn validate(&self) -> Result<(), Error> {
        let ok = self.state.all(|state| match state {
            RxState::Idle => true,
            RxState::Receiving { bit, .. } => bit <= DATA_BITS,
        });
        if !ok {
            return Err(Error::OutOfRange("receiver state"));
        }
        Ok(())
    }
}
