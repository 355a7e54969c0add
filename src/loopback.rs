use std::collections::VecDeque;

use ambassador::Delegate;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{consts::*, Config, Error, Input, Pins, Uart};

type Fault = Box<dyn FnMut(&Uart) -> Option<bool>>;

/// The receiver samples on the same enable edges the transmitter shifts on,
/// so it only lines up when the wire delay is a whole number of bit periods.
fn check_latency(latency: u32, divisor: u32) -> Result<(), Error> {
    if latency == 0 {
        return Err(Error::ZeroLatency);
    }
    if latency % divisor != 0 {
        return Err(Error::MisalignedLatency { latency, divisor });
    }
    Ok(())
}

/// A transceiver with its serial output wired back to its own input.
///
/// The wire delays the line by `latency` clock edges: on edge `n` the
/// receiver sees what the transmitter committed on edge `n - latency`.
#[derive(Serialize, Deserialize, Delegate)]
#[delegate(Pins, target = "uart")]
pub struct Loopback {
    uart: Uart,
    latency: u32,
    line: VecDeque<bool>,
    #[serde(with = "serde_bytes")]
    received: Vec<u8>,
    #[serde(skip)]
    fault: Option<Fault>,
}

impl Loopback {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let uart = Uart::from_config(config)?;
        let latency = config.loopback_latency.unwrap_or(config.divisor);
        check_latency(latency, uart.divisor())?;

        Ok(Self {
            uart,
            latency,
            line: std::iter::repeat(LINE_IDLE)
                .take(latency as usize)
                .collect(),
            received: vec![],
            fault: None,
        })
    }

    pub fn uart(&self) -> &Uart {
        &self.uart
    }

    pub fn latency(&self) -> u32 {
        self.latency
    }

    /// Bytes delivered with a `valid` pulse so far.
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Overrides the level driven onto the wire on edges where `fault`
    /// returns `Some`. It sees the transceiver after the edge committed.
    pub fn set_fault(&mut self, fault: impl FnMut(&Uart) -> Option<bool> + 'static) {
        self.fault = Some(Box::new(fault));
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    pub fn tick(&mut self, start: bool, data_in: u8) {
        let rx = self.line.pop_front().unwrap_or(LINE_IDLE);
        self.uart.tick(&Input { start, data_in, rx });

        let forced = self.fault.as_mut().and_then(|fault| fault(&self.uart));
        if let Some(level) = forced {
            trace!("Wire forced to {} at cycle {}", level as u8, self.uart.cycle());
        }
        self.line.push_back(forced.unwrap_or(self.uart.tx()));

        if self.uart.valid() {
            self.received.push(self.uart.data_out());
        }
    }

    /// Pulses `start` for one edge. Returns false without ticking if the
    /// transmitter is busy.
    pub fn send(&mut self, data: u8) -> bool {
        if self.uart.busy() {
            return false;
        }
        self.tick(true, data);
        true
    }

    pub fn wait_idle(&mut self) {
        while self.uart.busy() {
            self.tick(false, 0);
        }
    }

    /// Sends one byte and waits for it to come back.
    ///
    /// Returns `None` if no `valid` pulse arrives within one frame time plus
    /// the wire delay, as happens on a framing error.
    pub fn transfer(&mut self, data: u8) -> Option<u8> {
        self.wait_idle();
        let sent = self.send(data);
        debug_assert!(sent);

        let timeout = (FRAME_BITS as u64 + 1) * self.uart.divisor() as u64
            + self.latency as u64
            + 2;
        for _ in 0..timeout {
            self.tick(false, 0);
            if self.uart.valid() {
                return Some(self.uart.data_out());
            }
        }

        debug!("No valid pulse for 0x{data:02X} within {timeout} cycles");
        None
    }

    pub fn save_state(&self) -> Result<Vec<u8>, Error> {
        Ok(bincode::serialize(self)?)
    }

    pub fn load_state(&mut self, data: &[u8]) -> Result<(), Error> {
        let mut bench: Loopback = bincode::deserialize(data)?;
        bench.uart.validate()?;
        check_latency(bench.latency, bench.uart.divisor())?;
        if bench.line.len() != bench.latency as usize {
            return Err(Error::WireLength {
                latency: bench.latency,
                len: bench.line.len(),
            });
        }

        // Restore unsaved components
        std::mem::swap(&mut self.fault, &mut bench.fault);

        *self = bench;
        Ok(())
    }
}
