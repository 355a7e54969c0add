// `ambassador_impl_Pins!` must be in textual scope for `loopback`.
#[macro_use]
mod pins;

mod baud;
mod consts;
mod context;
mod frame;
mod loopback;
mod receiver;
mod signal;
mod status;
mod transmitter;
mod util;

use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use baud::BaudRateGenerator;
pub use consts::{DATA_BITS, DEFAULT_DIVISOR, FRAME_BITS, LINE_IDLE};
pub use context::{BaudClock, Edge, SerialIn, TxControl};
pub use frame::Frame;
pub use loopback::Loopback;
pub use pins::Pins;
pub use receiver::{Receiver, RxState};
pub use status::Status;
pub use transmitter::{Transmitter, TxState};

#[derive(Clone, Debug, JsonSchema, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Clock edges per serial bit
    pub divisor: u32,
    /// Loopback wire delay in clock edges, one bit period if unset
    pub loopback_latency: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_DIVISOR,
            loopback_latency: None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("baud divisor must be at least 1, got {0}")]
    InvalidDivisor(u32),
    #[error("loopback latency must be at least 1 clock edge")]
    ZeroLatency,
    #[error("loopback latency {latency} is not a multiple of the baud divisor {divisor}")]
    MisalignedLatency { latency: u32, divisor: u32 },
    #[error("wire holds {len} levels, expected {latency}")]
    WireLength { latency: u32, len: usize },
    #[error("{0} out of range in loaded state")]
    OutOfRange(&'static str),
    #[error("state serialization failed: {0}")]
    State(#[from] bincode::Error),
}

/// Inputs sampled on one clock edge.
#[derive(Debug, Clone, Copy)]
pub struct Input {
    pub start: bool,
    pub data_in: u8,
    pub rx: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            start: false,
            data_in: 0,
            rx: LINE_IDLE,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Uart {
    baud: BaudRateGenerator,
    transmitter: Transmitter,
    receiver: Receiver,
    baud_enable: bool,
    cycle: u64,
}

impl Uart {
    pub fn new(divisor: u32) -> Result<Self, Error> {
        Ok(Uart {
            baud: BaudRateGenerator::new(divisor)?,
            transmitter: Transmitter::new(),
            receiver: Receiver::new(),
            baud_enable: false,
            cycle: 0,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(config.divisor)
    }

    /// Advances one clock edge.
    ///
    /// Every machine computes its next state from committed state and the
    /// same pre-edge inputs, then all of them commit together.
    pub fn tick(&mut self, input: &Input) {
        let edge = Edge {
            baud_enable: self.baud.tick(),
            start: input.start,
            data_in: input.data_in,
            rx: input.rx,
        };

        self.transmitter.tick(&edge);
        self.receiver.tick(&edge);

        self.baud.commit();
        self.transmitter.commit();
        self.receiver.commit();

        self.baud_enable = edge.baud_enable;
        self.cycle += 1;
    }

    /// Clock edges elapsed since reset.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn divisor(&self) -> u32 {
        self.baud.divisor()
    }

    /// Baud enable seen by the machines on the last edge.
    pub fn baud_enable(&self) -> bool {
        self.baud_enable
    }

    pub fn tx_state(&self) -> TxState {
        self.transmitter.state()
    }

    pub fn rx_state(&self) -> RxState {
        self.receiver.state()
    }

    pub fn tx_bit_count(&self) -> u8 {
        self.transmitter.bit_count()
    }

    pub fn rx_active(&self) -> bool {
        self.receiver.active()
    }

    pub fn framing_errors(&self) -> u64 {
        self.receiver.framing_errors()
    }

    pub fn status(&self) -> Status {
        Status::new()
            .with_busy(self.busy())
            .with_valid(self.valid())
            .with_tx(self.tx())
            .with_rx_active(self.rx_active())
            .with_baud_enable(self.baud_enable)
    }

    pub fn save_state(&self) -> Result<Vec<u8>, Error> {
        Ok(bincode::serialize(self)?)
    }

    fn validate(&self) -> Result<(), Error> {
        self.baud.validate()?;
        self.transmitter.validate()?;
        self.receiver.validate()
    }

    pub fn load_state(&mut self, data: &[u8]) -> Result<(), Error> {
        let uart: Uart = bincode::deserialize(data)?;
        uart.validate()?;
        debug!("Loaded state at cycle {}", uart.cycle);
        *self = uart;
        Ok(())
    }
}

impl Pins for Uart {
    fn busy(&self) -> bool {
        self.transmitter.busy()
    }

    fn tx(&self) -> bool {
        self.transmitter.tx()
    }

    fn data_out(&self) -> u8 {
        self.receiver.data_out()
    }

    fn valid(&self) -> bool {
        self.receiver.valid()
    }
}
