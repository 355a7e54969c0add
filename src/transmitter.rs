use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    consts::{FRAME_BITS, LINE_IDLE},
    context::{BaudClock, TxControl},
    frame::Frame,
    signal::Reg,
    util::trait_alias,
    Error,
};

trait_alias!(pub trait Context = BaudClock + TxControl);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxState {
    Idle,
    Sending { frame: Frame, bit: u8 },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Transmitter {
    state: Reg<TxState>,
    tx: Reg<bool>,
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Transmitter {
    pub fn new() -> Self {
        Self {
            state: Reg::new(TxState::Idle),
            tx: Reg::new(LINE_IDLE),
        }
    }

    pub fn state(&self) -> TxState {
        self.state.get()
    }

    pub fn busy(&self) -> bool {
        matches!(self.state.get(), TxState::Sending { .. })
    }

    pub fn tx(&self) -> bool {
        self.tx.get()
    }

    /// Number of wire bits already driven for the frame in flight.
    pub fn bit_count(&self) -> u8 {
        match self.state.get() {
            TxState::Idle => 0,
            TxState::Sending { bit, .. } => bit,
        }
    }

    pub fn tick(&mut self, ctx: &impl Context) {
        match self.state.get() {
            TxState::Idle => {
                if ctx.start() {
                    let frame = Frame::new(ctx.data_in());
                    debug!("TX start: 0x{:02X}", frame.data());
                    self.state.set(TxState::Sending { frame, bit: 0 });
                }
            }
            TxState::Sending { bit, .. } if bit == FRAME_BITS => {
                debug!("TX done");
                self.state.set(TxState::Idle);
            }
            TxState::Sending { frame, bit } => {
                if ctx.baud_enable() {
                    trace!("TX bit {bit}: {}", frame.lsb() as u8);
                    self.tx.set(frame.lsb());
                    self.state.set(TxState::Sending {
                        frame: frame.shifted(),
                        bit: bit + 1,
                    });
                }
            }
        }
    }

    pub fn commit(&mut self) {
        self.state.commit();
        self.tx.commit();
    }

    /// Checks a transmitter restored from a save state.
    pub fn validate(&self) -> Result<(), Error> {
        let ok = self.state.all(|state| match state {
            TxState::Idle => true,
            TxState::Sending { frame, bit: 0 } => frame.is_well_formed(),
            TxState::Sending { bit, .. } => bit <= FRAME_BITS,
        });
        if !ok {
            return Err(Error::OutOfRange("transmitter state"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Edge;

    fn step(t: &mut Transmitter, edge: Edge) {
        t.tick(&edge);
        t.commit();
    }

    fn start(data_in: u8) -> Edge {
        Edge {
            start: true,
            data_in,
            ..Default::default()
        }
    }

    fn enable() -> Edge {
        Edge {
            baud_enable: true,
            ..Default::default()
        }
    }

    #[test]
    fn idle_line_is_high() {
        let t = Transmitter::new();
        assert!(t.tx());
        assert!(!t.busy());
    }

    #[test]
    fn start_loads_frame_without_driving_line() {
        let mut t = Transmitter::new();
        step(&mut t, start(0x5A));
        assert!(t.busy());
        assert!(t.tx());
        assert_eq!(
            t.state(),
            TxState::Sending {
                frame: Frame::new(0x5A),
                bit: 0
            }
        );
    }

    #[test]
    fn bits_only_move_on_enable() {
        let mut t = Transmitter::new();
        step(&mut t, start(0x01));
        step(&mut t, enable());
        assert!(!t.tx());
        step(&mut t, Edge::default());
        step(&mut t, Edge::default());
        assert!(!t.tx());
        assert_eq!(t.bit_count(), 1);
        step(&mut t, enable());
        assert!(t.tx());
        assert_eq!(t.bit_count(), 2);
    }

    #[test]
    fn emits_full_frame_then_idles() {
        let mut t = Transmitter::new();
        step(&mut t, start(0xA7));
        let mut wire = vec![];
        for _ in 0..FRAME_BITS {
            step(&mut t, enable());
            wire.push(t.tx());
            assert!(t.busy());
        }
        assert_eq!(wire, Frame::new(0xA7).bits().collect::<Vec<_>>());

        // Busy drops on the next edge, enable or not, and nothing is driven.
        step(&mut t, Edge::default());
        assert!(!t.busy());
        assert!(t.tx());
    }

    #[test]
    fn restored_state_is_range_checked() {
        let mut t = Transmitter::new();
        step(&mut t, start(0x33));
        assert!(t.validate().is_ok());

        let sending = |frame, bit| Transmitter {
            state: Reg::new(TxState::Sending { frame, bit }),
            tx: Reg::new(LINE_IDLE),
        };
        assert!(sending(Frame::new(0x33), FRAME_BITS).validate().is_ok());
        assert!(matches!(
            sending(Frame::new(0x33), FRAME_BITS + 1).validate(),
            Err(Error::OutOfRange(_))
        ));
        // A frame that has not started shifting must still carry its framing bits.
        assert!(sending(Frame::default(), 0).validate().is_err());
    }

    #[test]
    fn start_while_busy_is_ignored() {
        let mut t = Transmitter::new();
        step(&mut t, start(0x0F));
        step(&mut t, enable());
        let before = t.state();
        step(&mut t, start(0xF0));
        assert_eq!(t.state(), before);

        let mut wire = vec![t.tx()];
        for _ in 1..FRAME_BITS {
            step(
                &mut t,
                Edge {
                    start: true,
                    data_in: 0xF0,
                    baud_enable: true,
                    ..Default::default()
                },
            );
            wire.push(t.tx());
        }
        assert_eq!(wire, Frame::new(0x0F).bits().collect::<Vec<_>>());
    }
}
