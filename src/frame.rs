use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{consts::FRAME_BITS, util::pack};

/// One character on the wire, held in a shift register.
///
/// Bit 0 is the start bit, bits 1..=8 carry the data LSB first and bit 9 is
/// the stop bit. Shifting right moves the next wire bit into bit 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame(u16);

impl Frame {
    pub fn new(data: u8) -> Self {
        Frame(pack! { u16;
            0     => false,
            1..=8 => data,
            9     => true,
        })
    }

    pub fn raw(&self) -> u16 {
        self.0
    }

    pub fn lsb(&self) -> bool {
        self.0.view_bits::<Lsb0>()[0]
    }

    pub fn shifted(&self) -> Self {
        Frame(self.0 >> 1)
    }

    pub fn data(&self) -> u8 {
        self.0.view_bits::<Lsb0>()[1..=8].load()
    }

    pub fn is_well_formed(&self) -> bool {
        let bits = self.0.view_bits::<Lsb0>();
        !bits[0] && bits[9]
    }

    /// Wire bits in transmission order.
    pub fn bits(&self) -> impl Iterator<Item = bool> {
        let raw = self.0;
        (0..FRAME_BITS as usize).map(move |i| raw.view_bits::<Lsb0>()[i])
    }
}
