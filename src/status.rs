use modular_bitfield::prelude::*;

/// Status register snapshot, readable as a single byte.
#[bitfield(bits = 8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub busy: bool,
    pub valid: bool,
    pub tx: bool,
    pub rx_active: bool,
    pub baud_enable: bool,
    #[skip]
    __: B3,
}

impl Status {
    pub fn to_byte(self) -> u8 {
        self.into_bytes()[0]
    }

    pub fn from_byte(data: u8) -> Self {
        Self::from_bytes([data])
    }
}
