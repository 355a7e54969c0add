pub const DATA_BITS: u8 = 8;
// start + data + stop
pub const FRAME_BITS: u8 = DATA_BITS + 2;

pub const DEFAULT_DIVISOR: u32 = 16;

pub const LINE_IDLE: bool = true;
