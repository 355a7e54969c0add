use crate::consts::LINE_IDLE;

pub trait BaudClock {
    fn baud_enable(&self) -> bool;
}

pub trait TxControl {
    fn start(&self) -> bool;
    fn data_in(&self) -> u8;
}

pub trait SerialIn {
    fn rx(&self) -> bool;
}

/// Pre-edge view of every signal a machine may read during one clock edge.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub baud_enable: bool,
    pub start: bool,
    pub data_in: u8,
    pub rx: bool,
}

impl Default for Edge {
    fn default() -> Self {
        Self {
            baud_enable: false,
            start: false,
            data_in: 0,
            rx: LINE_IDLE,
        }
    }
}

impl BaudClock for Edge {
    fn baud_enable(&self) -> bool {
        self.baud_enable
    }
}

impl TxControl for Edge {
    fn start(&self) -> bool {
        self.start
    }

    fn data_in(&self) -> u8 {
        self.data_in
    }
}

impl SerialIn for Edge {
    fn rx(&self) -> bool {
        self.rx
    }
}
