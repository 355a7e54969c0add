use serde::{Deserialize, Serialize};

/// A clocked register.
///
/// Reads during an edge always see the committed value; writes land in the
/// pending slot and only become visible after `commit`. A register that is
/// not written during an edge keeps its value.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reg<T> {
    cur: T,
    next: T,
}

impl<T: Copy> Reg<T> {
    pub fn new(init: T) -> Self {
        Self {
            cur: init,
            next: init,
        }
    }

    pub fn get(&self) -> T {
        self.cur
    }

    pub fn set(&mut self, value: T) {
        self.next = value;
    }

    pub fn commit(&mut self) {
        self.cur = self.next;
    }

    /// True if both the committed and the pending value satisfy `f`.
    pub fn all(&self, f: impl Fn(T) -> bool) -> bool {
        f(self.cur) && f(self.next)
    }
}
