/// A flat 64 KiB byte buffer backing `PEEK`/`POKE`/`WAIT`, owned by the interpreter
/// instance (the reference keeps this as a process-global `static`; there is no
/// reason for two interpreters in one process to share it).
pub struct VirtualMemory {
    bytes: Box<[u8; 65536]>,
}

impl Default for VirtualMemory {
    fn default() -> Self {
        Self {
            bytes: Box::new([0u8; 65536]),
        }
    }
}

impl VirtualMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn reduce(addr: i64) -> usize {
        addr.rem_euclid(65536) as usize
    }

    pub fn peek(&self, addr: i64) -> u8 {
        self.bytes[Self::reduce(addr)]
    }

    pub fn poke(&mut self, addr: i64, value: i64) {
        self.bytes[Self::reduce(addr)] = (value & 0xFF) as u8;
    }

    /// `WAIT addr, mask, invert`: read once, apply invert/mask; since nothing in this
    /// batch interpreter can change a cell asynchronously, a single read is enough to
    /// decide the outcome (see design notes on GET/WAIT).
    pub fn wait_satisfied(&self, addr: i64, mask: i64, invert: i64) -> bool {
        let value = self.peek(addr) as i64;
        ((value ^ invert) & mask) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_wrap_modulo_65536() {
        let mut mem = VirtualMemory::new();
        mem.poke(65536, 7);
        assert_eq!(mem.peek(0), 7);
    }

    #[test]
    fn poke_value_is_truncated_to_a_byte() {
        let mut mem = VirtualMemory::new();
        mem.poke(0, 0x1FF);
        assert_eq!(mem.peek(0), 0xFF);
    }
}
