use solstice_core::core::Bus;

/// Minimal bus for testing: flat 64KB memory plus recorded I/O ports.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    /// Value returned for each input port.
    pub io_in: [u8; 0x100],
    /// Every OUT as (port, value), in order.
    pub io_out: Vec<(u8, u8)>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            io_in: [0; 0x100],
            io_out: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }
}

impl Bus for TestBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn io_read(&mut self, port: u16) -> u8 {
        self.io_in[(port & 0xFF) as usize]
    }

    fn io_write(&mut self, port: u16, data: u8) {
        self.io_out.push(((port & 0xFF) as u8, data));
    }
}
