use serde::{Deserialize, Serialize};
use solstice_core::core::Bus;

// --- TracingBus: flat 64KB memory with access recording ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusOp {
    Read,
    Write,
    PortIn,
    PortOut,
}

#[derive(Clone, Debug)]
pub struct BusAccess {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct TracingBus {
    pub memory: [u8; 0x10000],
    pub io_in: [u8; 0x100],
    pub accesses: Vec<BusAccess>,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            io_in: [0; 0x100],
            accesses: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_accesses(&mut self) {
        self.accesses.clear();
    }

    /// Addresses written since the last clear, in order.
    pub fn written_addresses(&self) -> Vec<u16> {
        self.accesses
            .iter()
            .filter(|a| a.op == BusOp::Write)
            .map(|a| a.addr)
            .collect()
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.accesses.push(BusAccess {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.accesses.push(BusAccess {
            addr,
            data,
            op: BusOp::Write,
        });
    }

    fn io_read(&mut self, port: u16) -> u8 {
        let data = self.io_in[(port & 0xFF) as usize];
        self.accesses.push(BusAccess {
            addr: port,
            data,
            op: BusOp::PortIn,
        });
        data
    }

    fn io_write(&mut self, port: u16, data: u8) {
        self.accesses.push(BusAccess {
            addr: port,
            data,
            op: BusOp::PortOut,
        });
    }
}

// --- I8080 JSON test vector types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I8080TestCase {
    pub name: String,
    pub initial: I8080CpuState,
    #[serde(rename = "final")]
    pub final_state: I8080CpuState,
    /// Total cycle cost of the single instruction.
    pub cycles: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I8080CpuState {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub ram: Vec<(u16, u8)>,
}
