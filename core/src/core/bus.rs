/// Generic bus interface joining a CPU to memory and port-addressed I/O.
pub trait Bus {
    type Address: Copy + Into<u64>; // u16 for 8-bit machines
    type Data; // u8 or u16

    fn read(&mut self, addr: Self::Address) -> Self::Data;
    fn write(&mut self, addr: Self::Address, data: Self::Data);

    /// Read from the I/O port address space (separate from memory on the
    /// 8080). Default maps to memory read; override for machines that
    /// decode ports.
    fn io_read(&mut self, port: Self::Address) -> Self::Data {
        self.read(port)
    }

    /// Write to the I/O port address space.
    /// Default maps to memory write; override for machines that decode ports.
    fn io_write(&mut self, port: Self::Address, data: Self::Data) {
        self.write(port, data)
    }
}
