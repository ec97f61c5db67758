// Serial status port bits.
pub const SDR: u8 = 0x40;   // serial data ready
pub const SDROT: u8 = 0x80; // transmitter buffer empty

/// Non-blocking byte link behind the serial data and status ports.
///
/// Backends (a host TTY, a pty, a loopback for tests) live outside the
/// core; a machine built without one reads the serial ports as absent.
pub trait SerialLink {
    /// True when a received byte is waiting.
    fn input_ready(&self) -> bool;

    /// Fetch the next received byte, if any. Must not block.
    fn try_read(&mut self) -> Option<u8>;

    /// Transmit one byte. Must not block.
    fn write(&mut self, byte: u8);
}
