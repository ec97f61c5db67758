/// Read-only view of a machine's text display, handed to the renderer.
///
/// `cells` is the raw character memory in row-major order, one byte per
/// cell. Bit 7 of a cell marks it inverted (the hardware cursor).
/// `scroll_line` is the zero-based row at which the first displayed row
/// begins; rows wrap past the end of the buffer.
pub struct DisplayView<'a> {
    pub cells: &'a [u8],
    pub scroll_line: u8,
}

/// Machine-agnostic interface for emulated systems.
///
/// The machine implements this trait to give an external frontend a
/// uniform surface: run a frame, poll for display changes, fetch the
/// character memory, and feed key codes in. The frontend is a pure
/// rendering and input engine that does not know about specific hardware
/// (ports, cassette decks, watch flags).
pub trait Machine {
    /// Text display geometry as (columns, rows).
    fn display_size(&self) -> (u32, u32);

    /// Run one frame of emulation (advance the CPU by one frame quantum).
    fn run_frame(&mut self);

    /// Borrow the current display contents for rendering.
    fn display(&self) -> DisplayView<'_>;

    /// True when the display memory or the scroll register changed since
    /// the last call. Clears the underlying change flag.
    fn take_display_changed(&mut self) -> bool;

    /// Queue one scan code from the host key mapper.
    ///
    /// Requires `&mut self`, so a caller on another thread must already
    /// hold exclusive access; that ordering is what keeps the key FIFO
    /// consistent with the CPU's port reads.
    fn queue_key(&mut self, code: u8);

    /// Reset the machine to its power-on state.
    fn reset(&mut self);

    /// True once the CPU has executed HLT; the drive loop should stop.
    fn is_halted(&self) -> bool;
}
