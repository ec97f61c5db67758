//! Sol-20 Terminal Computer (Processor Technology, 1976)
//!
//! Hardware: Intel 8080 @ 2.04 MHz, 64×16 character display mapped at
//! 0xCC00, SOLOS monitor ROM at 0xC000, two cassette decks, a parallel
//! keyboard behind a 10-key buffer, eight sense switches, and an
//! optional serial port.
//!
//! The machine owns the memory image and all port-addressed peripherals
//! and exposes them to the CPU through the [`Bus`] trait. The frontend
//! drives it through the [`Machine`] trait: run a frame, poll
//! `take_display_changed`, and redraw from `display` when it fires.

use std::path::Path;

use solstice_core::core::Bus;
use solstice_core::core::machine::{DisplayView, Machine};
use solstice_core::cpu::i8080::I8080;
use solstice_core::cpu::state::I8080State;
use solstice_core::cpu::CpuStateTrait;
use solstice_core::device::cassette::CassetteDeck;
use solstice_core::device::keyboard::KeyboardFifo;
use solstice_core::device::serial::{SerialLink, SDR, SDROT};

use crate::memory::{MemoryImage, ROM_BASE};
use crate::rom::MonitorRom;
use crate::tape::TapeLibrary;

// ---------------------------------------------------------------------------
// Port map
// ---------------------------------------------------------------------------

pub const PORT_SERIAL_STATUS: u8 = 0xF8;
pub const PORT_SERIAL_DATA: u8 = 0xF9;
pub const PORT_STATUS: u8 = 0xFA; // input: status byte; output: tape control
pub const PORT_TAPE_DATA: u8 = 0xFB;
pub const PORT_KEYBOARD_DATA: u8 = 0xFC;
pub const PORT_SCROLL: u8 = 0xFE; // input: scroll status; output: scroll line
pub const PORT_SENSE: u8 = 0xFF;

// Status byte bits (port 0xFA input). KDR follows the monitor's inverted
// convention: set means no key is waiting.
const KDR: u8 = 0x01;  // keyboard data ready (inverted)
const TDR: u8 = 0x40;  // tape data ready
const TTBE: u8 = 0x80; // tape transmitter buffer empty

// Cassette control bits (port 0xFA output).
const TT1: u8 = 0x80; // motor on, deck 1
const TT2: u8 = 0x40; // motor on, deck 2

// Scroll status (port 0xFE input): scrolling always permitted.
const SOK: u8 = 0x01;

// ---------------------------------------------------------------------------
// Display geometry
// ---------------------------------------------------------------------------

pub const TEXT_BASE: u16 = 0xCC00;
pub const TEXT_COLUMNS: u32 = 64;
pub const TEXT_ROWS: u32 = 16;
pub const TEXT_SIZE: usize = (TEXT_COLUMNS * TEXT_ROWS) as usize;

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

/// Memory and peripherals of the Sol-20, addressed by the CPU.
pub struct SolBus {
    pub memory: MemoryImage,
    keyboard: KeyboardFifo,
    deck: CassetteDeck,
    tapes: TapeLibrary,
    serial: Option<Box<dyn SerialLink>>,
    scroll_line: u8,
    sense_switch: u8,
}

impl SolBus {
    /// Wire up memory and peripherals; both cassette reels load from the
    /// tape library.
    pub fn new(memory: MemoryImage, tapes: TapeLibrary, sense_switch: u8) -> Self {
        let mut deck = CassetteDeck::new();
        deck.load_reel(0, tapes.load_reel(0));
        deck.load_reel(1, tapes.load_reel(1));
        Self {
            memory,
            keyboard: KeyboardFifo::new(),
            deck,
            tapes,
            serial: None,
            scroll_line: 0,
            sense_switch,
        }
    }

    pub fn queue_key(&mut self, code: u8) {
        self.keyboard.push(code);
    }

    pub fn scroll_line(&self) -> u8 {
        self.scroll_line
    }

    pub fn set_serial(&mut self, link: Box<dyn SerialLink>) {
        self.serial = Some(link);
    }

    pub fn deck(&self) -> &CassetteDeck {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut CassetteDeck {
        &mut self.deck
    }

    fn status_byte(&self) -> u8 {
        let mut status = 0;
        if self.keyboard.is_empty() {
            status |= KDR;
        }
        if self.deck.data_ready() {
            status |= TDR | TTBE;
        }
        status
    }

    /// Motor-off transition: a non-empty recording is persisted through
    /// the tape library and the reel reloaded so the guest can read its
    /// own save back.
    fn stop_tape(&mut self) {
        if let Some(recording) = self.deck.stop() {
            let deck = self.deck.selected();
            match self.tapes.save_recording(deck, &recording) {
                Ok(Some(reel)) => self.deck.load_reel(deck, reel),
                Ok(None) => {}
                // The guest cannot be told, and silently losing the
                // recording is worse than stopping.
                Err(e) => panic!("failed to save tape recording: {e}"),
            }
        }
    }
}

impl Bus for SolBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        self.memory.read_byte(addr)
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory.write_byte(addr, data);
    }

    fn io_read(&mut self, port: u16) -> u8 {
        match port as u8 {
            PORT_SENSE => self.sense_switch,
            PORT_SCROLL => SOK,
            PORT_KEYBOARD_DATA => self.keyboard.pop().unwrap_or(0),
            PORT_STATUS => self.status_byte(),
            PORT_TAPE_DATA => self.deck.read(),
            PORT_SERIAL_STATUS => match &self.serial {
                Some(link) => SDROT | if link.input_ready() { SDR } else { 0 },
                None => 0,
            },
            PORT_SERIAL_DATA => self
                .serial
                .as_mut()
                .and_then(|link| link.try_read())
                .unwrap_or(0),
            _ => 0,
        }
    }

    fn io_write(&mut self, port: u16, data: u8) {
        match port as u8 {
            PORT_SCROLL => self.scroll_line = data & 0x0F,
            PORT_STATUS => match data {
                TT1 => self.deck.start(0),
                TT2 => self.deck.start(1),
                _ => self.stop_tape(),
            },
            PORT_TAPE_DATA => self.deck.record(data),
            PORT_SERIAL_DATA => {
                if let Some(link) = self.serial.as_mut() {
                    link.write(data);
                }
            }
            // Serial control latch and unmapped ports: discarded.
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

pub struct Sol20System {
    cpu: I8080,
    bus: SolBus,
    shown_scroll_line: u8,
}

impl Sol20System {
    /// Build the machine: monitor ROM at 0xC000, the text screen region
    /// watched for redraws, cassette reels assembled from `tape_dir`, and
    /// the CPU aimed at the monitor's entry point.
    pub fn new(rom: &MonitorRom, tape_dir: impl AsRef<Path>, sense_switch: u8) -> Self {
        let mut memory = MemoryImage::new();
        memory.load(ROM_BASE, rom.bytes());
        memory.watch(TEXT_BASE, TEXT_BASE + TEXT_SIZE as u16 - 1);

        let tapes = TapeLibrary::new(tape_dir.as_ref());
        let bus = SolBus::new(memory, tapes, sense_switch);

        let mut cpu = I8080::new();
        cpu.pc = ROM_BASE;

        Self {
            cpu,
            bus,
            shown_scroll_line: 0,
        }
    }

    /// Attach a serial backend to ports 0xF8/0xF9.
    pub fn with_serial(mut self, link: Box<dyn SerialLink>) -> Self {
        self.bus.set_serial(link);
        self
    }

    /// Execute one instruction; returns its cycle cost. Test and debug
    /// hook — the frontend runs whole frames.
    pub fn step(&mut self) -> u32 {
        self.cpu.step(&mut self.bus)
    }

    pub fn cpu(&self) -> &I8080 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut I8080 {
        &mut self.cpu
    }

    pub fn bus(&self) -> &SolBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut SolBus {
        &mut self.bus
    }

    pub fn cpu_state(&self) -> I8080State {
        self.cpu.snapshot()
    }

    /// Rewind the selected cassette deck (the keyboard's MODE key).
    pub fn rewind_tape(&mut self) {
        self.bus.deck_mut().rewind();
    }
}

impl Machine for Sol20System {
    fn display_size(&self) -> (u32, u32) {
        (TEXT_COLUMNS, TEXT_ROWS)
    }

    fn run_frame(&mut self) {
        self.cpu.run_frame(&mut self.bus);
    }

    fn display(&self) -> DisplayView<'_> {
        let base = TEXT_BASE as usize;
        DisplayView {
            cells: &self.bus.memory.bytes()[base..base + TEXT_SIZE],
            scroll_line: self.bus.scroll_line,
        }
    }

    fn take_display_changed(&mut self) -> bool {
        let written = self.bus.memory.take_changed();
        let scrolled = self.bus.scroll_line != self.shown_scroll_line;
        self.shown_scroll_line = self.bus.scroll_line;
        written || scrolled
    }

    fn queue_key(&mut self, code: u8) {
        self.bus.queue_key(code);
    }

    fn reset(&mut self) {
        self.cpu.reset();
        // The monitor lives at 0xC000; execution resumes there.
        self.cpu.pc = ROM_BASE;
    }

    fn is_halted(&self) -> bool {
        self.cpu.halted
    }
}
