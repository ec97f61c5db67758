/// Two-deck virtual cassette transport.
///
/// Each deck holds a fully assembled tape image (a "reel"). The CPU
/// selects a deck and turns the motor on through the tape control port,
/// streams bytes in through the data port, or streams a recording out.
/// The transport knows nothing about tape formats or files; the machine
/// hands recordings to the tape library when the motor stops.
pub struct CassetteDeck {
    reels: [Vec<u8>; 2],
    selected: usize,
    head: usize,
    recording: Vec<u8>,
    motor_on: bool,
}

impl CassetteDeck {
    pub fn new() -> Self {
        Self {
            reels: [Vec::new(), Vec::new()],
            selected: 0,
            head: 0,
            recording: Vec::new(),
            motor_on: false,
        }
    }

    /// Mount a reel of tape bytes in deck 0 or 1.
    pub fn load_reel(&mut self, deck: usize, bytes: Vec<u8>) {
        self.reels[deck] = bytes;
        if deck == self.selected {
            self.head = 0;
        }
    }

    /// Select a deck, rewind, clear any half-written recording, and
    /// start the motor.
    pub fn start(&mut self, deck: usize) {
        self.selected = deck;
        self.head = 0;
        self.recording.clear();
        self.motor_on = true;
    }

    /// Stop the motor. If a recording was in progress its bytes are
    /// handed back for saving.
    pub fn stop(&mut self) -> Option<Vec<u8>> {
        let was_recording = self.motor_on && !self.recording.is_empty();
        self.motor_on = false;
        if was_recording {
            Some(std::mem::take(&mut self.recording))
        } else {
            None
        }
    }

    /// Read the byte under the head and advance. Past the end of the
    /// reel the data line floats low.
    pub fn read(&mut self) -> u8 {
        match self.reels[self.selected].get(self.head) {
            Some(&byte) => {
                self.head += 1;
                byte
            }
            None => 0,
        }
    }

    /// Append one byte to the recording in progress.
    pub fn record(&mut self, byte: u8) {
        self.recording.push(byte);
    }

    /// True while the head has bytes left to deliver.
    pub fn data_ready(&self) -> bool {
        self.head < self.reels[self.selected].len()
    }

    /// Rewind the selected deck (the MODE key does this on the real
    /// keyboard).
    pub fn rewind(&mut self) {
        self.head = 0;
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn motor_on(&self) -> bool {
        self.motor_on
    }
}

impl Default for CassetteDeck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_selected_reel_in_order() {
        let mut deck = CassetteDeck::new();
        deck.load_reel(0, vec![0x11, 0x22]);
        deck.load_reel(1, vec![0x33]);
        deck.start(0);
        assert!(deck.data_ready());
        assert_eq!(deck.read(), 0x11);
        assert_eq!(deck.read(), 0x22);
        assert!(!deck.data_ready());

        deck.start(1);
        assert_eq!(deck.read(), 0x33);
    }

    #[test]
    fn read_past_end_returns_zero() {
        let mut deck = CassetteDeck::new();
        deck.load_reel(0, vec![0xAA]);
        deck.start(0);
        assert_eq!(deck.read(), 0xAA);
        assert_eq!(deck.read(), 0x00);
        assert_eq!(deck.read(), 0x00);
    }

    #[test]
    fn start_rewinds_and_clears_recording() {
        let mut deck = CassetteDeck::new();
        deck.load_reel(0, vec![0x01, 0x02]);
        deck.start(0);
        deck.read();
        deck.record(0x55);
        deck.start(0);
        assert_eq!(deck.read(), 0x01, "head should rewind");
        assert_eq!(deck.stop(), None, "recording should have been cleared");
    }

    #[test]
    fn stop_returns_recording_once() {
        let mut deck = CassetteDeck::new();
        deck.start(1);
        deck.record(0x00);
        deck.record(0x01);
        assert_eq!(deck.stop(), Some(vec![0x00, 0x01]));
        assert_eq!(deck.stop(), None);
        assert!(!deck.motor_on());
    }

    #[test]
    fn stop_without_recording_returns_none() {
        let mut deck = CassetteDeck::new();
        deck.start(0);
        assert_eq!(deck.stop(), None);
    }
}
