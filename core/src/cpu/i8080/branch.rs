use crate::core::Bus;
use crate::cpu::i8080::{Flag, I8080};

impl I8080 {
    /// Evaluate a condition code (3 bits from opcode bits 5-3).
    /// 0=NZ, 1=Z, 2=NC, 3=C, 4=PO, 5=PE, 6=P, 7=M
    pub(crate) fn eval_condition(&self, cc: u8) -> bool {
        match cc {
            0 => !self.flag(Flag::Z), // NZ
            1 => self.flag(Flag::Z),  // Z
            2 => !self.flag(Flag::C), // NC
            3 => self.flag(Flag::C),  // C
            4 => !self.flag(Flag::P), // PO (parity odd)
            5 => self.flag(Flag::P),  // PE (parity even)
            6 => !self.flag(Flag::S), // P (positive)
            7 => self.flag(Flag::S),  // M (minus)
            _ => unreachable!("eval_condition called with cc {}", cc),
        }
    }

    /// JMP a16 — 10 cycles.
    pub(crate) fn op_jmp<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.pc = self.fetch_word(bus);
        10
    }

    /// Jcc a16 — 10 cycles whether taken or not.
    /// Opcode mask: 11 ccc 010
    pub(crate) fn op_jmp_cc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let cc = (opcode >> 3) & 0x07;
        let addr = self.fetch_word(bus);
        if self.eval_condition(cc) {
            self.pc = addr;
        }
        10
    }

    /// CALL a16 — 17 cycles.
    pub(crate) fn op_call<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        self.push_word(bus, self.pc);
        self.pc = addr;
        17
    }

    /// Ccc a16 — 11 cycles not taken, 17 taken.
    /// Opcode mask: 11 ccc 100
    pub(crate) fn op_call_cc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let cc = (opcode >> 3) & 0x07;
        let addr = self.fetch_word(bus);
        if self.eval_condition(cc) {
            self.push_word(bus, self.pc);
            self.pc = addr;
            17
        } else {
            11
        }
    }

    /// RET — 10 cycles.
    pub(crate) fn op_ret<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.pc = self.pop_word(bus);
        10
    }

    /// Rcc — 5 cycles not taken, 11 taken.
    /// Opcode mask: 11 ccc 000
    pub(crate) fn op_ret_cc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let cc = (opcode >> 3) & 0x07;
        if self.eval_condition(cc) {
            self.pc = self.pop_word(bus);
            11
        } else {
            5
        }
    }

    /// RST n — 11 cycles. Push PC and vector to 8*n.
    /// Opcode mask: 11 nnn 111
    pub(crate) fn op_rst<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let target = (opcode & 0x38) as u16;
        self.push_word(bus, self.pc);
        self.pc = target;
        11
    }

    /// PCHL — 5 cycles. PC ← HL.
    pub(crate) fn op_pchl(&mut self) -> u32 {
        self.pc = self.get_hl();
        5
    }

    /// DI — 4 cycles. The latch drops immediately; the real 8080's
    /// one-instruction delay is not modelled.
    pub(crate) fn op_di(&mut self) -> u32 {
        self.ie = false;
        4
    }

    /// EI — 4 cycles. Takes effect immediately.
    pub(crate) fn op_ei(&mut self) -> u32 {
        self.ie = true;
        4
    }
}
