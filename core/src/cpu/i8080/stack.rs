use crate::core::Bus;
use crate::cpu::i8080::{FLAGS_FIXED_SET, FLAGS_MASK, I8080};

impl I8080 {
    /// SP ← SP − 2, then store low byte at SP and high at SP+1.
    /// SP wraps modulo 64K; there are no range checks.
    pub(crate) fn push_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        value: u16,
    ) {
        self.sp = self.sp.wrapping_sub(2);
        bus.write(self.sp, value as u8);
        bus.write(self.sp.wrapping_add(1), (value >> 8) as u8);
    }

    /// Load the word at SP (little-endian), then SP ← SP + 2.
    pub(crate) fn pop_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let low = bus.read(self.sp);
        let high = bus.read(self.sp.wrapping_add(1));
        self.sp = self.sp.wrapping_add(2);
        ((high as u16) << 8) | low as u16
    }

    /// PUSH rp — 11 cycles. rp 3 is the PSW: A in the high byte, the flag
    /// byte (S Z 0 AC 0 P 1 CY) in the low byte.
    /// Opcode mask: 11 rp0 101
    pub(crate) fn op_push<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let value = match rp {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => self.get_hl(),
            3 => ((self.a as u16) << 8) | self.f as u16,
            _ => unreachable!("op_push called with rp {}", rp),
        };
        self.push_word(bus, value);
        11
    }

    /// POP rp — 10 cycles. POP PSW restores A and the five flags; the
    /// filler bits of the flag byte come back in their fixed shape.
    /// Opcode mask: 11 rp0 001
    pub(crate) fn op_pop<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let value = self.pop_word(bus);
        match rp {
            0 => self.set_bc(value),
            1 => self.set_de(value),
            2 => self.set_hl(value),
            3 => {
                self.a = (value >> 8) as u8;
                self.f = (value as u8 & FLAGS_MASK) | FLAGS_FIXED_SET;
            }
            _ => unreachable!("op_pop called with rp {}", rp),
        }
        10
    }

    /// XTHL — 18 cycles. Swap HL with the word on top of the stack;
    /// SP does not move.
    pub(crate) fn op_xthl<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let sp = self.sp;
        let low = bus.read(sp);
        let high = bus.read(sp.wrapping_add(1));
        bus.write(sp, self.l);
        bus.write(sp.wrapping_add(1), self.h);
        self.l = low;
        self.h = high;
        18
    }
}
