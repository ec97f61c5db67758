use crate::core::Bus;
use crate::cpu::i8080::I8080;

impl I8080 {
    /// MOV r, r' — 5 cycles (7 when either side is the (HL) operand).
    /// Opcode mask: 01 ddd sss; 0x76 is HLT and never reaches here.
    pub(crate) fn op_mov<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;
        if src == 6 {
            let value = bus.read(self.get_hl());
            self.set_reg8(dst, value);
            7
        } else if dst == 6 {
            bus.write(self.get_hl(), self.get_reg8(src));
            7
        } else {
            let value = self.get_reg8(src);
            self.set_reg8(dst, value);
            5
        }
    }

    /// MVI r, d8 — 7 cycles (10 for MVI M).
    /// Opcode mask: 00 ddd 110
    pub(crate) fn op_mvi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let dst = (opcode >> 3) & 0x07;
        let value = self.fetch_byte(bus);
        if dst == 6 {
            bus.write(self.get_hl(), value);
            10
        } else {
            self.set_reg8(dst, value);
            7
        }
    }

    /// LXI rp, d16 — 10 cycles.
    /// Opcode mask: 00 rp0 001
    pub(crate) fn op_lxi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let value = self.fetch_word(bus);
        self.set_rp(rp, value);
        10
    }

    /// LDA a16 — 13 cycles.
    pub(crate) fn op_lda<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        self.a = bus.read(addr);
        13
    }

    /// STA a16 — 13 cycles.
    pub(crate) fn op_sta<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        bus.write(addr, self.a);
        13
    }

    /// LDAX B / LDAX D — 7 cycles.
    pub(crate) fn op_ldax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let addr = if opcode == 0x0A { self.get_bc() } else { self.get_de() };
        self.a = bus.read(addr);
        7
    }

    /// STAX B / STAX D — 7 cycles.
    pub(crate) fn op_stax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let addr = if opcode == 0x02 { self.get_bc() } else { self.get_de() };
        bus.write(addr, self.a);
        7
    }

    /// LHLD a16 — 16 cycles. L from a16, H from a16+1.
    pub(crate) fn op_lhld<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        self.l = bus.read(addr);
        self.h = bus.read(addr.wrapping_add(1));
        16
    }

    /// SHLD a16 — 16 cycles. L to a16, H to a16+1.
    pub(crate) fn op_shld<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        bus.write(addr, self.l);
        bus.write(addr.wrapping_add(1), self.h);
        16
    }

    /// XCHG — 4 cycles. Swap DE and HL.
    pub(crate) fn op_xchg(&mut self) -> u32 {
        let de = self.get_de();
        self.set_de(self.get_hl());
        self.set_hl(de);
        4
    }

    /// SPHL — 5 cycles. SP ← HL.
    pub(crate) fn op_sphl(&mut self) -> u32 {
        self.sp = self.get_hl();
        5
    }

    /// IN port — 10 cycles. A from the I/O bus.
    pub(crate) fn op_in<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let port = self.fetch_byte(bus);
        self.a = bus.io_read(port as u16);
        10
    }

    /// OUT port — 10 cycles. A to the I/O bus.
    pub(crate) fn op_out<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let port = self.fetch_byte(bus);
        bus.io_write(port as u16, self.a);
        10
    }
}
