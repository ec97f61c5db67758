use solstice_core::cpu::i8080::{Flag, I8080};
mod common;
use common::TestBus;

// --- PUSH / POP ---

#[test]
fn test_push_stores_little_endian() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x1000;
    cpu.set_bc(0x1234);
    bus.load(0, &[0xC5]); // PUSH B

    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 11);
    assert_eq!(cpu.sp, 0x0FFE);
    assert_eq!(bus.memory[0x0FFE], 0x34, "low byte at the lower address");
    assert_eq!(bus.memory[0x0FFF], 0x12);
}

#[test]
fn test_push_pop_round_trip_restores_sp() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0xF000;
    cpu.set_de(0xBEEF);
    bus.load(0, &[0xD5, 0xD1]); // PUSH D; POP D

    cpu.step(&mut bus);
    cpu.set_de(0x0000); // clobber between push and pop
    cpu.step(&mut bus);

    assert_eq!(cpu.get_de(), 0xBEEF);
    assert_eq!(cpu.sp, 0xF000);
}

#[test]
fn test_pop_cycles_and_value() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x0FFE;
    bus.memory[0x0FFE] = 0xCD;
    bus.memory[0x0FFF] = 0xAB;
    bus.load(0, &[0xE1]); // POP H

    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 10);
    assert_eq!(cpu.get_hl(), 0xABCD);
    assert_eq!(cpu.sp, 0x1000);
}

#[test]
fn test_sp_wraps_through_zero() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x0001;
    cpu.set_bc(0x5678);
    bus.load(0, &[0xC5]); // PUSH B

    cpu.step(&mut bus);
    assert_eq!(cpu.sp, 0xFFFF);
    assert_eq!(bus.memory[0xFFFF], 0x78);
    assert_eq!(bus.memory[0x0000], 0x56);
}

// --- PSW ---

#[test]
fn test_push_psw_layout() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x2000;
    cpu.a = 0x9A;
    cpu.f = 0x02; // all five flags clear
    bus.load(0, &[0x37, 0xF5]); // STC; PUSH PSW

    cpu.step(&mut bus);
    cpu.step(&mut bus);

    assert_eq!(bus.memory[0x1FFF], 0x9A, "A packs into the high byte");
    // Flag byte: S Z 0 AC 0 P 1 CY — here only CY and the fixed bit 1.
    assert_eq!(bus.memory[0x1FFE], 0b0000_0011);
}

#[test]
fn test_pop_psw_restores_flags() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x1FFE;
    bus.memory[0x1FFE] = 0b1101_0101; // S Z AC P CY all set (+ filler)
    bus.memory[0x1FFF] = 0x5C;
    bus.load(0, &[0xF1]); // POP PSW

    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x5C);
    assert!(cpu.flag(Flag::S));
    assert!(cpu.flag(Flag::Z));
    assert!(cpu.flag(Flag::AC));
    assert!(cpu.flag(Flag::P));
    assert!(cpu.flag(Flag::C));
}

#[test]
fn test_pop_psw_normalizes_filler_bits() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x1FFE;
    bus.memory[0x1FFE] = 0xFF; // garbage in the filler bits
    bus.memory[0x1FFF] = 0x00;
    bus.load(0, &[0xF1, 0xF5]); // POP PSW; PUSH PSW

    cpu.step(&mut bus);
    assert_eq!(cpu.f, 0xD7, "bit 1 forced set, bits 3/5 forced clear");

    cpu.step(&mut bus);
    assert_eq!(bus.memory[0x1FFE], 0xD7);
}

#[test]
fn test_psw_round_trip() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0xF000;
    cpu.a = 0x42;
    cpu.f = 0x02 | Flag::Z as u8 | Flag::C as u8;
    bus.load(0, &[0xF5, 0xAF, 0xF1]); // PUSH PSW; XRA A; POP PSW

    cpu.step(&mut bus);
    cpu.step(&mut bus); // clobbers A and flags
    cpu.step(&mut bus);

    assert_eq!(cpu.a, 0x42);
    assert!(cpu.flag(Flag::Z));
    assert!(cpu.flag(Flag::C));
    assert_eq!(cpu.sp, 0xF000);
}

// --- XTHL ---

#[test]
fn test_xthl_swaps_with_stack_top() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x10AD;
    cpu.set_hl(0x0B3C);
    bus.memory[0x10AD] = 0xF0;
    bus.memory[0x10AE] = 0x0D;
    bus.load(0, &[0xE3]); // XTHL

    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 18);
    assert_eq!(cpu.get_hl(), 0x0DF0);
    assert_eq!(bus.memory[0x10AD], 0x3C);
    assert_eq!(bus.memory[0x10AE], 0x0B);
    assert_eq!(cpu.sp, 0x10AD, "SP does not move");
}
