//! End-to-end tests: assemble source, load it and run it.

use sap1::{assemble, load_image, save_image, Cpu, Instruction, ProgramImage};
use sap1::word::Addr4;

fn run_source(source: &str) -> (Cpu, String) {
    let image = assemble(source).unwrap();
    let mut cpu = Cpu::with_program(image.words());
    let mut out = Vec::new();
    cpu.run_to(&mut out).unwrap();
    (cpu, String::from_utf8(out).unwrap())
}

#[test]
fn set_then_load_outputs_value() {
    let (cpu, out) = run_source("SET 0xf 0x05\nLDA 0xf\nOUT\nHLT\n");

    assert_eq!(out, "5");
    assert!(cpu.is_halted());
    assert_eq!(cpu.instructions, 3);
    // 2 full instructions plus HLT's four phases
    assert_eq!(cpu.cycles, 16);
}

#[test]
fn add_and_subtract() {
    let source = r#"
        ; 20 + 30 - 8
        LDA 0xd
        ADD 0xe
        SUB 0xf
        OUT
        HLT
        SET 0xd 0x14
        SET 0xe 0x1e
        SET 0xf 0x08
    "#;

    let (_, out) = run_source(source);
    assert_eq!(out, "42");
}

#[test]
fn negative_results_display_with_sign() {
    let (_, out) = run_source("LDA 0xe\nSUB 0xf\nOUT\nHLT\nSET 0xe 0x02\nSET 0xf 0x05\n");
    assert_eq!(out, "-3");

    // -128 has no positive counterpart in 8 bits
    let (_, out) = run_source("LDA 0xf\nOUT\nHLT\nSET 0xf 0x80\n");
    assert_eq!(out, "-128");
}

#[test]
fn overflow_wraps_mod_256() {
    let (_, out) = run_source("LDA 0xf\nADD 0xf\nOUT\nHLT\nSET 0xf 0x7f\n");
    // 127 + 127 = 254 = 11111110
    assert_eq!(out, "-2");
}

#[test]
fn all_lda_zero_never_halts() {
    let source = "LDA 0x0\n".repeat(16);
    let image = assemble(&source).unwrap();
    assert!(image.words().iter().all(|w| w.value() == 0));

    let mut cpu = Cpu::with_program(image.words());
    let mut out = Vec::new();
    let executed = cpu.run_limited(500, &mut out).unwrap();

    assert_eq!(executed, 500);
    assert!(cpu.is_running());
    assert!(out.is_empty());
}

#[test]
fn set_clobbered_by_later_instruction() {
    // SET targets slot 2, which the third instruction later overwrites
    let image = assemble("SET 0x2 0x63\nLDA 0xf\nOUT\nHLT\n").unwrap();
    assert_eq!(image.get(Addr4::new(2)), sap1::cpu::decode::encode(&Instruction::Hlt));

    let mut cpu = Cpu::with_program(image.words());
    let mut out = Vec::new();
    cpu.run_to(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "0");
}

#[test]
fn image_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("program.bin");

    let image = assemble("SET 0xf 0xfd\nLDA 0xf\nOUT\nHLT\n").unwrap();
    save_image(&path, &image).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 16);
    assert_eq!(text.lines().next(), Some("00001111"));
    assert_eq!(text.lines().last(), Some("11111101"));

    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded, image);
}

#[test]
fn short_image_is_zero_padded() {
    let image = ProgramImage::parse("00001111\n11100000\n11110000\n").unwrap();
    let mut cpu = Cpu::with_program(image.words());
    let mut out = Vec::new();
    cpu.run_to(&mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "0");
    assert_eq!(cpu.instructions, 3);
}

#[test]
fn step_then_run_continues_program() {
    let image = assemble("LDA 0xf\nOUT\nADD 0xf\nOUT\nHLT\nSET 0xf 0x03\n").unwrap();
    let mut cpu = Cpu::with_program(image.words());

    assert_eq!(cpu.step().unwrap(), Instruction::Lda(Addr4::new(15)));
    assert_eq!(cpu.regs.a.value(), 3);

    let mut out = Vec::new();
    cpu.run_to(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "36");
}
