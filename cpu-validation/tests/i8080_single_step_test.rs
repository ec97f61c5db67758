use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use solstice_core::cpu::i8080::I8080;
use solstice_cpu_validation::{I8080TestCase, TracingBus};

const TEST_DIR: &str = "test_data/i8080/v1";

fn run_test_case(tc: &I8080TestCase) {
    let mut cpu = I8080::new();
    let mut bus = TracingBus::new();

    cpu.pc = tc.initial.pc;
    cpu.sp = tc.initial.sp;
    cpu.a = tc.initial.a;
    cpu.f = tc.initial.f;
    cpu.b = tc.initial.b;
    cpu.c = tc.initial.c;
    cpu.d = tc.initial.d;
    cpu.e = tc.initial.e;
    cpu.h = tc.initial.h;
    cpu.l = tc.initial.l;
    for &(addr, value) in &tc.initial.ram {
        bus.memory[addr as usize] = value;
    }

    let cycles = cpu.step(&mut bus);

    assert_eq!(cpu.pc, tc.final_state.pc, "{}: PC", tc.name);
    assert_eq!(cpu.sp, tc.final_state.sp, "{}: SP", tc.name);
    assert_eq!(cpu.a, tc.final_state.a, "{}: A", tc.name);
    assert_eq!(cpu.f, tc.final_state.f, "{}: F", tc.name);
    assert_eq!(cpu.b, tc.final_state.b, "{}: B", tc.name);
    assert_eq!(cpu.c, tc.final_state.c, "{}: C", tc.name);
    assert_eq!(cpu.d, tc.final_state.d, "{}: D", tc.name);
    assert_eq!(cpu.e, tc.final_state.e, "{}: E", tc.name);
    assert_eq!(cpu.h, tc.final_state.h, "{}: H", tc.name);
    assert_eq!(cpu.l, tc.final_state.l, "{}: L", tc.name);

    for &(addr, expected) in &tc.final_state.ram {
        assert_eq!(
            bus.memory[addr as usize], expected,
            "{}: RAM[0x{:04X}]",
            tc.name, addr
        );
    }

    assert_eq!(cycles, tc.cycles, "{}: cycle cost", tc.name);
}

fn load_cases(path: &Path) -> Vec<I8080TestCase> {
    let raw = fs::read(path).unwrap_or_else(|e| panic!("failed to read {path:?}: {e}"));
    let json = if path.extension().is_some_and(|ext| ext == "gz") {
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut text = String::new();
        decoder
            .read_to_string(&mut text)
            .unwrap_or_else(|e| panic!("failed to decompress {path:?}: {e}"));
        text
    } else {
        String::from_utf8(raw).unwrap_or_else(|e| panic!("{path:?} is not UTF-8: {e}"))
    };
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("failed to parse {path:?}: {e}"))
}

#[test]
fn replay_single_step_corpus() {
    let test_dir = Path::new(TEST_DIR);
    if !test_dir.exists() {
        eprintln!("No single-step corpus at {TEST_DIR}; run gen_i8080_tests to create one.");
        return;
    }

    let mut total_cases = 0;
    let mut total_files = 0;

    let mut entries: Vec<_> = fs::read_dir(test_dir)
        .expect("read corpus directory")
        .map(|entry| entry.expect("directory entry").path())
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            name.ends_with(".json") || name.ends_with(".json.gz")
        })
        .collect();
    entries.sort();

    for path in entries {
        let cases = load_cases(&path);
        assert!(!cases.is_empty(), "corpus file {path:?} is empty");
        for case in &cases {
            run_test_case(case);
        }
        total_cases += cases.len();
        total_files += 1;
    }

    println!("replayed {total_cases} cases from {total_files} files");
}
