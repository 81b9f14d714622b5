//! The pipeline against the sequential reference.

use ysim_core::common::Status;
use ysim_core::config::{CacheConfig, RunConfig};
use ysim_core::core::Memory;
use ysim_core::sim::{Oracle, Simulator};

const SUM_LOOP: &str = "\
0x000: 30f40008000000000000 | irmovq $0x800, %rsp
0x00a: 30f00000000000000000 | irmovq $0, %rax (sum)
0x014: 30f20500000000000000 | irmovq $5, %rdx (counter)
0x01e: 30f30100000000000000 | irmovq $1, %rbx (decrement)
0x028: 6020                 | addq %rdx, %rax
0x02a: 6132                 | subq %rbx, %rdx
0x02c: 742800000000000000   | jne 0x28
0x035: 00                   | halt
";

const CALL_TREE: &str = "\
0x000: 30f40008000000000000 | irmovq $0x800, %rsp
0x00a: 804000000000000000   | call 0x40
0x013: 00                   | halt
0x040: 30f00700000000000000 | irmovq $7, %rax
0x04a: a00f                 | pushq %rax
0x04c: 806000000000000000   | call 0x60
0x055: b03f                 | popq %rbx
0x057: 90                   | ret
0x060: 30f10300000000000000 | irmovq $3, %rcx
0x06a: 90                   | ret
";

const MEM_SHUFFLE: &str = "\
0x000: 30f30002000000000000 | irmovq $0x200, %rbx
0x00a: 30f01100000000000000 | irmovq $0x11, %rax
0x014: 40030000000000000000 | rmmovq %rax, 0(%rbx)
0x01e: 40030800000000000000 | rmmovq %rax, 8(%rbx)
0x028: 50130800000000000000 | mrmovq 8(%rbx), %rcx
0x032: 6010                 | addq %rcx, %rax
0x034: 40031000000000000000 | rmmovq %rax, 16(%rbx)
0x03e: 00                   | halt
";

fn check(yo: &str) {
    let run_config = RunConfig {
        check: true,
        ..RunConfig::default()
    };
    let mut sim = match Simulator::load(run_config, &CacheConfig::default(), yo.as_bytes()) {
        Ok(s) => s,
        Err(e) => panic!("load: {e}"),
    };
    let report = sim.run();
    assert_eq!(report.status, Status::Halt, "program did not halt cleanly");
    let check = match report.check {
        Some(c) => c,
        None => panic!("check requested but not produced"),
    };
    assert!(
        check.matched,
        "reference mismatch: regs {:?}, mem {:?}, cc matched: {}",
        check.reg_mismatches, check.mem_mismatches, check.cc_matched
    );
}

#[test]
fn loop_with_backward_branch_matches_the_reference() {
    check(SUM_LOOP);
}

#[test]
fn nested_calls_match_the_reference() {
    check(CALL_TREE);
}

#[test]
fn memory_traffic_matches_the_reference() {
    check(MEM_SHUFFLE);
}

#[test]
fn cache_timing_does_not_change_architectural_state() {
    // Same program, wildly different miss penalties: identical final
    // registers and memory, different cycle counts.
    let run = |penalty| {
        let run_config = RunConfig::default();
        let cache = CacheConfig {
            miss_penalty: penalty,
            associativity: 1,
            set_bits: 0,
            block_bits: 3,
        };
        let mut sim = match Simulator::load(run_config, &cache, MEM_SHUFFLE.as_bytes()) {
            Ok(s) => s,
            Err(e) => panic!("load: {e}"),
        };
        sim.run()
    };
    let fast = run(0);
    let slow = run(25);
    assert_eq!(fast.status, Status::Halt);
    assert_eq!(slow.status, Status::Halt);
    assert_eq!(fast.reg_changes, slow.reg_changes);
    assert_eq!(fast.mem_changes, slow.mem_changes);
    assert!(slow.stats.cycles > fast.stats.cycles);
    assert_eq!(fast.stats.instructions, slow.stats.instructions);
}

#[test]
fn report_serializes_to_json() {
    let run_config = RunConfig {
        check: true,
        ..RunConfig::default()
    };
    let mut sim = match Simulator::load(run_config, &CacheConfig::default(), SUM_LOOP.as_bytes())
    {
        Ok(s) => s,
        Err(e) => panic!("load: {e}"),
    };
    let report = sim.run();
    let json = match serde_json::to_value(&report) {
        Ok(v) => v,
        Err(e) => panic!("serialize: {e}"),
    };
    assert_eq!(json["status"], "Halt");
    assert!(json["stats"]["cycles"].as_u64().is_some());
    assert_eq!(json["check"]["matched"], true);
}

#[test]
fn oracle_alone_computes_the_loop_sum() {
    let mut mem = Memory::new(0x1000);
    match ysim_core::sim::load_object(&mut mem, SUM_LOOP.as_bytes()) {
        Ok(_) => {}
        Err(e) => panic!("load: {e}"),
    }
    let mut oracle = Oracle::new(mem);
    assert_eq!(oracle.run(1_000), Status::Halt);
    // 5 + 4 + 3 + 2 + 1
    assert_eq!(
        oracle.regs.read(Some(ysim_core::common::Register::Rax)),
        15
    );
}
