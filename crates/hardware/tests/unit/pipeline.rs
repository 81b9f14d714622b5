//! End-to-end pipeline runs: architectural results, hazards resolved
//! correctly, exceptions, and the control-error guard.

use pretty_assertions::assert_eq;

use ysim_core::common::Register::{Rax, Rbx, Rcx, Rdx, Rsp};
use ysim_core::common::Status;
use ysim_core::core::pipeline::LatchOp;
use ysim_core::core::Machine;
use ysim_core::isa::{AluFn, Cond};
use ysim_core::Pipeline;

use crate::common::{
    call, cmov, free_cache, halt, irmovq, jcc, jmp, mrmovq, opq, popq, pushq, ret, rmmovq,
    rrmovq, Program,
};

#[test]
fn back_to_back_alu_forwarding() {
    // Each addq consumes the previous result with no stalls possible to
    // hide a forwarding bug.
    let (machine, status) = Program::new()
        .emit(irmovq(1, Rax))
        .emit(opq(AluFn::Add, Rax, Rax)) // 2
        .emit(opq(AluFn::Add, Rax, Rax)) // 4
        .emit(opq(AluFn::Add, Rax, Rax)) // 8
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::Halt);
    assert_eq!(machine.regs.read(Some(Rax)), 8);
}

#[test]
fn load_use_still_produces_the_right_value() {
    let (machine, status) = Program::new()
        .emit(irmovq(0x500, Rbx))
        .emit(irmovq(77, Rax))
        .emit(rmmovq(Rax, 0, Rbx))
        .emit(mrmovq(0, Rbx, Rcx))
        .emit(opq(AluFn::Add, Rcx, Rcx)) // immediately uses the load
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::Halt);
    assert_eq!(machine.regs.read(Some(Rcx)), 154);
}

#[test]
fn conditional_moves_respect_fresh_flags() {
    let (machine, status) = Program::new()
        .emit(irmovq(5, Rax))
        .emit(irmovq(9, Rbx))
        .emit(irmovq(111, Rcx))
        .emit(opq(AluFn::Sub, Rax, Rbx)) // rbx = 4, positive
        .emit(cmov(Cond::G, Rcx, Rdx)) // taken
        .emit(cmov(Cond::L, Rcx, Rax)) // not taken
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::Halt);
    assert_eq!(machine.regs.read(Some(Rdx)), 111);
    assert_eq!(machine.regs.read(Some(Rax)), 5);
}

#[test]
fn not_taken_branch_squashes_the_wrong_path() {
    // jne is predicted taken; the xorq zeroes rax so it falls through.
    // The wrong-path instructions must leave no architectural trace.
    let target = 0x60;
    let (machine, status) = Program::new()
        .emit(irmovq(3, Rax))
        .emit(opq(AluFn::Xor, Rax, Rax))
        .emit(jcc(Cond::Ne, target))
        .emit(irmovq(42, Rcx))
        .emit(halt())
        .pad_to(target)
        .emit(irmovq(0xBAD, Rcx))
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::Halt);
    assert_eq!(machine.regs.read(Some(Rcx)), 42);
}

#[test]
fn wrong_path_store_never_reaches_memory() {
    // The squashed path holds an rmmovq; after the misprediction
    // resolves, its target word must be untouched.
    let target = 0x60;
    let (machine, status) = Program::new()
        .emit(irmovq(0x700, Rbx))
        .emit(irmovq(0x55, Rax))
        .emit(opq(AluFn::Xor, Rcx, Rcx))
        .emit(jcc(Cond::Ne, target)) // predicted taken, falls through
        .emit(irmovq(42, Rdx))
        .emit(halt())
        .pad_to(target)
        .emit(rmmovq(Rax, 0, Rbx))
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::Halt);
    assert_eq!(machine.regs.read(Some(Rdx)), 42);
    assert_eq!(machine.mem.read_word(0x700), Some(0));
}

#[test]
fn taken_branch_goes_to_the_target() {
    let target = 0x40;
    let (machine, status) = Program::new()
        .emit(irmovq(3, Rax))
        .emit(opq(AluFn::And, Rax, Rax)) // nonzero
        .emit(jcc(Cond::Ne, target))
        .emit(irmovq(0xBAD, Rcx))
        .emit(halt())
        .pad_to(target)
        .emit(irmovq(7, Rcx))
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::Halt);
    assert_eq!(machine.regs.read(Some(Rcx)), 7);
}

#[test]
fn call_ret_preserves_the_return_path() {
    let func = 0x80;
    let (machine, status) = Program::new()
        .emit(irmovq(0x800, Rsp))
        .emit(call(func))
        .emit(opq(AluFn::Add, Rax, Rbx)) // runs after ret
        .emit(halt())
        .pad_to(func)
        .emit(irmovq(21, Rax))
        .emit(rrmovq(Rax, Rbx))
        .emit(ret())
        .run(&free_cache());
    assert_eq!(status, Status::Halt);
    assert_eq!(machine.regs.read(Some(Rbx)), 42);
    assert_eq!(machine.regs.read(Some(Rsp)), 0x800);
}

#[test]
fn push_pop_round_trip() {
    let (machine, status) = Program::new()
        .emit(irmovq(0x800, Rsp))
        .emit(irmovq(0x1234, Rax))
        .emit(pushq(Rax))
        .emit(popq(Rbx))
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::Halt);
    assert_eq!(machine.regs.read(Some(Rbx)), 0x1234);
    assert_eq!(machine.regs.read(Some(Rsp)), 0x800);
    assert_eq!(machine.mem.read_word(0x7F8), Some(0x1234));
}

#[test]
fn popq_rsp_retires_the_loaded_word() {
    let (machine, status) = Program::new()
        .emit(irmovq(0x800, Rsp))
        .emit(irmovq(0x4242, Rax))
        .emit(pushq(Rax))
        .emit(popq(Rsp))
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::Halt);
    assert_eq!(machine.regs.read(Some(Rsp)), 0x4242);
}

#[test]
fn data_address_fault_stops_the_run() {
    let (machine, status) = Program::new()
        .emit(irmovq(0xFFFF_0000, Rbx))
        .emit(mrmovq(0, Rbx, Rax))
        .emit(irmovq(9, Rcx)) // younger, must not retire
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::InvalidAddress);
    assert_eq!(machine.regs.read(Some(Rcx)), 0);
}

#[test]
fn invalid_opcode_stops_the_run() {
    let mut machine = match Machine::new(0x1000, &free_cache()) {
        Ok(m) => m,
        Err(e) => panic!("machine construction failed: {e}"),
    };
    machine.mem.write_byte(0, 0xF0);
    let mut pipeline = Pipeline::new();
    let status = pipeline.run(&mut machine, 10_000, 50_000);
    assert_eq!(status, Status::InvalidInstruction);
}

#[test]
fn younger_stores_behind_a_fault_never_reach_memory() {
    let (machine, status) = Program::new()
        .emit(irmovq(0x700, Rbx))
        .emit(irmovq(0xFFFF_0000, Rdx))
        .emit(irmovq(0x55, Rax))
        .emit(mrmovq(0, Rdx, Rcx)) // faults in Memory
        .emit(rmmovq(Rax, 0, Rbx)) // one behind; must be squashed
        .emit(halt())
        .run(&free_cache());
    assert_eq!(status, Status::InvalidAddress);
    assert_eq!(machine.mem.read_word(0x700), Some(0));
}

#[test]
fn control_error_is_fatal_without_draining() {
    let mut machine = match Machine::new(0x1000, &free_cache()) {
        Ok(m) => m,
        Err(e) => panic!("machine construction failed: {e}"),
    };
    let mut pipeline = Pipeline::new();
    pipeline.latches.memory.set_op(LatchOp::Error);
    assert_eq!(pipeline.step(&mut machine), Status::ControlError);
    assert_eq!(machine.status, Status::ControlError);
    // No instruction retired and it stays that way.
    assert_eq!(machine.instructions, 0);
    assert_eq!(pipeline.step(&mut machine), Status::ControlError);
}

#[test]
fn runs_are_deterministic() {
    let build = || {
        Program::new()
            .emit(irmovq(0x800, Rsp))
            .emit(irmovq(10, Rax))
            .emit(irmovq(3, Rbx))
            .emit(opq(AluFn::Sub, Rbx, Rax))
            .emit(pushq(Rax))
            .emit(popq(Rcx))
            .emit(halt())
    };
    let (m1, s1) = build().run(&free_cache());
    let (m2, s2) = build().run(&free_cache());
    assert_eq!(s1, s2);
    assert_eq!(m1.cycles, m2.cycles);
    assert_eq!(m1.instructions, m2.instructions);
    assert_eq!(m1.regs, m2.regs);
    assert_eq!(m1.cc, m2.cc);
    assert_eq!(m1.cache.accesses(), m2.cache.accesses());
}

#[test]
fn unconditional_jump_is_never_a_misprediction() {
    let target = 0x40;
    let straight = Program::new()
        .emit(irmovq(1, Rax))
        .emit(irmovq(2, Rbx))
        .emit(halt())
        .run(&free_cache());
    let jumped = Program::new()
        .emit(irmovq(1, Rax))
        .emit(jmp(target))
        .pad_to(target)
        .emit(irmovq(2, Rbx))
        .emit(halt())
        .run(&free_cache());
    // Same retired-instruction count and no squash penalty for the jump.
    assert_eq!(straight.0.instructions + 1, jumped.0.instructions);
    assert_eq!(straight.0.cycles + 1, jumped.0.cycles);
}
