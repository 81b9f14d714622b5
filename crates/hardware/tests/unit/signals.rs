//! The per-icode decision tables, spot-checked row by row.

use rstest::rstest;

use ysim_core::common::Register::{self, Rax, Rbx, Rsp};
use ysim_core::core::pipeline::signals::{self, AluASel, AluBSel, MemAddr, MemOp};
use ysim_core::isa::Icode;

#[rstest]
#[case(Icode::Cmov, Some(Rax), Some(Rax))]
#[case(Icode::Rmmovq, Some(Rax), Some(Rax))]
#[case(Icode::Alu, Some(Rax), Some(Rax))]
#[case(Icode::Pushq, Some(Rax), Some(Rax))]
#[case(Icode::Popq, Some(Rax), Some(Rsp))]
#[case(Icode::Ret, Some(Rax), Some(Rsp))]
#[case(Icode::Irmovq, Some(Rax), None)]
#[case(Icode::Mrmovq, Some(Rax), None)]
#[case(Icode::Jmp, Some(Rax), None)]
#[case(Icode::Call, Some(Rax), None)]
#[case(Icode::Halt, Some(Rax), None)]
#[case(Icode::Nop, Some(Rax), None)]
fn src_a_table(
    #[case] icode: Icode,
    #[case] ra: Option<Register>,
    #[case] expected: Option<Register>,
) {
    assert_eq!(signals::src_a(icode, ra), expected);
}

#[rstest]
#[case(Icode::Rmmovq, Some(Rbx), Some(Rbx))]
#[case(Icode::Mrmovq, Some(Rbx), Some(Rbx))]
#[case(Icode::Alu, Some(Rbx), Some(Rbx))]
#[case(Icode::Pushq, Some(Rbx), Some(Rsp))]
#[case(Icode::Popq, Some(Rbx), Some(Rsp))]
#[case(Icode::Call, Some(Rbx), Some(Rsp))]
#[case(Icode::Ret, Some(Rbx), Some(Rsp))]
#[case(Icode::Cmov, Some(Rbx), None)]
#[case(Icode::Irmovq, Some(Rbx), None)]
#[case(Icode::Jmp, Some(Rbx), None)]
fn src_b_table(
    #[case] icode: Icode,
    #[case] rb: Option<Register>,
    #[case] expected: Option<Register>,
) {
    assert_eq!(signals::src_b(icode, rb), expected);
}

#[rstest]
#[case(Icode::Cmov, Some(Rbx), Some(Rbx))]
#[case(Icode::Irmovq, Some(Rbx), Some(Rbx))]
#[case(Icode::Alu, Some(Rbx), Some(Rbx))]
#[case(Icode::Pushq, Some(Rbx), Some(Rsp))]
#[case(Icode::Popq, Some(Rbx), Some(Rsp))]
#[case(Icode::Call, Some(Rbx), Some(Rsp))]
#[case(Icode::Ret, Some(Rbx), Some(Rsp))]
#[case(Icode::Rmmovq, Some(Rbx), None)]
#[case(Icode::Mrmovq, Some(Rbx), None)]
#[case(Icode::Jmp, Some(Rbx), None)]
fn dst_e_table(
    #[case] icode: Icode,
    #[case] rb: Option<Register>,
    #[case] expected: Option<Register>,
) {
    assert_eq!(signals::dst_e(icode, rb), expected);
}

#[rstest]
#[case(Icode::Mrmovq, Some(Rax))]
#[case(Icode::Popq, Some(Rax))]
fn dst_m_is_ra_for_loads(#[case] icode: Icode, #[case] expected: Option<Register>) {
    assert_eq!(signals::dst_m(icode, Some(Rax)), expected);
    assert!(signals::is_load(icode));
}

#[rstest]
#[case(Icode::Cmov)]
#[case(Icode::Irmovq)]
#[case(Icode::Rmmovq)]
#[case(Icode::Alu)]
#[case(Icode::Jmp)]
#[case(Icode::Call)]
#[case(Icode::Ret)]
#[case(Icode::Pushq)]
fn dst_m_absent_elsewhere(#[case] icode: Icode) {
    assert_eq!(signals::dst_m(icode, Some(Rax)), None);
    assert!(!signals::is_load(icode));
}

#[rstest]
#[case(Icode::Cmov, AluASel::ValA, AluBSel::Zero)]
#[case(Icode::Alu, AluASel::ValA, AluBSel::ValB)]
#[case(Icode::Irmovq, AluASel::ValC, AluBSel::Zero)]
#[case(Icode::Rmmovq, AluASel::ValC, AluBSel::ValB)]
#[case(Icode::Mrmovq, AluASel::ValC, AluBSel::ValB)]
#[case(Icode::Popq, AluASel::StackInc, AluBSel::ValB)]
#[case(Icode::Ret, AluASel::StackInc, AluBSel::ValB)]
#[case(Icode::Pushq, AluASel::StackDec, AluBSel::ValB)]
#[case(Icode::Call, AluASel::StackDec, AluBSel::ValB)]
#[case(Icode::Nop, AluASel::Zero, AluBSel::Zero)]
#[case(Icode::Jmp, AluASel::Zero, AluBSel::Zero)]
fn alu_input_selection(#[case] icode: Icode, #[case] a: AluASel, #[case] b: AluBSel) {
    assert_eq!(signals::alu_a(icode), a);
    assert_eq!(signals::alu_b(icode), b);
}

#[rstest]
#[case(Icode::Rmmovq, MemOp::Write(MemAddr::ValE))]
#[case(Icode::Pushq, MemOp::Write(MemAddr::ValE))]
#[case(Icode::Call, MemOp::Write(MemAddr::ValE))]
#[case(Icode::Mrmovq, MemOp::Read(MemAddr::ValE))]
#[case(Icode::Popq, MemOp::Read(MemAddr::ValA))]
#[case(Icode::Ret, MemOp::Read(MemAddr::ValA))]
#[case(Icode::Halt, MemOp::None)]
#[case(Icode::Nop, MemOp::None)]
#[case(Icode::Cmov, MemOp::None)]
#[case(Icode::Irmovq, MemOp::None)]
#[case(Icode::Alu, MemOp::None)]
#[case(Icode::Jmp, MemOp::None)]
fn memory_behavior(#[case] icode: Icode, #[case] expected: MemOp) {
    assert_eq!(signals::mem_op(icode), expected);
}
