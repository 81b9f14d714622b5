//! `ysim`: run a Y86-64 object file through the pipelined simulator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ysim_core::common::Status;
use ysim_core::config::{CacheConfig, RunConfig};
use ysim_core::sim::{Report, Simulator};

#[derive(Debug, Parser)]
#[command(name = "ysim", version, about = "Cycle-accurate Y86-64 pipeline simulator")]
struct Args {
    /// Object file (.yo) to run.
    object: PathBuf,

    /// Maximum number of instructions to retire.
    #[arg(short = 'l', long = "limit", default_value_t = 10_000)]
    instr_limit: u64,

    /// Maximum number of cycles (default: five per permitted instruction).
    #[arg(long = "cycle-limit")]
    cycle_limit: Option<u64>,

    /// Memory image size in bytes.
    #[arg(long = "mem-size", default_value_t = 1 << 16)]
    mem_size: usize,

    /// Cross-check the final state against the sequential reference.
    #[arg(short = 't', long = "check")]
    check: bool,

    /// Cache set-index bits (2^s sets).
    #[arg(short = 's', long = "set-bits", default_value_t = 3)]
    set_bits: u32,

    /// Cache lines per set.
    #[arg(short = 'E', long = "associativity", default_value_t = 2)]
    associativity: usize,

    /// Cache block-offset bits (2^b-byte blocks).
    #[arg(short = 'b', long = "block-bits", default_value_t = 4)]
    block_bits: u32,

    /// Extra stall cycles charged on a cache miss.
    #[arg(short = 'p', long = "miss-penalty", default_value_t = 10)]
    miss_penalty: u64,

    /// Emit the report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Verbosity: -v for per-cycle events, -vv for full signal traces.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "ysim=debug,warn",
        _ => "ysim=trace,debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn print_report(report: &Report) {
    println!("status: {}", report.status);
    println!("{}", report.stats);
    println!("condition codes: {}", report.cc);

    if report.reg_changes.is_empty() {
        println!("registers: unchanged");
    } else {
        println!("changed registers:");
        for delta in &report.reg_changes {
            println!("  {:<5} {:#018x}", format!("{}", delta.reg), delta.new);
        }
    }
    if !report.mem_changes.is_empty() {
        println!("changed memory:");
        for delta in &report.mem_changes {
            println!("  {:#06x}: {:#018x}", delta.addr, delta.new);
        }
    }

    if let Some(check) = &report.check {
        if check.matched {
            println!("ISA check succeeds");
        } else {
            println!("ISA check fails");
            for delta in &check.reg_mismatches {
                println!(
                    "  {:<5} reference {:#x}, pipeline {:#x}",
                    format!("{}", delta.reg),
                    delta.old,
                    delta.new
                );
            }
            for delta in &check.mem_mismatches {
                println!(
                    "  {:#06x}: reference {:#x}, pipeline {:#x}",
                    delta.addr, delta.old, delta.new
                );
            }
            if !check.cc_matched {
                println!("  condition codes disagree");
            }
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let run_config = RunConfig {
        mem_size: args.mem_size,
        instr_limit: args.instr_limit,
        cycle_limit: args.cycle_limit,
        check: args.check,
    };
    let cache_config = CacheConfig {
        set_bits: args.set_bits,
        block_bits: args.block_bits,
        associativity: args.associativity,
        miss_penalty: args.miss_penalty,
    };

    let mut sim = Simulator::load_file(run_config, &cache_config, &args.object)?;
    let report = sim.run();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    let clean = matches!(report.status, Status::Halt | Status::Normal)
        && report.check.as_ref().map_or(true, |c| c.matched);
    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ysim: {err}");
            ExitCode::from(2)
        }
    }
}
