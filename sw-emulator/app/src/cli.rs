// Licensed under the Apache-2.0 license

use clap::{arg, value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tqv_emu_periph::{TinyQvRootBusArgs, TrngArgs, DEFAULT_TRNG_PERIPHERAL, USER_PERIPHERAL_COUNT};
use tqv_trng_drivers::{Phase, SequenceConfig, TrngError};

/// Accepts decimal or `0x`-prefixed hex.
fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{s:?}: {e}"))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    u32::try_from(parse_u64(s)?).map_err(|_| format!("{s:?} does not fit in 32 bits"))
}

pub fn command() -> Command<'static> {
    Command::new("tqv-emu")
        .about("Runs the TinyQV TRNG control sequence against the emulated peripheral")
        .arg(
            Arg::new("entropy-cells")
                .long("entropy-cells")
                .value_name("MASK")
                .help("Entropy cells to select and trigger")
                .takes_value(true)
                .value_parser(parse_u32),
        )
        .arg(
            Arg::new("cell-count")
                .long("cell-count")
                .value_name("COUNT")
                .help("Entropy cells fitted to the core")
                .takes_value(true)
                .value_parser(parse_u32),
        )
        .arg(
            Arg::new("entropy-select-2")
                .long("entropy-select-2")
                .value_name("MASK")
                .help("Value written to ENTROPY_SELECT_2 instead of the complement")
                .takes_value(true)
                .value_parser(parse_u32),
        )
        .arg(
            Arg::new("short-base")
                .long("short-base")
                .help("Select the short ring generator base")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("calibration-cycles")
                .long("calibration-cycles")
                .value_name("CYCLES")
                .help("Calibration timer target")
                .takes_value(true)
                .value_parser(parse_u32),
        )
        .arg(
            Arg::new("reset-hold")
                .long("reset-hold")
                .value_name("CYCLES")
                .help("Cycles RESET is held")
                .takes_value(true)
                .value_parser(parse_u64),
        )
        .arg(
            Arg::new("settle-cycles")
                .long("settle-cycles")
                .value_name("CYCLES")
                .help("Cycles to wait after TRIGGER")
                .takes_value(true)
                .value_parser(parse_u64),
        )
        .arg(
            Arg::new("read-count")
                .long("read-count")
                .value_name("COUNT")
                .help("Random words to read after the first")
                .takes_value(true)
                .value_parser(parse_u32),
        )
        .arg(
            arg!(--seed <SEED> "Seed for the emulated entropy source")
                .required(false)
                .value_parser(parse_u64),
        )
        .arg(
            arg!(--peripheral <SLOT> "User peripheral slot the TRNG is wired to")
                .required(false)
                .value_parser(value_parser!(u32).range(0..i64::from(USER_PERIPHERAL_COUNT))),
        )
        .arg(
            Arg::new("calibration-slowdown")
                .long("calibration-slowdown")
                .value_name("FACTOR")
                .help("Run the emulated calibration timer this many times slower")
                .takes_value(true)
                .value_parser(parse_u64),
        )
        .arg(
            Arg::new("calibration-width")
                .long("calibration-width")
                .value_name("BITS")
                .help("Implemented width of the emulated CALIBRATION_CYCLES register")
                .takes_value(true)
                .value_parser(value_parser!(u32).range(1..=32)),
        )
        .arg(
            arg!(--trace <FILE> "Bus trace file")
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
}

pub fn sequence_config(args: &ArgMatches) -> SequenceConfig {
    let defaults = SequenceConfig::default();
    SequenceConfig {
        entropy_cell_mask: args
            .get_one::<u32>("entropy-cells")
            .copied()
            .unwrap_or(defaults.entropy_cell_mask),
        entropy_cell_count: args
            .get_one::<u32>("cell-count")
            .copied()
            .unwrap_or(defaults.entropy_cell_count),
        entropy_select_2: args.get_one::<u32>("entropy-select-2").copied(),
        select_short_base: args.get_one::<bool>("short-base").copied().unwrap_or(false),
        calibration_cycles: args
            .get_one::<u32>("calibration-cycles")
            .copied()
            .unwrap_or(defaults.calibration_cycles),
        reset_hold_cycles: args
            .get_one::<u64>("reset-hold")
            .copied()
            .unwrap_or(defaults.reset_hold_cycles),
        trigger_settle_cycles: args
            .get_one::<u64>("settle-cycles")
            .copied()
            .unwrap_or(defaults.trigger_settle_cycles),
        read_count: args
            .get_one::<u32>("read-count")
            .copied()
            .unwrap_or(defaults.read_count),
    }
}

pub fn bus_args(args: &ArgMatches, config: &SequenceConfig) -> TinyQvRootBusArgs {
    let defaults = TrngArgs::default();
    TinyQvRootBusArgs {
        peripheral: args
            .get_one::<u32>("peripheral")
            .copied()
            .unwrap_or(DEFAULT_TRNG_PERIPHERAL),
        trng: TrngArgs {
            seed: args.get_one::<u64>("seed").copied(),
            calibration_register_bits: args
                .get_one::<u32>("calibration-width")
                .copied()
                .unwrap_or(defaults.calibration_register_bits),
            calibration_slowdown: args
                .get_one::<u64>("calibration-slowdown")
                .copied()
                .unwrap_or(defaults.calibration_slowdown),
            entropy_cells: config.entropy_cell_count,
            ..defaults
        },
    }
}

/// Process exit status for a failed sequence. clap reports usage errors
/// with 2 and an `Err` from `main` exits with 1, so the TRNG failures start
/// at 3.
pub fn exit_status(err: &TrngError) -> i32 {
    match err {
        TrngError::Verification { .. } => 3,
        TrngError::Timeout {
            phase: Phase::Calibration,
            ..
        } => 4,
        TrngError::Timeout {
            phase: Phase::ReadRequest,
            ..
        } => 5,
    }
}
