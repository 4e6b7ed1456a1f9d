/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    File contains main entrypoint for the TinyQV TRNG emulator.

--*/

use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

use tqv_hw_model::{HwModel, InitParams};
use tqv_trng_drivers::{ErrorCode, Trng};

mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::command().get_matches();
    let config = cli::sequence_config(&args);

    let mut params = InitParams {
        bus_args: cli::bus_args(&args, &config),
        ..Default::default()
    };
    if let Some(path) = args.get_one::<PathBuf>("trace") {
        params.log_writer = Box::new(File::create(path)?);
        params.trace_bus = true;
        params.capture_output = false;
    }

    let mut model = tqv_hw_model::new(params)?;
    let mut trng = Trng::new(model.trng_port());

    match trng.run_sequence(&config) {
        Ok(words) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for word in words {
                writeln!(out, "0x{word:08x}")?;
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {err}");
            log::debug!("error code {:#010x}", u32::from(ErrorCode::from(err)));
            exit(cli::exit_status(&err));
        }
    }
}
