//! # 8086 Disassembler - Executable

// External imports
use anyhow::Result;
use log::info;
use std::io::Write;
use std::time::Instant;

// Internal imports
use dis86::settings::{args_to_settings, parse_args, print_help};
use dis86::{disassemble, file_to_byte_vec, get_output_writer};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() -> Result<()> {
    let time_program_started = Instant::now();

    // Parse args. Fail if incorrect args are given
    let args = parse_args()?;

    // Now, *process* parsed args
    if args.help {
        print_help();
        return Ok(());
    }

    let (main_settings, decode_settings) = args_to_settings(args);
    init_logging(decode_settings.verbose);
    let time_args_parsed = Instant::now();

    info!("Executable: {}", main_settings.first_arg.as_deref().unwrap_or("dis86"));

    let program_bytes = file_to_byte_vec(&main_settings.input_file)?;
    let mut output = get_output_writer(&main_settings.output_file, main_settings.overwrite)?;
    info!(
        "Decoding {} bytes from file '{}'...",
        program_bytes.len(),
        main_settings.input_file.as_deref().unwrap_or_default()
    );

    let listing = disassemble(&program_bytes, &decode_settings);
    // Print out instructions to the output, even if decoding stopped early
    for line in &listing.lines {
        writeln!(output, "{line}")?;
    }
    output.flush()?;

    let time_program_ended = Instant::now();
    info!(
        "Program execution time: {} ms",
        time_program_ended.duration_since(time_program_started).as_millis()
    );
    info!(
        "(Arg parse execution time: {} us)",
        time_args_parsed.duration_since(time_program_started).as_micros()
    );

    match listing.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
