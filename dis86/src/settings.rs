//! Settings
//!
//! This module defines all settings and arguments and related functions

// External imports
use anyhow::{bail, Result};
use std::env;

/// Top-level settings
#[derive(Default, Debug)]
pub struct MainSettings {
    pub first_arg: Option<String>,
    pub input_file: Option<String>,
    /// If None, print the listing to stdout
    pub output_file: Option<String>,
    pub overwrite: bool,
}

/// Decode-specific settings
#[derive(Default, Debug)]
pub struct DecodeSettings {
    /// Log the raw bytes of every instruction as it is rendered
    pub verbose: bool,
    /// Append the offset and raw bytes of every instruction to its line
    pub annotate: bool,
}

/// A custom struct holding parsed command line arguments
#[derive(Default, Debug)]
pub struct ArgsType {
    pub first_arg: Option<String>,
    /// The file to decode
    pub input_file: Option<String>,
    /// The file to output decoded assembly to
    pub output_file: Option<String>,
    pub help: bool,
    pub verbose: bool,
    /// If true, overwrite the output file. If false (default), don't overwrite.
    pub overwrite: bool,
    /// If true, append offset and bytes comments to each instruction.
    pub annotate: bool,
}

const USAGE: &str = "Usage: dis86 <input> [output] [-h|--help] [OPTIONS]";
const HELP: &str = "
The dis86 8086 Disassembler

Required Parameters:
<input> : The input binary file containing 8086 binary code.

Optional Parameters:
[output] : The output file to print decoded assembly to. If not given, print
           to stdout.

Options:

-h|--help : Print this help message.

-v|--verbose : Increase verbosity of logging to include debug information.
               RUST_LOG overrides this.

-a|--annotate : Append the offset and raw bytes of each instruction as a
                comment after it.

--overwrite : If specified, overwrite the output file instead of appending to it.
";

pub fn print_help() {
    println!("{USAGE}");
    println!("{HELP}");
}

/// Take a given arg and parse it as an optional argument. Modify parsed_args.
fn parse_optional(arg: String, parsed_args: &mut ArgsType) -> Result<()> {
    match arg.as_str() {
        "-v" | "--verbose" => parsed_args.verbose = true,
        "-a" | "--annotate" => parsed_args.annotate = true,
        "--overwrite" => parsed_args.overwrite = true,
        _ => bail!("Unexpected optional arg '{arg}'\n{USAGE}"),
    }
    Ok(())
}

/// Take the given arg and parse it as a positional argument. Modify parsed_args
fn parse_positional(arg: String, parsed_args: &mut ArgsType) -> Result<()> {
    match (&parsed_args.input_file, &parsed_args.output_file) {
        (None, _) => {
            parsed_args.input_file = Some(arg);
        }
        (_, None) => {
            parsed_args.output_file = Some(arg);
        }
        _ => {
            bail!("Unexpected positional arg '{arg}'\n{USAGE}");
        }
    }

    Ok(())
}

/// Parse the given command line arguments, including the program name.
/// Return an ArgsType struct
pub fn parse_args_from(args: Vec<String>) -> Result<ArgsType> {
    let mut parsed_args = ArgsType {
        ..Default::default()
    };

    // Do a quick scan for -h/--help before processing any other args
    if args.iter().skip(1).any(|arg| arg == "-h" || arg == "--help") {
        parsed_args.help = true;
        return Ok(parsed_args);
    }

    for arg in args {
        if parsed_args.first_arg.is_none() {
            parsed_args.first_arg = Some(arg);
        } else if arg.starts_with('-') {
            parse_optional(arg, &mut parsed_args)?;
        } else {
            parse_positional(arg, &mut parsed_args)?;
        }
    }

    if parsed_args.input_file.is_none() {
        bail!("Missing required positional arg <input>\n{USAGE}");
    }

    Ok(parsed_args)
}

/// Parse command line arguments.
pub fn parse_args() -> Result<ArgsType> {
    parse_args_from(env::args().collect())
}

/// Split up ArgsType into various settings structs
pub fn args_to_settings(args: ArgsType) -> (MainSettings, DecodeSettings) {
    let main_settings = MainSettings {
        first_arg: args.first_arg,
        input_file: args.input_file,
        output_file: args.output_file,
        overwrite: args.overwrite,
    };

    let decode_settings = DecodeSettings {
        verbose: args.verbose,
        annotate: args.annotate,
    };
    (main_settings, decode_settings)
}
