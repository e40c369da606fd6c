//! # 8086 Disassembler - Library
//!
//! A table-driven 8086 instruction decoder. A byte stream is sized in one pass,
//! decoded into a list of instructions in a second pass, and each instruction
//! is rendered as an assembly line that NASM can read back.
//!
// Define the modules in this library
pub mod decode;
pub mod display;
pub mod errors;
pub mod settings;
pub mod tables;

// Imports
use anyhow::{bail, Result};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};

use crate::decode::{count_insts, scan_insts};
use crate::display::{render, render_annotated};
use crate::errors::ScanError;
use crate::settings::DecodeSettings;

/// The first line of every listing
pub const LISTING_HEADER: &str = "bits 16";

/// Takes in a file path string and returns a byte vector containing the
/// entire contents of the file.
pub fn file_to_byte_vec(input_path: &Option<String>) -> Result<Vec<u8>> {
    // Make sure required args exist
    let mut input_file = match input_path {
        Some(file) => {
            // Get the instruction stream from a file.
            File::open(file)?
        }
        None => bail!("No input file given"),
    };

    let mut inst_stream: Vec<u8> = vec![];
    input_file.read_to_end(&mut inst_stream)?;
    Ok(inst_stream)
}

/// Takes in an optional output file path string and returns a writer for it.
/// Without a path, the writer is stdout.
pub fn get_output_writer(output_path: &Option<String>, overwrite: bool) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match output_path {
        Some(file) => {
            let mut file_options = OpenOptions::new();
            file_options.write(true).create(true);
            if overwrite {
                file_options.truncate(true);
            } else {
                file_options.append(true);
            }
            Box::new(file_options.open(file)?)
        }
        None => Box::new(io::stdout()),
    };
    Ok(writer)
}

/// The text produced by disassembling a byte stream.
#[derive(Debug)]
pub struct Listing {
    /// The header line followed by one line per decoded instruction
    pub lines: Vec<String>,
    /// Set if decoding stopped before the end of the stream. `lines` then
    /// holds the instructions decoded before the failure.
    pub error: Option<ScanError>,
}

/// Disassemble a byte stream into assembly lines.
pub fn disassemble(inst_stream: &[u8], settings: &DecodeSettings) -> Listing {
    match count_insts(inst_stream) {
        Ok(count) => build_listing(inst_stream, count, None, settings),
        Err(e) => build_listing(inst_stream, e.count, Some(e), settings),
    }
}

/// Populate and render up to `count` instructions. If populating stops
/// early, the instructions it stored are still rendered and the first error
/// seen is kept.
pub(crate) fn build_listing(
    inst_stream: &[u8],
    count: usize,
    error: Option<ScanError>,
    settings: &DecodeSettings,
) -> Listing {
    let mut insts = Vec::with_capacity(count);
    let error = match scan_insts(inst_stream, count, &mut insts) {
        Ok(_) => error,
        Err(e) => error.or(Some(e)),
    };

    let mut lines = Vec::with_capacity(insts.len() + 1);
    lines.push(LISTING_HEADER.to_string());
    for inst in &insts {
        if settings.verbose {
            debug!("{:02X?} -> {:?}", inst.bytes(inst_stream), inst);
        }
        let line = if settings.annotate {
            render_annotated(inst, inst_stream)
        } else {
            render(inst)
        };
        lines.push(line);
    }

    Listing { lines, error }
}
