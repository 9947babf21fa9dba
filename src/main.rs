use std::{path::Path, process::exit};

use benchmark::{benchmark, records::RecordWriter};
use clap::Parser;
use command_parser::*;
use error::BenchError;
use itertools::izip;

mod benchmark;
mod command_parser;
mod error;
#[cfg(test)]
mod unit_test;

fn main() {
    let app = App::parse();

    if let Err(e) = run(&app.global_opts) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn run(options: &GlobalOpts) -> Result<(), BenchError> {
    let cpus = options.cpu_counts()?;

    let mut writer = match &options.output_path {
        Some(output_path) => Some(RecordWriter::create(
            Path::new(output_path.as_str()),
            &options.file_name,
        )?),
        None => None,
    };

    for (ncpu, nthread) in izip!(cpus.iter(), options.threads.iter()) {
        benchmark(*ncpu, *nthread, options, writer.as_mut())?;
    }

    if let Some(writer) = writer {
        writer.finish()?;
    }

    Ok(())
}
