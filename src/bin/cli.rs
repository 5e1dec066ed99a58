//! The command line tool that loads a target file and either compresses
//! or decompresses it.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{Arg, ArgAction, ArgGroup, Command};
use predictor::engine::{PredictiveDecoder, PredictiveEncoder};
use predictor::utils::signatures::FILE_EXTENSION;
use predictor::{Context, Decoder, Encoder, Error};

use std::time::Instant;
use std::{fs, fs::File, io::Write};

/// A scoped utility struct for measuring and reporting time.
struct Timer {
    start: std::time::Instant,
}

impl Timer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let now = Instant::now();
        if let Some(duration) = now.checked_duration_since(self.start) {
            log::info!(
                "Operation completed in {:03} seconds",
                duration.as_secs_f32()
            );
        }
    }
}

fn save_file(data: &[u8], path: &str) {
    let mut f = File::create(path).expect("Can't create file");
    f.write_all(data).expect("Unable to write data");
    log::info!("Wrote {}.", &path);
}

/// The name of the file an operation writes: compression adds the
/// artifact extension, decompression removes it (or marks the output
/// when the target was not named by us).
fn output_path(target: &str, compress: bool) -> String {
    if compress {
        return format!("{}{}", target, FILE_EXTENSION);
    }
    if let Some(stripped) = target.strip_suffix(FILE_EXTENSION) {
        return stripped.to_string();
    }
    format!("{}.out", target)
}

fn run(compress: bool, target: &str) -> Result<(), Error> {
    let input = fs::read(target)
        .map_err(|_| Error::UnreadableInput(target.to_string()))?;

    let _timer = Timer::new();
    let mut output = Vec::new();

    if compress {
        log::info!("Compressing {}.", target);
        let written =
            PredictiveEncoder::new(&input, &mut output, Context::default())
                .encode()?;
        log::info!("Compressed from {} to {} bytes.", input.len(), written);
        if !input.is_empty() {
            log::info!(
                "Compression ratio is {:.4}x.",
                input.len() as f64 / written as f64
            );
        }
    } else {
        log::info!("Decompressing {}.", target);
        let (read, written) =
            PredictiveDecoder::new(&input, &mut output).decode()?;
        log::info!("Decompressed from {} to {} bytes.", read, written);
    }

    save_file(&output, &output_path(target, compress));
    Ok(())
}

fn main() {
    let matches = Command::new("predictor")
        .version("0.1")
        .about("A self-modeling bit-predictive compressor")
        .arg(
            Arg::new("compress")
                .short('c')
                .long("compress")
                .help("Compress the target")
                .action(ArgAction::SetTrue)
                .conflicts_with("decompress"),
        )
        .arg(
            Arg::new("decompress")
                .short('d')
                .long("decompress")
                .help("Decompress the target")
                .action(ArgAction::SetTrue)
                .conflicts_with("compress"),
        )
        .group(
            ArgGroup::new("action")
                .args(["compress", "decompress"])
                .required(true),
        )
        .arg(
            Arg::new("TARGET")
                .help("The file to process")
                .required(true)
                .index(1),
        )
        .after_help(
            "Examples:\n  \
             Compress the file enwik3:\n    predictor -c enwik3\n  \
             Decompress the file enwik3.iw:\n    predictor -d enwik3.iw",
        )
        .get_matches();

    env_logger::builder().format_timestamp(None).init();

    let compress = matches.get_flag("compress");
    let target = matches.get_one::<String>("TARGET").unwrap();

    if let Err(err) = run(compress, target) {
        eprintln!("Something went wrong: {}", err);
        std::process::exit(1);
    }
}
