use log::{error, info, warn};

use super::decoder_stream::{decompress_to, DecoderOptions};
use crate::tools::cli::{BzOpts, Mode, Output};

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Error, Write},
    path::Path,
};

/// Name of the file that `input` decompresses to.
pub fn output_name(input: &str) -> String {
    for (suffix, replacement) in [(".bz2", ""), (".bz", ""), (".tbz2", ".tar"), (".tbz", ".tar")] {
        if let Some(stem) = input.strip_suffix(suffix) {
            if !stem.is_empty() {
                return format!("{}{}", stem, replacement);
            }
        }
    }
    format!("{}.out", input)
}

/// Decompress (or test) every file named in opts (BzOpts), or standard input when there are none.
/// Each file is handled on its own; the result is an error if any of them failed.
pub fn decompress(opts: &BzOpts) -> io::Result<()> {
    let options = DecoderOptions {
        multi_stream: opts.multi_stream,
        ..DecoderOptions::default()
    };

    if opts.files.is_empty() {
        let stdin = io::stdin();
        return match opts.op_mode {
            Mode::Test => test_one("(stdin)", stdin.lock(), options).map(|_| ()),
            Mode::Unzip => {
                let stdout = io::stdout();
                let mut sink = stdout.lock();
                decompress_to(stdin.lock(), &mut sink, options)?;
                sink.flush()
            }
        };
    }

    let mut failures = 0;
    for name in &opts.files {
        let result = match opts.op_mode {
            Mode::Test => {
                File::open(name).and_then(|f| test_one(name, f, options.clone()).map(|_| ()))
            }
            Mode::Unzip => unzip_one(name, opts, options.clone()),
        };
        if let Err(e) = result {
            error!("{}: {}", name, e);
            failures += 1;
        }
    }

    match failures {
        0 => Ok(()),
        n => Err(Error::new(
            io::ErrorKind::Other,
            format!("{} of {} files failed", n, opts.files.len()),
        )),
    }
}

/// Decode everything and throw the output away, reporting whether the data is intact.
fn test_one<R: io::Read>(name: &str, source: R, options: DecoderOptions) -> io::Result<u64> {
    let n = decompress_to(source, &mut io::sink(), options)?;
    info!("{}: ok ({} bytes)", name, n);
    Ok(n)
}

fn unzip_one(name: &str, opts: &BzOpts, options: DecoderOptions) -> io::Result<()> {
    let f_in = File::open(name)?;

    if opts.output == Output::Stdout {
        let stdout = io::stdout();
        let mut sink = stdout.lock();
        decompress_to(f_in, &mut sink, options)?;
        return sink.flush();
    }

    let fname = output_name(name);
    if !name.ends_with("bz2") && !name.ends_with("bz") {
        warn!("{}: can't guess original name, using {}", name, fname);
    }
    // Prepare to write the data, refusing to clobber anything unless told to.
    let f_out = OpenOptions::new()
        .write(true)
        .create(opts.force_overwrite)
        .create_new(!opts.force_overwrite)
        .truncate(true)
        .open(&fname)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::new(
                e.kind(),
                format!("output file {} already exists (use -f to overwrite)", fname),
            ),
            _ => e,
        })?;

    let mut writer = BufWriter::new(f_out);
    let written = decompress_to(f_in, &mut writer, options).and_then(|n| {
        writer.flush()?;
        Ok(n)
    });
    match written {
        Ok(n) => {
            info!("{}: done, {} bytes written to {}", name, n, fname);
            if !opts.keep_input_files {
                fs::remove_file(name)?;
            }
            Ok(())
        }
        Err(e) => {
            // Never leave a partial output file behind.
            drop(writer);
            if Path::new(&fname).exists() {
                fs::remove_file(&fname)?;
            }
            Err(e)
        }
    }
}
