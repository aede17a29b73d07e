use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use huffman_text_codec::{Result, decompress};

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_decompressed.txt", stem))
}

fn run(input_filepath: &Path, output_filepath: &Path) -> Result<()> {
    info!("--- Start Decoding ---");

    let encoded = fs::read(input_filepath)?;
    let decoded = decompress(&encoded)?;

    info!("Writing decoded output to file: {}", output_filepath.display());
    fs::write(output_filepath, decoded.as_bytes())?;

    println!(
        "\r\n✅ decoding successful.\n\
         📂 input file:  {} ({} bytes)\n\
         💾 output file: {} ({} bytes)",
        input_filepath.display(),
        encoded.len(),
        output_filepath.display(),
        decoded.len()
    );

    info!("--- End ---");
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        error!("Usage: {} <input_file> [output_file]", args[0]);
        eprintln!("  📂 <input_file>:  path to the compressed file.");
        eprintln!("  💾 [output_file]: path to write the decoded text.");
        std::process::exit(1);
    }

    let input_filepath = PathBuf::from(&args[1]);
    let output_filepath = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&input_filepath));

    if let Err(e) = run(&input_filepath, &output_filepath) {
        error!("Decoding {} failed: {}", input_filepath.display(), e);
        std::process::exit(1);
    }
}
