use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use huffman_text_codec::{MergeOrder, Result, compress_with_report};

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("bin")
}

fn run(input_filepath: &Path, output_filepath: &Path, merge_order: MergeOrder) -> Result<()> {
    info!("Encoding with merge order: {}", merge_order);
    if merge_order == MergeOrder::Largest {
        warn!("Largest-first merging does not produce an optimal code");
    }

    let raw_text = fs::read_to_string(input_filepath)?;
    let text = raw_text.trim_end();
    debug!(
        "Trimmed {} trailing bytes of whitespace",
        raw_text.len() - text.len()
    );

    let (encoded, report) = compress_with_report(text, merge_order)?;
    fs::write(output_filepath, &encoded)?;

    println!(
        "\r\n✅ Encoding successful.\n\
         📂  Input:       {} ({} bytes)\n\
         💾  Output:      {} ({} bytes)\n\
         ⚙️  Merge order: {} ({} unique symbols)\n\
         ℹ️  Entropy:     {:.4} bits/symbol (code: {:.4})\n\
         🗜️  Ratio:       {:.4}%",
        input_filepath.display(),
        report.input_bytes,
        output_filepath.display(),
        report.output_bytes,
        report.merge_order,
        report.unique_symbols,
        report.entropy,
        report.average_code_length,
        report.ratio()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        error!(
            "Usage: {} <input_file> [output_file] [--merge=smallest|largest]",
            args[0]
        );
        std::process::exit(1);
    }

    let input_filepath = PathBuf::from(&args[1]);
    let mut output_filepath = None;
    let mut merge_order = MergeOrder::default();

    for arg in &args[2..] {
        if let Some(value) = arg.strip_prefix("--merge=") {
            match value.parse::<MergeOrder>() {
                Ok(order) => merge_order = order,
                Err(e) => {
                    error!("{}", e);
                    std::process::exit(1);
                }
            }
        } else {
            output_filepath = Some(PathBuf::from(arg));
        }
    }
    let output_filepath = output_filepath.unwrap_or_else(|| default_output_path(&input_filepath));

    if let Err(e) = run(&input_filepath, &output_filepath, merge_order) {
        error!("Encoding {} failed: {}", input_filepath.display(), e);
        std::process::exit(1);
    }
}
