use std::io::{self, IsTerminal, Read};

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "screen-phrase-matcher",
    version,
    about = "Match noisy OCR text against a bilingual phrase dictionary"
)]
struct Cli {
    /// JSON object of source phrase -> target phrase
    #[arg(short = 'd', long = "dictionary")]
    dictionary: Option<String>,

    /// JSON object of id -> source text (requires --target-table)
    #[arg(long = "source-table")]
    source_table: Option<String>,

    /// JSON object of id -> target text (requires --source-table)
    #[arg(long = "target-table")]
    target_table: Option<String>,

    /// Source language of the dictionary keys (overrides settings)
    #[arg(short = 'L', long = "lang")]
    lang: Option<String>,

    /// Print the perceptual fingerprint of an image and exit
    #[arg(long = "fingerprint")]
    fingerprint: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    screen_phrase_matcher::logging::init(cli.verbose)?;

    let input = if cli.fingerprint.is_some() || io::stdin().is_terminal() {
        None
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Some(buffer)
    };

    let output = screen_phrase_matcher::run(
        screen_phrase_matcher::Config {
            lang: cli.lang,
            dictionary_path: cli.dictionary,
            source_table_path: cli.source_table,
            target_table_path: cli.target_table,
            settings_path: cli.read_settings,
            fingerprint_path: cli.fingerprint,
        },
        input,
    )?;

    println!("{}", output);
    Ok(())
}
