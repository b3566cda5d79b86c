//! Compile `reading value score` text tables into `lexicon.fst` +
//! `lexicon.bincode`, the artifacts loaded by `bopomofo --lexicon-dir`.
use anyhow::{bail, Context, Result};
use clap::Parser;
use libbopomofo_core::lexicon::parse_table;
use libbopomofo_core::Lexicon;
use std::fs::create_dir_all;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "convert_table")]
#[command(about = "Build lexicon.fst and lexicon.bincode from phrase tables")]
struct Cli {
    /// Text tables; a phrase listed twice for a reading keeps its best score
    #[arg(required = true)]
    tables: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/converted")]
    out_dir: PathBuf,

    /// Reload the written artifacts and compare key counts
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut lexicon = Lexicon::new();
    for path in &cli.tables {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let rows = parse_table(&content).with_context(|| format!("in {}", path.display()))?;
        println!("{}: {} rows", path.display(), rows.len());
        for (key, text, score) in rows {
            lexicon.insert(key, text, score);
        }
    }
    if lexicon.is_empty() {
        bail!("no phrases found in the given tables");
    }

    create_dir_all(&cli.out_dir)?;
    let fst_path = cli.out_dir.join("lexicon.fst");
    let bincode_path = cli.out_dir.join("lexicon.bincode");
    lexicon
        .save_fst_bincode(&fst_path, &bincode_path)
        .context("failed to write lexicon artifacts")?;
    println!(
        "Wrote {} keys to {} and {}",
        lexicon.len(),
        fst_path.display(),
        bincode_path.display()
    );

    if cli.verify {
        let reloaded = Lexicon::load_from_fst_bincode(&fst_path, &bincode_path)?;
        if reloaded.len() != lexicon.len() {
            bail!(
                "reloaded lexicon has {} keys, expected {}",
                reloaded.len(),
                lexicon.len()
            );
        }
        println!("Verified {} keys", reloaded.len());
    }

    Ok(())
}
