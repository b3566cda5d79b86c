use anyhow::Context;
use clap::{Parser, Subcommand};
use libbopomofo::{
    parse_key_script, EngineConfig, InputMode, InputState, KeyHandler, KeyHandlerResult, KeyboardLayout,
    Preferences,
};
use libbopomofo_core::{GridOptions, LanguageModel};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bopomofo")]
#[command(about = "Bopomofo input method key handler driven from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Keyboard layout (standard, eten, ibm, hsu or eten26); overrides the config file
    #[arg(long, global = true)]
    layout: Option<KeyboardLayout>,

    /// Plain Bopomofo: resolve every syllable right away
    #[arg(long, global = true)]
    plain: bool,

    /// Half-width punctuation
    #[arg(long, global = true)]
    half_width: bool,

    /// Offer associated phrases after each commit
    #[arg(long, global = true)]
    associated: bool,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// redb file holding user and excluded phrases
    #[arg(long, global = true)]
    user_phrases: Option<PathBuf>,

    /// Directory with lexicon.fst and lexicon.bincode (see convert_table)
    #[arg(long, global = true)]
    lexicon_dir: Option<PathBuf>,

    /// Text file of `reading value` lines to add to the user phrases
    #[arg(long, global = true)]
    import_user_phrases: Option<PathBuf>,

    /// Text file of `reading value` lines to hide from lookups
    #[arg(long, global = true)]
    excluded_phrases: Option<PathBuf>,

    /// Phrase replacement file (`value replacement` lines); turns replacement on
    #[arg(long, global = true)]
    replacements: Option<PathBuf>,

    /// Associated phrase file (`key phrase ...` lines)
    #[arg(long, global = true)]
    associated_phrases: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a key script and print every published state as JSON
    Type {
        /// Keys, e.g. `su3cl3{enter}`; named keys go in braces
        script: String,
    },
    /// Interactive mode: every line is a key script
    Repl,
    /// List the candidates for a sequence of readings
    Candidates {
        /// Readings such as ㄋㄧˇ ㄏㄠˇ
        #[arg(required = true)]
        readings: Vec<String>,
    },
    /// Hide a phrase from lookups; needs --user-phrases to persist
    Exclude {
        reading: String,
        value: String,
        /// Show the phrase again instead
        #[arg(long)]
        undo: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_toml(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(layout) = cli.layout {
        config.keyboard_layout = layout;
    }
    if cli.plain {
        config.preferences.input_mode = InputMode::PlainBopomofo;
    }
    if cli.half_width {
        config.preferences.half_width_punctuation_enabled = true;
    }
    if cli.associated {
        config.preferences.associated_phrases_enabled = true;
    }

    let data = &mut config.data;
    let overrides = [
        (&mut data.user_phrases, &cli.user_phrases),
        (&mut data.lexicon_dir, &cli.lexicon_dir),
        (&mut data.import_user_phrases, &cli.import_user_phrases),
        (&mut data.excluded_phrases, &cli.excluded_phrases),
        (&mut data.replacements, &cli.replacements),
        (&mut data.associated_phrases, &cli.associated_phrases),
    ];
    for (slot, flag) in overrides {
        if flag.is_some() {
            slot.clone_from(flag);
        }
    }
    if cli.replacements.is_some() {
        config.base.phrase_replacement_enabled = true;
    }
    Ok(config)
}

/// Feed one script through the handler, advancing `state`.
fn replay<F>(
    handler: &mut KeyHandler,
    prefs: &Preferences,
    script: &str,
    state: &mut InputState,
    mut emit: F,
) -> anyhow::Result<()>
where
    F: FnMut(&str, &KeyHandlerResult) -> anyhow::Result<()>,
{
    for key in parse_key_script(script)? {
        let result = handler.handle(&key, state, prefs);
        emit(&key.text, &result)?;
        if let Some(last) = result.last_state() {
            *state = last.clone();
        }
    }
    Ok(())
}

fn run_type(handler: &mut KeyHandler, prefs: &Preferences, script: &str) -> anyhow::Result<()> {
    let mut state = InputState::Empty;
    replay(handler, prefs, script, &mut state, |key, result| {
        match result {
            KeyHandlerResult::Rejected(err) => {
                println!("{}", serde_json::json!({ "key": key, "rejected": err.to_string() }));
            }
            KeyHandlerResult::Unhandled(states) if states.is_empty() => {
                println!("{}", serde_json::json!({ "key": key, "unhandled": true }));
            }
            KeyHandlerResult::Handled(states) | KeyHandlerResult::Unhandled(states) => {
                for s in states {
                    println!("{}", serde_json::to_string(s)?);
                }
            }
        }
        Ok(())
    })
}

fn run_repl(handler: &mut KeyHandler, prefs: &Preferences) -> anyhow::Result<()> {
    println!("bopomofo key handler: type a key script per line ({{space}}, {{enter}}, {{esc}}, {{bs}}, ...)");
    println!("Example: su3cl3 for 你好");
    println!("Ctrl-D to exit.");

    let mut state = InputState::Empty;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let script = line.trim_end_matches('\r');
        if !script.is_empty() {
            let outcome = replay(handler, prefs, script, &mut state, |key, result| {
                match result {
                    KeyHandlerResult::Rejected(err) => println!("  {key:?}: rejected ({err})"),
                    KeyHandlerResult::Handled(states) | KeyHandlerResult::Unhandled(states) => {
                        for s in states {
                            println!("  {key:?}: {s}");
                        }
                    }
                }
                Ok(())
            });
            if let Err(e) = outcome {
                eprintln!("error: {e}");
            }
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    println!();
    Ok(())
}

fn run_candidates(model: &dyn LanguageModel, readings: &[String]) {
    let refs: Vec<&str> = readings.iter().map(String::as_str).collect();
    let candidates = model.candidates(&refs);
    if candidates.is_empty() {
        println!("(no candidates found)");
        return;
    }
    for (i, c) in candidates.iter().enumerate() {
        println!("{}. {} score={:.4}", i + 1, c.text, c.score);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    if let Commands::Config = &cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let model = config.build_model().context("failed to build the language model")?;
    if let Commands::Exclude { reading, value, undo } = &cli.command {
        if config.data.user_phrases.is_none() {
            tracing::warn!("no --user-phrases store; the change lasts for this run only");
        }
        let changed = if *undo {
            model.unexclude_phrase(reading, value)?
        } else {
            model.exclude_phrase(reading, value)?
        };
        let action = if *undo { "unexclude" } else { "exclude" };
        let outcome = if changed { "done" } else { "no change" };
        println!("{action} {reading} {value}: {outcome}");
        return Ok(());
    }

    let model: Rc<dyn LanguageModel> = Rc::new(model);
    let prefs = config.preferences.clone();
    let grid_options = GridOptions::from_config(&config.base);

    match &cli.command {
        Commands::Type { script } => {
            let mut handler = KeyHandler::new(model, config.keyboard_layout).with_grid_options(grid_options);
            run_type(&mut handler, &prefs, script)?;
        }
        Commands::Repl => {
            let mut handler = KeyHandler::new(model, config.keyboard_layout).with_grid_options(grid_options);
            run_repl(&mut handler, &prefs)?;
        }
        Commands::Candidates { readings } => run_candidates(model.as_ref(), readings),
        Commands::Exclude { .. } | Commands::Config => {}
    }
    Ok(())
}
