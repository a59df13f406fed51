use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use pravka::checker::dictionary::DictionaryHandle;
use pravka::checker::merge::highlight_spans;
use pravka::cli::output::{self, FileReport, OutputFormat};
use pravka::{dict, summarize, Config, Linter, Status};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pravka")]
#[command(version, about = "A style and spelling linter for Russian posts", long_about = None)]
struct Cli {
    /// Files to check ("-" or nothing reads stdin)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Apply automatic fixes (files are rewritten, stdin is echoed fixed)
    #[arg(short, long)]
    fix: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if problems are found
    #[arg(long)]
    no_fail: bool,

    /// Dictionary language (e.g., ru_RU)
    #[arg(short, long)]
    language: Option<String>,

    /// Word list or compiled dictionary to use for spelling
    #[arg(short, long, env = "PRAVKA_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Rule id to disable (repeatable)
    #[arg(long, value_name = "RULE")]
    disable: Vec<String>,

    /// Output format (text, json, html)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// List the active rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Download and install a dictionary
    Download {
        /// Language code (e.g., ru_RU)
        language: String,
        /// Download the .dic from this URL instead of the default source
        /// (the .aff is taken from the same URL with an .aff extension)
        #[arg(long)]
        url: Option<String>,
    },
    /// Build a dictionary from a local word list or hunspell .dic file
    Build {
        /// Word list file
        wordlist: PathBuf,
        /// Language code to install it as
        language: String,
        /// Hunspell affix file (defaults to a sibling .aff of a .dic list)
        #[arg(long)]
        affix: Option<PathBuf>,
    },
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
}

struct Input {
    source: String,
    path: Option<PathBuf>,
    text: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "pravka", &mut io::stdout());
        return Ok(());
    }

    if let Some(command) = cli.command {
        return handle_command(command);
    }

    let config = Config::load(
        cli.language.clone(),
        cli.dictionary.clone(),
        cli.disable.clone(),
    )?;
    let colored = !cli.no_color;
    if !colored {
        colored::control::set_override(false);
    }

    let dictionary = load_dictionary(&config);
    let linter = Linter::from_config(&config, dictionary)?;

    if cli.list_rules {
        output::print_rules(linter.registry(), colored);
        return Ok(());
    }

    let inputs = read_inputs(&cli.files)?;
    let reports: Vec<FileReport> = inputs
        .par_iter()
        .map(|input| lint_input(&linter, input, cli.fix))
        .collect();

    let mut files_with_problems = 0;
    let mut files_fixed = 0;

    for (input, report) in inputs.iter().zip(&reports) {
        if report.summary.status != Status::Clean {
            files_with_problems += 1;
        }

        if cli.fix && report.fixed {
            files_fixed += 1;
            match &input.path {
                Some(path) => fs::write(path, &report.text)
                    .with_context(|| format!("Failed to write file: {}", path.display()))?,
                None => {
                    print!("{}", report.text);
                    continue;
                }
            }
        } else if cli.fix && input.path.is_none() {
            print!("{}", report.text);
            continue;
        }

        output::print_report(report, colored, cli.format);
    }

    if cli.format == OutputFormat::Text {
        if cli.fix {
            output::print_fix_summary(files_fixed, reports.len(), colored);
        } else {
            output::print_check_summary(files_with_problems, reports.len(), colored);
        }
    }

    if files_with_problems > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

/// Load the configured dictionary; spelling is skipped if that fails.
fn load_dictionary(config: &Config) -> DictionaryHandle {
    let handle = DictionaryHandle::new();

    let Some(path) = config.dictionary_path() else {
        return handle;
    };
    if !path.exists() {
        log::warn!(
            "No dictionary at {}, spelling check disabled (run `pravka dict download {}`)",
            path.display(),
            config.language
        );
        return handle;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::warn!("Failed to start dictionary loader: {}", e);
            return handle;
        }
    };

    match runtime.block_on(handle.load_async(path.clone())) {
        Ok(words) => log::debug!("Loaded {} words from {}", words, path.display()),
        Err(e) => log::warn!("Failed to load dictionary {}: {:#}", path.display(), e),
    }

    handle
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<Input>> {
    let reads_stdin = files.is_empty() || files.iter().any(|f| f.as_os_str() == "-");
    let mut inputs = Vec::new();

    if reads_stdin {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        inputs.push(Input {
            source: "<stdin>".to_string(),
            path: None,
            text,
        });
    }

    for path in files.iter().filter(|f| f.as_os_str() != "-") {
        if !path.exists() {
            log::error!("File not found: {}", path.display());
            continue;
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        inputs.push(Input {
            source: path.display().to_string(),
            path: Some(path.clone()),
            text,
        });
    }

    Ok(inputs)
}

fn lint_input(linter: &Linter, input: &Input, fix: bool) -> FileReport {
    let (text, snapshot, fixed) = if fix {
        let outcome = linter.fix(&input.text);
        (outcome.text, outcome.snapshot, outcome.changed)
    } else {
        (input.text.clone(), linter.evaluate(&input.text), false)
    };

    FileReport {
        source: input.source.clone(),
        summary: summarize(&snapshot, linter.registry()),
        spans: highlight_spans(&snapshot),
        text,
        snapshot,
        fixed,
    }
}

fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => {
                dict::manager::list_dictionaries()?;
            }
            DictCommands::Download { language, url } => {
                dict::manager::download_dictionary(&language, url.as_deref())?;
            }
            DictCommands::Build {
                wordlist,
                language,
                affix,
            } => {
                dict::manager::build_from_file(&wordlist, &language, affix.as_deref())?;
            }
            DictCommands::Info { language } => {
                dict::manager::show_info(&language)?;
            }
        },
    }
    Ok(())
}
