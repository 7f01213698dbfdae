//! Command-line front end.
//!
//! ```text
//! lingnoise noise --spec "lexical-text_file=<hi.txt>,theta_global=0.2" < in.txt > out.txt
//! lingnoise posterior --lang hin --lexicon hin_bho.json --text hi.txt --wordlist hin.json
//! lingnoise wordlist --conllu hi_hdtb-ud-train.conllu --output hin.json
//! ```

use clap::{Parser, Subcommand};
use lingnoise::logging::init_tracing;
use lingnoise::wordlist::FunctionalWords;
use lingnoise::{Config, NoiseComposer, Posterior};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "lingnoise")]
#[command(about = "Synthetic phonological, lexical and morphological noise for related languages")]
#[command(version)]
struct Args {
    /// Config file path (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log filter, e.g. "debug" or "lingnoise=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Noise a corpus line by line
    Noise {
        /// Noise specification, e.g. "phonological-lang=hin,theta_phon=0.1,text_file=<hi.txt>"
        #[arg(short, long)]
        spec: String,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Estimate noise parameters from a bilingual lexicon
    Posterior {
        #[arg(long)]
        lang: String,

        /// Lexicon JSON: source -> target or {target: frequency}
        #[arg(long)]
        lexicon: PathBuf,

        /// Source language corpus
        #[arg(long)]
        text: PathBuf,

        /// Functional word list JSON (see `wordlist`)
        #[arg(long)]
        wordlist: PathBuf,

        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a functional word list from a CoNLL-U treebank
    Wordlist {
        #[arg(long)]
        conllu: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    init_tracing(&config.log_level);

    match args.command {
        Command::Noise {
            spec,
            input,
            output,
        } => run_noise(&spec, input.as_deref(), output.as_deref(), &config),
        Command::Posterior {
            lang,
            lexicon,
            text,
            wordlist,
            json,
        } => {
            let posterior = Posterior::from_files(&lang, &lexicon, &text, &wordlist, &config)?;
            let estimate = posterior.estimate();
            if json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                println!("{estimate}");
            }
            Ok(())
        }
        Command::Wordlist { conllu, output } => {
            let list = FunctionalWords::from_conllu(&conllu)?;
            let mut writer = BufWriter::new(File::create(&output)?);
            serde_json::to_writer_pretty(&mut writer, list.by_tag())?;
            writer.flush()?;
            info!(path = %output.display(), words = list.len(), "functional word list written");
            Ok(())
        }
    }
}

fn run_noise(
    spec: &str,
    input: Option<&Path>,
    output: Option<&Path>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let composer = NoiseComposer::from_spec(spec, config)?;
    composer.record_artifacts()?;

    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let lines = reader.lines().collect::<io::Result<Vec<String>>>()?;
    info!(lines = lines.len(), "noising corpus");

    let noised = composer.apply_lines(&lines);

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for line in &noised {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}
