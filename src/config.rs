use crate::catfr::{CategorizedVocabulary, CategorizedWord};
use crate::error::ListgenError;
use crate::fr::DEFAULT_WORDS_PER_LIST;
use crate::list_types::{check_group_count, ListTypeCounts};
use crate::pal::{DEFAULT_N_LISTS, DEFAULT_N_PAIRS};
use crate::types::{CatFrSessionPool, CuePosition, FrSessionPool, ListType, SessionPool};
use crate::vocabulary::Vocabulary;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Which pool generator to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Paired-associate learning
    Pal,
    /// Free recall
    Fr,
    /// Categorized free recall
    #[value(name = "catfr")]
    #[serde(rename = "catfr")]
    CatFr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Configuration for the list generator
#[derive(Debug, Clone, Parser)]
#[command(name = "listgen")]
#[command(about = "Generate randomized word pools for memory experiments")]
pub struct Config {
    /// Task to generate pools for
    #[arg(long, value_enum, default_value = "pal")]
    pub task: Task,

    /// Number of sessions to generate (default: 1)
    #[arg(short, long, default_value = "1")]
    pub sessions: usize,

    /// Number of task lists per session, excluding practice (default: 25).
    /// Ignored for catfr, where the vocabulary fixes one list per category.
    #[arg(long, default_value_t = DEFAULT_N_LISTS)]
    pub lists: usize,

    /// PAL pairs per list (default: 6)
    #[arg(long, default_value_t = DEFAULT_N_PAIRS)]
    pub pairs: usize,

    /// FR words per list (default: 12)
    #[arg(long, default_value_t = DEFAULT_WORDS_PER_LIST)]
    pub words_per_list: usize,

    /// Session language code (EN or SP)
    #[arg(short, long, default_value = "EN")]
    pub language: String,

    /// Task word pool file replacing the bundled pool: one word per line,
    /// or a `word,category` CSV for catfr (required there)
    #[arg(long)]
    pub wordpool: Option<PathBuf>,

    /// Practice word file replacing the bundled practice list
    /// (`word,category` CSV for catfr, required there)
    #[arg(long)]
    pub practice_pool: Option<PathBuf>,

    /// Number of BASELINE lists
    #[arg(long)]
    pub baseline: Option<usize>,

    /// Number of NON-STIM lists
    #[arg(long)]
    pub nonstim: Option<usize>,

    /// Number of STIM lists
    #[arg(long)]
    pub stim: Option<usize>,

    /// Number of PS (parameter search) lists
    #[arg(long)]
    pub ps: Option<usize>,

    /// Balance STIM/NON-STIM across this many groups instead of the two halves
    #[arg(long, conflicts_with = "shuffle_stim")]
    pub balanced_groups: Option<usize>,

    /// Put STIM/NON-STIM lists in fully random order, without half balance
    #[arg(long)]
    pub shuffle_stim: bool,

    /// Seed for random number generator (for reproducible pools)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// List-type counts, if any were requested. Missing counts are zero.
    pub fn list_type_counts(&self) -> Option<ListTypeCounts> {
        if self.baseline.is_none() && self.nonstim.is_none() && self.stim.is_none() && self.ps.is_none() {
            return None;
        }
        Some(ListTypeCounts::new(
            self.baseline.unwrap_or(0),
            self.nonstim.unwrap_or(0),
            self.stim.unwrap_or(0),
            self.ps.unwrap_or(0),
        ))
    }

    /// Check requested list-type counts against the number of task lists
    /// before any pool is generated
    pub fn validate_list_type_counts(&self, n_lists: usize) -> crate::error::Result<()> {
        let Some(counts) = self.list_type_counts() else {
            return Ok(());
        };
        if counts.total() != n_lists {
            return Err(ListgenError::config_mismatch(format!(
                "list type counts sum to {} but sessions have {} task lists",
                counts.total(),
                n_lists
            )));
        }
        if let Some(n_groups) = self.balanced_groups {
            check_group_count(counts, n_groups)?;
        }
        Ok(())
    }
}

/// Load a word-per-line vocabulary file
pub fn load_vocabulary_file(path: &Path) -> anyhow::Result<Vocabulary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read word pool {:?}", path))?;
    Vocabulary::parse(&content).with_context(|| format!("Invalid word pool {:?}", path))
}

/// Load a `word,category` CSV vocabulary
pub fn load_categorized_file(path: &Path) -> anyhow::Result<CategorizedVocabulary> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to read categorized word pool {:?}", path))?;
    let entries = reader
        .deserialize()
        .collect::<Result<Vec<CategorizedWord>, csv::Error>>()
        .with_context(|| format!("Invalid categorized word pool {:?}", path))?;
    CategorizedVocabulary::new(entries)
        .with_context(|| format!("Invalid categorized word pool {:?}", path))
}

/// Generated sessions of either task
#[derive(Debug, Clone)]
pub enum GeneratedPools {
    Pal(Vec<SessionPool>),
    Fr(Vec<FrSessionPool>),
    CatFr(Vec<CatFrSessionPool>),
}

impl GeneratedPools {
    pub fn task(&self) -> Task {
        match self {
            GeneratedPools::Pal(_) => Task::Pal,
            GeneratedPools::Fr(_) => Task::Fr,
            GeneratedPools::CatFr(_) => Task::CatFr,
        }
    }

    pub fn session_count(&self) -> usize {
        match self {
            GeneratedPools::Pal(pools) => pools.len(),
            GeneratedPools::Fr(pools) => pools.len(),
            GeneratedPools::CatFr(pools) => pools.len(),
        }
    }
}

#[derive(Serialize)]
struct SessionOutput<'a, P: Serialize> {
    session: usize,
    rows: &'a P,
}

#[derive(Serialize)]
struct PoolsOutput<'a, P: Serialize> {
    task: Task,
    sessions: Vec<SessionOutput<'a, P>>,
}

/// Flat CSV record for a PAL row
#[derive(Serialize)]
struct PalRecord<'a> {
    session: usize,
    word1: &'a str,
    word2: &'a str,
    #[serde(rename = "type")]
    list_type: Option<ListType>,
    listno: usize,
    cue_pos: CuePosition,
}

/// Flat CSV record for an FR row
#[derive(Serialize)]
struct FrRecord<'a> {
    session: usize,
    word: &'a str,
    #[serde(rename = "type")]
    list_type: Option<ListType>,
    listno: usize,
}

/// Flat CSV record for a catFR row
#[derive(Serialize)]
struct CatFrRecord<'a> {
    session: usize,
    word: &'a str,
    category: &'a str,
    #[serde(rename = "type")]
    list_type: Option<ListType>,
    listno: usize,
}

fn sessions_output<P: Serialize>(task: Task, pools: &[P]) -> PoolsOutput<'_, P> {
    PoolsOutput {
        task,
        sessions: pools
            .iter()
            .enumerate()
            .map(|(session, rows)| SessionOutput { session, rows })
            .collect(),
    }
}

/// Write pools as pretty JSON
pub fn write_pools_json(pools: &GeneratedPools, writer: impl Write) -> anyhow::Result<()> {
    match pools {
        GeneratedPools::Pal(p) => serde_json::to_writer_pretty(writer, &sessions_output(Task::Pal, p))?,
        GeneratedPools::Fr(p) => serde_json::to_writer_pretty(writer, &sessions_output(Task::Fr, p))?,
        GeneratedPools::CatFr(p) => serde_json::to_writer_pretty(writer, &sessions_output(Task::CatFr, p))?,
    }
    Ok(())
}

/// Write pools as one CSV table with a leading `session` column
pub fn write_pools_csv(pools: &GeneratedPools, writer: impl Write) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    match pools {
        GeneratedPools::Pal(sessions) => {
            for (session, pool) in sessions.iter().enumerate() {
                for row in pool {
                    csv_writer.serialize(PalRecord {
                        session,
                        word1: &row.word1,
                        word2: &row.word2,
                        list_type: row.list_type,
                        listno: row.listno,
                        cue_pos: row.cue_pos,
                    })?;
                }
            }
        }
        GeneratedPools::Fr(sessions) => {
            for (session, pool) in sessions.iter().enumerate() {
                for row in pool {
                    csv_writer.serialize(FrRecord {
                        session,
                        word: &row.word,
                        list_type: row.list_type,
                        listno: row.listno,
                    })?;
                }
            }
        }
        GeneratedPools::CatFr(sessions) => {
            for (session, pool) in sessions.iter().enumerate() {
                for row in pool {
                    csv_writer.serialize(CatFrRecord {
                        session,
                        word: &row.word,
                        category: &row.category,
                        list_type: row.list_type,
                        listno: row.listno,
                    })?;
                }
            }
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write pools in `format` to `path`, or stdout when `path` is None
pub fn write_pools(pools: &GeneratedPools, format: OutputFormat, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file {:?}", path))?;
            let writer = std::io::BufWriter::new(file);
            match format {
                OutputFormat::Json => write_pools_json(pools, writer),
                OutputFormat::Csv => write_pools_csv(pools, writer),
            }
        }
        None => {
            let stdout = std::io::stdout();
            let writer = stdout.lock();
            match format {
                OutputFormat::Json => write_pools_json(pools, writer),
                OutputFormat::Csv => write_pools_csv(pools, writer),
            }
        }
    }
}
