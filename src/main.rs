use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use ram_listgen::config::{
    load_categorized_file, load_vocabulary_file, write_pools, Config, GeneratedPools, Task,
};
use ram_listgen::{
    assign_balanced_list_types, assign_list_types, assign_shuffled_list_types, ensure_unique,
    CatFrGenerator, FrGenerator, Language, PalGenerator, Pool, PoolRow, Vocabulary,
};
use std::path::Path;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::OpenOptions;
use std::io::Write;

/// Tees log output to stderr and a file
struct DualWriter {
    file: std::fs::File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()?;
        self.file.flush()
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let mut logger_builder = env_logger::Builder::from_default_env();
    logger_builder.filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info));

    if let Some(log_file_path) = &config.log_file {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(log_file_path)
            .with_context(|| format!("Failed to open log file {:?}", log_file_path))?;
        logger_builder.target(env_logger::Target::Pipe(Box::new(DualWriter { file })));
    }

    logger_builder.init();
    Ok(())
}

/// Label every pool's lists if counts were requested on the command line
fn assign_types<R: PoolRow>(
    rng: &mut StdRng,
    config: &Config,
    pools: Vec<Pool<R>>,
) -> ram_listgen::Result<Vec<Pool<R>>> {
    let Some(counts) = config.list_type_counts() else {
        return Ok(pools);
    };
    info!("Assigning list types {:?}", counts);
    pools
        .iter()
        .map(|pool| match (config.shuffle_stim, config.balanced_groups) {
            (true, _) => assign_shuffled_list_types(&mut *rng, pool, counts),
            (false, Some(n_groups)) => assign_balanced_list_types(&mut *rng, pool, counts, n_groups),
            (false, None) => assign_list_types(&mut *rng, pool, counts),
        })
        .collect()
}

fn load_words(path: Option<&Path>, bundled: impl FnOnce() -> ram_listgen::Result<Vocabulary>) -> Result<Vocabulary> {
    match path {
        Some(path) => load_vocabulary_file(path),
        None => Ok(bundled()?),
    }
}

/// catFR has no bundled pool, so both CSV files must be given
fn catfr_generator(config: &Config) -> Result<CatFrGenerator> {
    let (Some(wordpool), Some(practice)) = (&config.wordpool, &config.practice_pool) else {
        anyhow::bail!("catfr needs --wordpool and --practice-pool as word,category CSV files");
    };
    let vocabulary = load_categorized_file(wordpool)?;
    let practice = load_categorized_file(practice)?;
    Ok(CatFrGenerator::new(&vocabulary, practice)?)
}

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    info!("Starting listgen");
    info!("Configuration: {:?}", config);

    // Language is validated before any word pool is read
    let language = Language::from_code(&config.language)?;
    let catfr = match config.task {
        Task::CatFr => Some(catfr_generator(&config)?),
        Task::Pal | Task::Fr => None,
    };
    let n_lists = catfr.as_ref().map_or(config.lists, |g| g.layout().n_lists());
    config.validate_list_type_counts(n_lists)?;

    let mut rng: StdRng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(rand::thread_rng())?,
    };

    let pools = match config.task {
        Task::Pal => {
            let vocabulary = load_words(config.wordpool.as_deref(), || Vocabulary::wordpool(language))?;
            let practice = load_words(config.practice_pool.as_deref(), || Vocabulary::practice(language))?;
            let generator =
                PalGenerator::with_vocabulary(config.lists, config.pairs, vocabulary, practice)?;
            let pools = generator.generate_n_session_pairs(&mut rng, config.sessions)?;
            ensure_unique(&pools)?;
            GeneratedPools::Pal(assign_types(&mut rng, &config, pools)?)
        }
        Task::Fr => {
            let vocabulary = load_words(config.wordpool.as_deref(), || Vocabulary::wordpool(language))?;
            let practice = load_words(config.practice_pool.as_deref(), || Vocabulary::practice(language))?;
            let generator = FrGenerator::with_vocabulary(
                config.words_per_list,
                config.lists,
                vocabulary,
                practice,
            )?;
            let pools = (0..config.sessions)
                .map(|_| generator.generate_session_pool(&mut rng))
                .collect::<ram_listgen::Result<Vec<_>>>()?;
            GeneratedPools::Fr(assign_types(&mut rng, &config, pools)?)
        }
        Task::CatFr => {
            let generator = catfr.context("catfr generator not built")?;
            let pools = (0..config.sessions)
                .map(|_| generator.generate_session_pool(&mut rng))
                .collect::<ram_listgen::Result<Vec<_>>>()?;
            GeneratedPools::CatFr(assign_types(&mut rng, &config, pools)?)
        }
    };

    write_pools(&pools, config.format, config.output.as_deref())?;
    info!(
        "Wrote {} {:?} session(s) to {}",
        pools.session_count(),
        pools.task(),
        config
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string())
    );

    Ok(())
}
