use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use reelmatch_core::config::{Config, Settings, SimilarityStrategy};
use reelmatch_core::loader::CorpusLoader;
use reelmatch_core::sample::sample_catalogue;
use reelmatch_core::source::open_source;
use reelmatch_core::traits::TableSource;
use reelmatch_enrich::TmdbProvider;
use reelmatch_hybrid::Recommender;

use crate::cli::{Cli, Commands};
use crate::output;

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    config.context("loading configuration")
}

fn effective_settings(cli: &Cli, config: &Config) -> anyhow::Result<Settings> {
    let mut settings = config.settings()?;
    if let Some(strategy) = &cli.strategy {
        settings.similarity.strategy = strategy.parse::<SimilarityStrategy>()?;
    }
    Ok(settings)
}

fn open_table_source(cli: &Cli, config: &Config) -> anyhow::Result<Box<dyn TableSource>> {
    let settings = config.settings()?;
    let path: Option<PathBuf> = match (&cli.data, cli.sample) {
        (_, true) => None,
        (Some(p), false) => Some(p.clone()),
        (None, false) => config.data_source_path()?,
    };
    config.check_data_source(path.as_deref())?;
    match path {
        Some(p) => Ok(open_source(&p, settings.data.format)),
        None => {
            if !cli.sample {
                warn!("no data.source configured, using the built-in sample catalogue");
            }
            Ok(Box::new(sample_catalogue()))
        }
    }
}

fn attach_enricher(recommender: Recommender, settings: &Settings) -> Recommender {
    match TmdbProvider::from_config(&settings.enrich) {
        Ok(provider) => recommender.with_enricher(Arc::new(provider)),
        Err(e) => {
            warn!(error = %e, "external lookups disabled");
            recommender
        }
    }
}

/// Execute one command, writing results to `out`.
pub async fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let settings = effective_settings(cli, &config)?;
    let source = open_table_source(cli, &config)?;
    let corpus = CorpusLoader::from_settings(&settings).load(source.as_ref())?;

    let mut recommender = Recommender::from_settings(&settings);
    let wants_external = match &cli.command {
        Commands::Recommend { enrich, .. } => *enrich || settings.enrich.enabled,
        Commands::External { .. } => true,
        Commands::Info | Commands::Titles { .. } => false,
    };
    if wants_external {
        recommender = attach_enricher(recommender, &settings);
    }
    let artifacts = recommender.load(corpus)?;
    info!(source = %source.describe(), items = artifacts.corpus().len(), "ready");

    match &cli.command {
        Commands::Recommend { title_or_id, k, enrich, json } => {
            let k = k.unwrap_or(settings.ranking.default_k);
            if *enrich || settings.enrich.enabled {
                let results = recommender.recommend_enriched(title_or_id, k).await?;
                if *json {
                    output::write_json(out, &results)?;
                } else {
                    output::enriched(out, title_or_id, &results)?;
                }
            } else {
                let results = recommender.recommend(title_or_id, k)?;
                if *json {
                    output::write_json(out, &results)?;
                } else {
                    output::recommendations(out, title_or_id, &results)?;
                }
            }
        }
        Commands::External { title_or_id, k, json } => {
            let k = k.unwrap_or(settings.ranking.default_k);
            let results = recommender.recommend_external(title_or_id, k).await?;
            if *json {
                output::write_json(out, &results)?;
            } else {
                output::external(out, title_or_id, &results)?;
            }
        }
        Commands::Info => {
            writeln!(out, "source:    {}", source.describe())?;
            writeln!(out, "items:     {}", artifacts.corpus().len())?;
            writeln!(out, "terms:     {}", artifacts.space().n_terms())?;
            writeln!(out, "nonzeros:  {}", artifacts.space().nnz())?;
            writeln!(out, "strategy:  {}", artifacts.strategy())?;
            writeln!(out, "key:       {}", artifacts.key())?;
        }
        Commands::Titles { limit } => {
            let items = artifacts.corpus().items();
            for item in items.iter().take(limit.unwrap_or(items.len())) {
                writeln!(out, "{:>5}  {:>8}  {}", item.position, item.id, item.title)?;
            }
        }
    }
    Ok(())
}
