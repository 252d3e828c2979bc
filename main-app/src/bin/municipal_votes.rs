// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.


//! Scrape municipal election results, join them to boundaries, and compare elections.

use std::path::PathBuf;
use std::time::Duration;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use elections::download::{CacheDir, RetryPolicy};
use elections::geo_join::NameCorrections;
use elections::metrics::Bloc;
use main_app::analysis::AnalysisPreset;
use main_app::ec_data_source::ResultsProvider;
use main_app::pipeline::{compare_years, scrape_year, PipelineOptions, YearResult};

#[derive(Parser)]
#[command(version, author = "Andrew Conway", name="municipal_votes")]
/// Download per municipality election results, clean them, attach municipal boundaries,
/// and produce CSV, GeoJSON and comparison reports.
struct Opts {
    /// Where the results come from. Currently supported ElPais
    #[arg(long, default_value = "ElPais")]
    provider : ResultsProvider,

    /// Directory in which downloaded pages are kept, so that reruns do not download them again.
    #[arg(long, default_value = "cache")]
    cache : PathBuf,

    /// Directory to write CSV, GeoJSON and JSON output to.
    #[arg(short, long, default_value = "out")]
    out : PathBuf,

    /// A url or local file of municipal boundaries in GeoJSON. Defaults to the provider's region.
    #[arg(long)]
    boundaries : Option<String>,

    /// The boundary feature property holding the municipality name. Defaults to the provider's region.
    #[arg(long)]
    name_property : Option<String>,

    /// Fail rather than warn if a municipality is missing, cannot be read, or has no boundary.
    #[arg(long)]
    strict : bool,

    /// The number of times to try a download before giving up.
    #[arg(long, default_value_t = 3)]
    retry_attempts : u32,

    /// Seconds to wait after the first failed download. Doubles after each further failure.
    #[arg(long, default_value_t = 2)]
    retry_backoff : u64,

    #[command(subcommand)]
    command : Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape one election and write `{year}.csv` and `{year}.geojson`.
    Scrape {
        year : String,
    },
    /// Scrape two elections, write both with vote share columns added, and report how they differ.
    Compare {
        earlier : String,
        later : String,
        /// The parties, blocs and head to head contests to report on. Currently supported Madrid
        #[arg(long, default_value = "Madrid")]
        preset : AnalysisPreset,
        /// An additional bloc to report on, written as name=party+party. May be used multiple times.
        #[arg(long, value_parser = main_app::try_parse_bloc)]
        bloc : Vec<Bloc>,
    },
    /// List the years the provider has results for.
    Years,
}

fn report_year(result:&YearResult) {
    info!(year=%result.dataset.year,municipalities=result.dataset.rows.len(),columns=result.dataset.columns.len(),"scraped");
    for failure in &result.failures {
        warn!(year=%result.dataset.year,municipality=%failure.municipality,reason=%failure.reason,"municipality missing from output");
    }
    if !result.geo_report.renamed.is_empty() { info!(renamed=?result.geo_report.renamed,"boundary names corrected"); }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_|EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let opt : Opts = Opts::parse();
    let (default_boundaries,default_name_property) = opt.provider.default_boundaries();
    let options = PipelineOptions{
        out_dir: opt.out.clone(),
        boundaries: opt.boundaries.clone().unwrap_or_else(||default_boundaries.to_string()),
        name_property: opt.name_property.clone().unwrap_or_else(||default_name_property.to_string()),
        corrections: NameCorrections::default(),
        strict: opt.strict,
    };
    let retry = RetryPolicy{ attempts: opt.retry_attempts.max(1), initial_backoff: Duration::from_secs(opt.retry_backoff) };
    let cache = CacheDir::new(&opt.cache)?.with_retry(retry);

    match &opt.command {
        Command::Years => {
            for year in opt.provider.source().years() { println!("{}",year); }
        }
        Command::Scrape { year } => {
            let result = scrape_year(opt.provider,year,&cache,&options)?;
            report_year(&result);
        }
        Command::Compare { earlier, later, preset, bloc } => {
            let comparison = compare_years(opt.provider,earlier,later,*preset,bloc,&cache,&options)?;
            print!("{}",comparison);
        }
    }
    Ok(())
}
