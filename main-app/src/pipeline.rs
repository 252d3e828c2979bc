// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! The steps from a results source and a boundary file to saved files and comparisons.

use std::path::PathBuf;
use anyhow::Context;
use tracing::info;
use elections::assemble::ElectionDataset;
use elections::datasource_description::{ExtractionFailure, ResultsLoader};
use elections::download::CacheDir;
use elections::export::{save_dataset, write_json_file};
use elections::metrics::{with_share_columns, Bloc};
use elections::geo_join::{join_geometry, parse_boundaries_geojson, Boundary, GeoJoinReport, NameCorrections};
use elections::parse_util::read_local_or_remote;
use elections::report::ElectionComparison;
use crate::analysis::AnalysisPreset;
use crate::ec_data_source::ResultsProvider;

pub struct PipelineOptions {
    pub out_dir : PathBuf,
    /// a url or local path of a GeoJSON file.
    pub boundaries : String,
    /// the feature property holding the municipality name.
    pub name_property : String,
    pub corrections : NameCorrections,
    /// treat missing municipalities, failed pages and unmatched boundaries as errors.
    pub strict : bool,
}

/// One election, scraped and joined.
pub struct YearResult {
    pub dataset : ElectionDataset,
    pub failures : Vec<ExtractionFailure>,
    pub geo_report : GeoJoinReport,
}

pub fn load_boundaries(options:&PipelineOptions,cache:&CacheDir) -> anyhow::Result<Vec<Boundary>> {
    let text = read_local_or_remote(&options.boundaries,cache)?;
    parse_boundaries_geojson(&text,&options.name_property).with_context(||format!("Could not read boundaries from {}",options.boundaries))
}

/// Load, check and join one election. Nothing is written.
pub fn process_year(loader:&dyn ResultsLoader,boundaries:Vec<Boundary>,options:&PipelineOptions) -> anyhow::Result<YearResult> {
    let loaded = loader.load_dataset()?;
    loaded.check(options.strict)?;
    let (dataset,geo_report) = join_geometry(loaded.dataset,boundaries,&options.corrections,options.strict)?;
    info!(year=%dataset.year,matched=geo_report.matched,unmatched=geo_report.unmatched_municipalities.len(),duplicates=geo_report.duplicates_removed.len(),"joined boundaries");
    Ok(YearResult{ dataset, failures: loaded.failures, geo_report })
}

fn load_year(provider:ResultsProvider,year:&str,cache:&CacheDir,options:&PipelineOptions) -> anyhow::Result<YearResult> {
    let loader = provider.loader(year,cache)?;
    let boundaries = load_boundaries(options,cache)?;
    process_year(loader.as_ref(),boundaries,options)
}

/// Process one year and write its CSV and GeoJSON files.
pub fn scrape_year(provider:ResultsProvider,year:&str,cache:&CacheDir,options:&PipelineOptions) -> anyhow::Result<YearResult> {
    let result = load_year(provider,year,cache,options)?;
    save_dataset(&result.dataset,&options.out_dir)?;
    Ok(result)
}

/// Add share columns for the preset's parties and blocs and the extra blocs, and for each of the preset's pairs.
pub fn add_share_columns(dataset:ElectionDataset,preset:AnalysisPreset,extra_blocs:&[Bloc]) -> anyhow::Result<ElectionDataset> {
    let mut blocs : Vec<Bloc> = preset.parties().iter().map(|p|Bloc::single(p)).collect();
    blocs.extend(preset.blocs());
    blocs.extend(extra_blocs.iter().cloned());
    let year = dataset.year.clone();
    with_share_columns(dataset,&blocs,&preset.pairs()).with_context(||format!("Could not compute vote shares for {}",year))
}

/// Process both years, and write the comparison to `comparison_{earlier}_{later}.json`.
/// `extra_blocs` are reported as well as the preset's blocs.
/// Each year's CSV and GeoJSON files include the share columns.
pub fn compare_years(provider:ResultsProvider,earlier:&str,later:&str,preset:AnalysisPreset,extra_blocs:&[Bloc],cache:&CacheDir,options:&PipelineOptions) -> anyhow::Result<ElectionComparison> {
    let earlier = load_year(provider,earlier,cache,options)?;
    let later = load_year(provider,later,cache,options)?;
    let mut blocs = preset.blocs();
    blocs.extend(extra_blocs.iter().cloned());
    let comparison = ElectionComparison::compute(&earlier.dataset,&later.dataset,&preset.parties(),&blocs,&preset.pairs())?;
    for result in [earlier,later] {
        let dataset = add_share_columns(result.dataset,preset,extra_blocs)?;
        save_dataset(&dataset,&options.out_dir)?;
    }
    write_json_file(&comparison,&options.out_dir.join(format!("comparison_{}_{}.json",comparison.earlier_year,comparison.later_year)))?;
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use elections::municipality::{FieldValue, MunicipalityLink, RawMunicipalityTables, RawPartyRow, RawSummaryRow};
    use serde_json::json;

    struct TwoMunicipalities {}

    impl ResultsLoader for TwoMunicipalities {
        fn year(&self) -> String { "2021".to_string() }
        fn index_url(&self) -> String { "https://example.com/".to_string() }
        fn expected_municipalities(&self) -> usize { 2 }
        fn read_municipality_links(&self) -> anyhow::Result<Vec<MunicipalityLink>> {
            Ok(vec![MunicipalityLink::new("Madrid","https://example.com/79.html"),MunicipalityLink::new("Móstoles","https://example.com/92.html")])
        }
        fn read_municipality_tables(&self,link:&MunicipalityLink) -> anyhow::Result<RawMunicipalityTables> {
            Ok(RawMunicipalityTables{
                link: link.clone(),
                summary: vec![RawSummaryRow{ header: Some("Votos contabilizados:".to_string()), number: Some("1.000".to_string()), percentage: Some("70,00 %".to_string()) }],
                parties: vec![RawPartyRow{ party: Some("PP".to_string()), votes: Some("600".to_string()), percentage: Some("60,00 %".to_string()) }],
            })
        }
    }

    fn options(strict:bool) -> PipelineOptions {
        PipelineOptions{ out_dir: PathBuf::from("unused"), boundaries: "unused".to_string(), name_property: "municipio".to_string(), corrections: NameCorrections::default(), strict }
    }

    #[test]
    fn test_process_year() {
        let boundaries = vec![Boundary{ name: "MÃ³stoles".to_string(), geometry: json!({"type":"Point","coordinates":[0,0]}) }];
        let result = process_year(&TwoMunicipalities{},boundaries.clone(),&options(false)).unwrap();
        assert_eq!(result.dataset.rows.len(),2);
        assert!(result.failures.is_empty());
        assert_eq!(result.geo_report.matched,1);
        assert_eq!(result.geo_report.unmatched_municipalities,vec!["Madrid".to_string()]);
        assert!(result.dataset.find_row("Móstoles").unwrap().geometry.is_some());
        assert!(process_year(&TwoMunicipalities{},boundaries,&options(true)).is_err());
    }

    #[test]
    fn test_add_share_columns() {
        let result = process_year(&TwoMunicipalities{},vec![],&options(false)).unwrap();
        // the pages have pp and total votes only, so the Madrid preset's other parties are missing.
        assert!(add_share_columns(result.dataset.clone(),AnalysisPreset::Madrid,&[]).is_err());
        let mut dataset = result.dataset;
        for party in AnalysisPreset::Madrid.parties() {
            if dataset.column_index(&party).is_none() {
                dataset.columns.push(party);
                for row in &mut dataset.rows { row.values.push(None); }
            }
        }
        let extra = Bloc::new("pp_vox",&["pp","vox"]);
        let dataset = add_share_columns(dataset,AnalysisPreset::Madrid,&[extra]).unwrap();
        let madrid = dataset.find_row("Madrid").unwrap();
        assert_eq!(dataset.value(madrid,"pp_share"),Some(FieldValue::Percentage(60.0)));
        assert_eq!(dataset.value(madrid,"right_share"),Some(FieldValue::Percentage(60.0)));
        assert_eq!(dataset.value(madrid,"pp_vox_share"),Some(FieldValue::Percentage(60.0)));
        assert_eq!(dataset.value(madrid,"pp_share_of_pp_psoe"),Some(FieldValue::Percentage(100.0)));
        assert_eq!(dataset.value(madrid,"mas_madrid_share_of_mas_madrid_podemos_iu"),None);
        let geojson = elections::export::to_geojson(&dataset);
        let features = geojson["features"].as_array().unwrap();
        assert!(features.iter().all(|f|f["properties"]["pp_share"]==json!(60.0)));
    }
}
