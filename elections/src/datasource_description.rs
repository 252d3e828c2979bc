// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.


//! A description of results publishers that are known about, and the generic scraping pipeline over them.

use std::borrow::Cow;
use serde::{Deserialize,Serialize};
use tracing::{info, warn};
use crate::assemble::{assemble_dataset, DatasetError, ElectionDataset};
use crate::download::CacheDir;
use crate::municipality::{MunicipalityLink, RawMunicipalityTables};
use crate::normalize::normalize_municipality;

pub trait ElectionResultsSource {
    /// the name of the election. E.g. "Comunidad de Madrid regional"
    fn name(&self) -> Cow<'static, str>;
    /// the name of the organization publishing the results.
    fn publisher_name(&self) -> Cow<'static, str>;
    /// the url of the publisher.
    fn publisher_url(&self) -> Cow<'static, str>;
    /// the years that it works for
    fn years(&self) -> Vec<String>;
    /// something that will load data given a year from the above list.
    fn get_loader_for_year(&self,year:&str,cache:&CacheDir) -> anyhow::Result<Box<dyn ResultsLoader>>;
}

/// A municipality whose results could not be extracted.
#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct ExtractionFailure {
    pub municipality : String,
    pub reason : String,
}

/// The raw tables of every municipality that could be read, and what went wrong with the rest.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct ScrapeOutcome {
    pub tables : Vec<RawMunicipalityTables>,
    pub failures : Vec<ExtractionFailure>,
}

/// A dataset ready for joining, plus the checks that were run on it.
#[derive(Debug,Clone)]
pub struct LoadedElection {
    pub dataset : ElectionDataset,
    pub failures : Vec<ExtractionFailure>,
    /// the result of comparing the number of rows to the region's known number of municipalities.
    pub count_check : Result<(),DatasetError>,
}

impl LoadedElection {
    /// In strict mode any failed municipality or count mismatch is an error; otherwise they have already been logged.
    pub fn check(&self,strict:bool) -> anyhow::Result<()> {
        if strict {
            if let Some(failure) = self.failures.first() {
                return Err(anyhow::anyhow!("{} municipalities could not be read, starting with {}: {}",self.failures.len(),failure.municipality,failure.reason));
            }
            self.count_check.clone()?;
        }
        Ok(())
    }
}

/// Add the manual override links to those found on the index page.
/// An override whose name is already in the index is ignored with a warning. Repeated names in the index keep the first.
pub fn merge_overrides(links:Vec<MunicipalityLink>,overrides:&[MunicipalityLink]) -> Vec<MunicipalityLink> {
    let mut res : Vec<MunicipalityLink> = vec![];
    for link in links {
        if res.iter().any(|l|l.name==link.name) { warn!(municipality=%link.name,url=%link.detail_url,"municipality listed twice in index; ignoring second"); }
        else { res.push(link); }
    }
    for o in overrides {
        match res.iter().find(|l|l.name==o.name) {
            Some(existing) => {
                warn!(municipality=%o.name,index=%existing.detail_url,ignored=%o.detail_url,"municipality already in index; ignoring override");
            }
            None => {
                info!(municipality=%o.name,url=%o.detail_url,"adding municipality missing from index");
                res.push(o.clone());
            }
        }
    }
    res
}

/// Something that can get the results of one election, one municipality at a time.
pub trait ResultsLoader {
    fn year(&self) -> String;
    /// the page listing all municipalities.
    fn index_url(&self) -> String;
    /// how many municipalities the region has.
    fn expected_municipalities(&self) -> usize;
    /// municipalities missing from (or wrong in) the index, with their correct pages.
    fn manual_overrides(&self) -> Vec<MunicipalityLink> { vec![] }
    /// the municipalities linked from the index page, in page order.
    fn read_municipality_links(&self) -> anyhow::Result<Vec<MunicipalityLink>>;
    /// the raw tables from one municipality's page.
    fn read_municipality_tables(&self,link:&MunicipalityLink) -> anyhow::Result<RawMunicipalityTables>;

    /// The index links with the manual overrides merged in.
    fn all_municipality_links(&self) -> anyhow::Result<Vec<MunicipalityLink>> {
        Ok(merge_overrides(self.read_municipality_links()?,&self.manual_overrides()))
    }

    /// Read every municipality's page. A page that cannot be read is recorded as a failure and does not stop the others.
    fn scrape(&self) -> anyhow::Result<ScrapeOutcome> {
        let links = self.all_municipality_links()?;
        info!(year=%self.year(),municipalities=links.len(),"scraping municipality pages");
        let mut tables = vec![];
        let mut failures = vec![];
        for link in &links {
            match self.read_municipality_tables(link) {
                Ok(t) => tables.push(t),
                Err(e) => {
                    warn!(year=%self.year(),municipality=%link.name,url=%link.detail_url,error=%format!("{:#}",e),"could not read municipality");
                    failures.push(ExtractionFailure{ municipality: link.name.clone(), reason: format!("{:#}",e) });
                }
            }
        }
        Ok(ScrapeOutcome{ tables, failures })
    }

    /// Scrape, normalize and assemble the election, and check the municipality count.
    fn load_dataset(&self) -> anyhow::Result<LoadedElection> {
        let outcome = self.scrape()?;
        let normalized : Vec<_> = outcome.tables.iter().map(normalize_municipality).collect();
        let dataset = assemble_dataset(&self.year(),&normalized);
        let count_check = dataset.check_municipality_count(self.expected_municipalities());
        if let Err(e) = &count_check { warn!(year=%self.year(),"{}",e); }
        info!(year=%self.year(),rows=dataset.rows.len(),columns=dataset.columns.len(),"assembled dataset");
        Ok(LoadedElection{ dataset, failures: outcome.failures, count_check })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides() {
        let links = vec![
            MunicipalityLink::new("Madrid","https://example.com/79.html"),
            MunicipalityLink::new("Ajalvir","https://example.com/02.html"),
            MunicipalityLink::new("Madrid","https://example.com/79b.html"),
        ];
        let overrides = vec![
            MunicipalityLink::new("La Acebeda","https://example.com/01.html"),
            MunicipalityLink::new("Ajalvir","https://example.com/02b.html"),
        ];
        let merged = merge_overrides(links,&overrides);
        assert_eq!(merged,vec![
            MunicipalityLink::new("Madrid","https://example.com/79.html"),
            MunicipalityLink::new("Ajalvir","https://example.com/02.html"),
            MunicipalityLink::new("La Acebeda","https://example.com/01.html"),
        ]);
    }

    #[test]
    fn test_strict_check() {
        let loaded = LoadedElection{
            dataset: ElectionDataset{ year: "2019".to_string(), columns: vec![], rows: vec![] },
            failures: vec![],
            count_check: Err(DatasetError::MunicipalityCountMismatch{ expected: 179, found: 0 }),
        };
        assert!(loaded.check(false).is_ok());
        assert!(loaded.check(true).is_err());
    }
}
