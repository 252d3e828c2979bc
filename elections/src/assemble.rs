// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! Assemble normalized records into one wide row per municipality.
//!
//! Each table row of a results page becomes its own record, and the source html
//! sometimes splits a municipality's data over repeated table fragments, so a
//! municipality arrives as a group of partial records. A group is collapsed by taking,
//! for each column, the first non-null value in page order.

use std::collections::{BTreeMap, HashMap};
use serde::{Deserialize,Serialize};
use thiserror::Error;
use tracing::warn;
use crate::municipality::{FieldValue, NormalizedMunicipality, NormalizedRecord};
use crate::normalize::SummaryField;

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum DatasetError {
    #[error("Found {found} municipalities but the region has {expected}. Missing: a municipality may be absent from the source index or have failed to download.")]
    MunicipalityCountMismatch{ expected:usize, found:usize },
    #[error("No column {0} in the dataset")]
    NoSuchColumn(String),
    #[error("Column {column} holds a percentage rather than a vote count for {municipality}")]
    NotACount{ column:String, municipality:String },
}

/// One municipality's results. `values` is aligned with [ElectionDataset::columns].
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct MunicipalityRow {
    pub municipality : String,
    pub link : Option<String>,
    pub values : Vec<Option<FieldValue>>,
    #[serde(skip_serializing_if = "Option::is_none",default)]
    pub geometry : Option<serde_json::Value>,
}

/// All municipalities' results for one election.
/// Every row has a value (possibly null) for every column, so all rows share one key set.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct ElectionDataset {
    pub year : String,
    pub columns : Vec<String>,
    /// sorted by municipality name, one per municipality.
    pub rows : Vec<MunicipalityRow>,
}

impl ElectionDataset {
    pub fn column_index(&self,column:&str) -> Option<usize> {
        self.columns.iter().position(|c|c==column)
    }

    pub fn require_column(&self,column:&str) -> Result<usize,DatasetError> {
        self.column_index(column).ok_or_else(||DatasetError::NoSuchColumn(column.to_string()))
    }

    pub fn value(&self,row:&MunicipalityRow,column:&str) -> Option<FieldValue> {
        self.column_index(column).and_then(|i|row.values[i])
    }

    pub fn find_row(&self,municipality:&str) -> Option<&MunicipalityRow> {
        self.rows.iter().find(|r|r.municipality==municipality)
    }

    pub fn municipality_names(&self) -> Vec<String> {
        self.rows.iter().map(|r|r.municipality.clone()).collect()
    }

    /// Check the number of rows against the number of municipalities the region is known to have.
    pub fn check_municipality_count(&self,expected:usize) -> Result<(),DatasetError> {
        if self.rows.len()==expected { Ok(()) } else { Err(DatasetError::MunicipalityCountMismatch{ expected, found: self.rows.len() }) }
    }
}

/// One row per municipality from a single source table, before joining.
#[derive(Debug,Clone,Default,PartialEq)]
pub struct WideTable {
    /// in order of first appearance.
    pub columns : Vec<String>,
    /// municipality -> (link, values by column)
    pub rows : BTreeMap<String,(Option<String>,HashMap<String,FieldValue>)>,
}

impl WideTable {
    pub fn get(&self,municipality:&str,column:&str) -> Option<FieldValue> {
        self.rows.get(municipality).and_then(|(_,values)|values.get(column).copied())
    }
}

/// Group records by municipality and collapse each group to one row, taking the first non-null value of each column.
pub fn collapse_groups<'a>(records:impl IntoIterator<Item=&'a NormalizedRecord>) -> WideTable {
    let mut res = WideTable::default();
    for record in records {
        let (link,values) = res.rows.entry(record.municipality.clone()).or_insert_with(||(None,HashMap::new()));
        if link.is_none() && !record.link.is_empty() { *link=Some(record.link.clone()); }
        for (key,value) in &record.fields {
            if !res.columns.contains(key) { res.columns.push(key.clone()); }
            if let Some(value) = value { values.entry(key.clone()).or_insert(*value); }
        }
    }
    res
}

/// Full outer join of two tables on municipality. Columns of `first` come first.
/// A column appearing in both tables takes its value from `first` where present.
pub fn outer_join(year:&str,first:&WideTable,second:&WideTable) -> ElectionDataset {
    let mut columns = first.columns.clone();
    for c in &second.columns {
        if columns.contains(c) { warn!(column=%c,"column appears in both tables"); }
        else { columns.push(c.clone()); }
    }
    let mut names : Vec<&String> = first.rows.keys().chain(second.rows.keys()).collect();
    names.sort();
    names.dedup();
    let rows = names.into_iter().map(|name|{
        let link = first.rows.get(name).and_then(|(l,_)|l.clone()).or_else(||second.rows.get(name).and_then(|(l,_)|l.clone()));
        let values = columns.iter().map(|c|first.get(name,c).or_else(||second.get(name,c))).collect();
        MunicipalityRow{ municipality: name.clone(), link, values, geometry: None }
    }).collect();
    ElectionDataset{ year: year.to_string(), columns, rows }
}

/// Build the dataset for one election from every municipality's normalized records.
/// Party columns come first, in order of appearance, then the summary columns in their usual order.
pub fn assemble_dataset(year:&str,municipalities:&[NormalizedMunicipality]) -> ElectionDataset {
    let parties = collapse_groups(municipalities.iter().flat_map(|m|m.parties.iter()));
    let mut summary = collapse_groups(municipalities.iter().flat_map(|m|m.summary.iter()));
    let vocabulary = SummaryField::all_keys();
    summary.columns.sort_by_key(|c|vocabulary.iter().position(|v|v==c).unwrap_or(usize::MAX));
    outer_join(year,&parties,&summary)
}
