// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! Attach boundary polygons to municipalities by name.
//!
//! Boundary files are third party and their names do not line up exactly with the
//! results pages. Names are first repaired (utf-8 that was decoded as Latin-1 somewhere
//! along the way), then put through a table of known renames, then duplicates are
//! removed, and only then is the join done. Geometry is kept as opaque GeoJSON.

use std::borrow::Cow;
use std::collections::HashMap;
use anyhow::anyhow;
use encoding_rs::WINDOWS_1252;
use serde::{Deserialize,Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use crate::assemble::ElectionDataset;
use crate::util::{sorted_difference, sorted_repeats, DetectUnique};

/// A municipality's outline, from an external boundary file.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Boundary {
    pub name : String,
    /// A GeoJSON geometry object.
    pub geometry : serde_json::Value,
}

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum GeoJoinError {
    #[error("{1} boundaries are named {0} but their geometries differ. This needs a human to decide which is right.")]
    ConflictingDuplicateBoundary(String,usize),
    #[error("No boundary found for municipalities {0:?}")]
    UnmatchedMunicipalities(Vec<String>),
}

/// What happened during a join, for the log and for checking.
#[derive(Debug,Clone,Default,PartialEq,Eq,Serialize,Deserialize)]
pub struct GeoJoinReport {
    /// number of municipalities that got a geometry.
    pub matched : usize,
    /// municipalities left without a geometry.
    pub unmatched_municipalities : Vec<String>,
    /// boundary names that no municipality used.
    pub unused_boundaries : Vec<String>,
    /// names that had identical duplicate boundaries, of which all but the first were dropped.
    pub duplicates_removed : Vec<String>,
    /// (original, corrected) boundary names.
    pub renamed : Vec<(String,String)>,
}

/// Read a GeoJSON FeatureCollection, taking each feature's name from the given property.
pub fn parse_boundaries_geojson(text:&str,name_property:&str) -> anyhow::Result<Vec<Boundary>> {
    let json : serde_json::Value = serde_json::from_str(text)?;
    let features = json.get("features").and_then(|f|f.as_array()).ok_or_else(||anyhow!("Boundary file is not a GeoJSON FeatureCollection"))?;
    let mut res = vec![];
    for (index,feature) in features.iter().enumerate() {
        let name = feature.get("properties").and_then(|p|p.get(name_property)).and_then(|n|n.as_str())
            .ok_or_else(||anyhow!("Feature {} has no string property {}",index,name_property))?;
        let geometry = feature.get("geometry").cloned().unwrap_or(serde_json::Value::Null);
        res.push(Boundary{ name: name.to_string(), geometry });
    }
    Ok(res)
}

/// Undo utf-8 text having been decoded as Latin-1 or Windows-1252, e.g. `MÃ³stoles` to `Móstoles`.
/// Names that are not such mis-decodings are returned unchanged.
pub fn repair_mojibake(name:&str) -> Cow<'_,str> {
    if name.is_ascii() { return Cow::Borrowed(name); }
    let latin1 : Option<Vec<u8>> = name.chars().map(|c|u8::try_from(u32::from(c)).ok()).collect();
    let bytes = match latin1 {
        Some(bytes) => bytes,
        None => {
            let (encoded,_,unmappable) = WINDOWS_1252.encode(name);
            if unmappable { return Cow::Borrowed(name); }
            encoded.into_owned()
        }
    };
    match String::from_utf8(bytes) {
        Ok(repaired) if repaired!=name => Cow::Owned(repaired),
        _ => Cow::Borrowed(name),
    }
}

/// Known differences between boundary file names and results page names.
#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct NameCorrections {
    /// (name in boundary file, name used by the results)
    pub corrections : Vec<(String,String)>,
}

impl Default for NameCorrections {
    /// The corrections needed for the Comunidad de Madrid boundary file against El País results.
    fn default() -> Self {
        NameCorrections::new(&[
            ("Horcajo de la Sierra","Horcajo de la Sierra-Aoslos"),
        ])
    }
}

impl NameCorrections {
    pub fn new(corrections:&[(&str,&str)]) -> Self {
        NameCorrections{ corrections: corrections.iter().map(|(from,to)|(from.to_string(),to.to_string())).collect() }
    }
    pub fn none() -> Self { NameCorrections{ corrections: vec![] } }

    /// Repair encoding, then apply the rename table.
    pub fn apply(&self,name:&str) -> String {
        let repaired = repair_mojibake(name);
        match self.corrections.iter().find(|(from,_)|from.as_str()==repaired.as_ref()) {
            Some((_,to)) => to.clone(),
            None => repaired.into_owned(),
        }
    }
}

/// Apply name corrections to all boundaries, recording what changed.
pub fn reconcile_boundary_names(boundaries:Vec<Boundary>,corrections:&NameCorrections) -> (Vec<Boundary>,Vec<(String,String)>) {
    let mut renamed = vec![];
    let boundaries = boundaries.into_iter().map(|b|{
        let name = corrections.apply(&b.name);
        if name!=b.name {
            debug!(from=%b.name,to=%name,"renamed boundary");
            renamed.push((b.name.clone(),name.clone()));
        }
        Boundary{ name, geometry: b.geometry }
    }).collect();
    (boundaries,renamed)
}

/// Remove boundaries that repeat a name. This is only done when the geometries are identical;
/// different geometries under one name is an error. Returns the surviving boundaries (first of each name,
/// original order) and the names that had duplicates.
pub fn deduplicate_boundaries(boundaries:Vec<Boundary>) -> Result<(Vec<Boundary>,Vec<String>),GeoJoinError> {
    let duplicates = sorted_repeats(boundaries.iter().map(|b|&b.name));
    for name in &duplicates {
        let mut geometry = DetectUnique::default();
        let mut count = 0;
        for b in boundaries.iter().filter(|b|&b.name==name) {
            geometry.add(&b.geometry);
            count+=1;
        }
        if geometry.seen_multiple() { return Err(GeoJoinError::ConflictingDuplicateBoundary(name.clone(),count)); }
    }
    let mut kept : Vec<Boundary> = vec![];
    for b in boundaries {
        if !kept.iter().any(|k|k.name==b.name) { kept.push(b); }
    }
    Ok((kept,duplicates))
}

/// Left join of the dataset to the boundaries by exact name, after reconciling and deduplicating the boundaries.
/// Municipalities without a boundary keep a null geometry and are listed in the report; if `strict` is set they are an error instead.
pub fn join_geometry(mut dataset:ElectionDataset,boundaries:Vec<Boundary>,corrections:&NameCorrections,strict:bool) -> Result<(ElectionDataset,GeoJoinReport),GeoJoinError> {
    let (boundaries,renamed) = reconcile_boundary_names(boundaries,corrections);
    let (boundaries,duplicates_removed) = deduplicate_boundaries(boundaries)?;
    let by_name : HashMap<&str,&serde_json::Value> = boundaries.iter().map(|b|(b.name.as_str(),&b.geometry)).collect();
    let mut matched = 0;
    for row in &mut dataset.rows {
        row.geometry = by_name.get(row.municipality.as_str()).map(|g|(*g).clone());
        if row.geometry.is_some() { matched+=1; }
    }
    let names = dataset.municipality_names();
    let boundary_names : Vec<String> = boundaries.iter().map(|b|b.name.clone()).collect();
    let unmatched_municipalities = sorted_difference(&names,&boundary_names);
    let unused_boundaries = sorted_difference(&boundary_names,&names);
    if !unmatched_municipalities.is_empty() {
        if strict { return Err(GeoJoinError::UnmatchedMunicipalities(unmatched_municipalities)); }
        warn!(year=%dataset.year,municipalities=?unmatched_municipalities,"municipalities without boundaries will have no geometry");
    }
    if !unused_boundaries.is_empty() { info!(year=%dataset.year,boundaries=?unused_boundaries,"boundaries not matching any municipality"); }
    let report = GeoJoinReport{ matched, unmatched_municipalities, unused_boundaries, duplicates_removed, renamed };
    Ok((dataset,report))
}
