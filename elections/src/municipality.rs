// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! Records describing one municipality's results, from raw scraped text to cleaned fields.

use std::fmt::{Display, Formatter};
use serde::{Deserialize,Serialize};

/// A municipality as listed on a results index page.
#[derive(Debug,Clone,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub struct MunicipalityLink {
    pub name : String,
    /// absolute url of the page with this municipality's results.
    pub detail_url : String,
}

impl MunicipalityLink {
    pub fn new(name:&str,detail_url:&str) -> Self {
        MunicipalityLink{ name: name.to_string(), detail_url: detail_url.to_string() }
    }
}

/// One row of the turnout/counting summary table, as text straight from the html.
/// Any cell may be missing.
#[derive(Debug,Clone,Default,PartialEq,Eq,Serialize,Deserialize)]
pub struct RawSummaryRow {
    /// e.g. `Votos nulos:`
    pub header : Option<String>,
    /// e.g. `1.234`
    pub number : Option<String>,
    /// e.g. `0,85 %`
    pub percentage : Option<String>,
}

/// One row of the party votes table, as text straight from the html.
#[derive(Debug,Clone,Default,PartialEq,Eq,Serialize,Deserialize)]
pub struct RawPartyRow {
    pub party : Option<String>,
    pub votes : Option<String>,
    pub percentage : Option<String>,
}

/// Everything scraped from one municipality's results page.
#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct RawMunicipalityTables {
    pub link : MunicipalityLink,
    pub summary : Vec<RawSummaryRow>,
    pub parties : Vec<RawPartyRow>,
}

/// A cleaned numeric cell. Counts stay integers; percentages are fractional, on a 0-100 scale.
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Count(u64),
    Percentage(f64),
}

impl FieldValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Count(n) => n as f64,
            FieldValue::Percentage(p) => p,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Count(n) => write!(f,"{}",n),
            // percentages always keep a fractional digit.
            FieldValue::Percentage(p) if p.is_finite() && p.fract()==0.0 => write!(f,"{:.1}",p),
            FieldValue::Percentage(p) => write!(f,"{}",p),
        }
    }
}

/// The cleaned fields extracted from one table row of one municipality.
/// Field names are canonical ascii snake case, e.g. `mas_madrid` and `mas_madrid_percentage`.
/// A field whose cell was missing or malformed is present with a `None` value.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct NormalizedRecord {
    pub municipality : String,
    pub link : String,
    pub fields : Vec<(String,Option<FieldValue>)>,
}

impl NormalizedRecord {
    pub fn new(link:&MunicipalityLink) -> Self {
        NormalizedRecord{ municipality: link.name.clone(), link: link.detail_url.clone(), fields: vec![] }
    }

    /// Set a field, replacing any existing value of the same name.
    pub fn set(&mut self,key:&str,value:Option<FieldValue>) {
        match self.fields.iter_mut().find(|(k,_)|k==key) {
            Some(existing) => existing.1=value,
            None => self.fields.push((key.to_string(),value)),
        }
    }

    pub fn get(&self,key:&str) -> Option<FieldValue> {
        self.fields.iter().find(|(k,_)|k==key).and_then(|(_,v)|*v)
    }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

/// The normalized records of one municipality, one list per source table.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct NormalizedMunicipality {
    pub summary : Vec<NormalizedRecord>,
    pub parties : Vec<NormalizedRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_field_value() {
        assert_eq!(FieldValue::Count(40).to_string(),"40");
        assert_eq!(FieldValue::Percentage(40.0).to_string(),"40.0");
        assert_eq!(FieldValue::Percentage(0.0).to_string(),"0.0");
        assert_eq!(FieldValue::Percentage(12.5).to_string(),"12.5");
        assert_eq!(FieldValue::Percentage(33.33).to_string(),"33.33");
    }
}
