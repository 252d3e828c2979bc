// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! Turn the locale formatted text of scraped table cells into numbers, and party names into column names.
//!
//! The results pages use Spanish number formatting: `1.234.567` for a count and `12,34 %` for a percentage.
//! Nothing else is accepted. A cell with any other shape is reported and becomes a null field
//! rather than being guessed at.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use crate::municipality::{FieldValue, MunicipalityLink, NormalizedMunicipality, NormalizedRecord, RawMunicipalityTables, RawPartyRow, RawSummaryRow};
use crate::parse_util::merge_whitespace_to_space;

static PERCENTAGE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(,\d+)?$").unwrap());
static COUNT_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,3}(\.\d{3})+|\d+)$").unwrap());

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum NormalizeError {
    #[error("Value {0:?} is neither a percentage like `12,34 %` nor a count like `1.234.567`")]
    UnrecognizedShape(String),
    #[error("Expected a vote count but found the percentage {0:?}")]
    ExpectedCount(String),
    #[error("Expected a percentage but found the count {0:?}")]
    ExpectedPercentage(String),
    #[error("Count {0:?} is too large")]
    CountOutOfRange(String),
}

/// Clean a locale formatted number.
///
/// A value containing `%` has it removed and the decimal comma changed to a point.
/// Anything else must be a count, and has its thousands separators removed.
///
/// ```
/// use elections::normalize::clean_numeric_text;
/// assert_eq!(clean_numeric_text("12,34 %").unwrap(),"12.34");
/// assert_eq!(clean_numeric_text("1.234.567").unwrap(),"1234567");
/// assert!(clean_numeric_text("1,234").is_err());
/// ```
pub fn clean_numeric_text(raw:&str) -> Result<String,NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.contains('%') {
        let number = trimmed.strip_suffix('%').map(str::trim).ok_or_else(||NormalizeError::UnrecognizedShape(raw.to_string()))?;
        if PERCENTAGE_SHAPE.is_match(number) { Ok(number.replace(',',".")) } else { Err(NormalizeError::UnrecognizedShape(raw.to_string())) }
    } else if COUNT_SHAPE.is_match(trimmed) {
        Ok(trimmed.replace('.',""))
    } else { Err(NormalizeError::UnrecognizedShape(raw.to_string())) }
}

/// Clean a number and convert it to the appropriate kind of value.
pub fn parse_field_value(raw:&str) -> Result<FieldValue,NormalizeError> {
    let cleaned = clean_numeric_text(raw)?;
    if raw.contains('%') {
        // shape already checked, so this can only fail on absurd lengths.
        cleaned.parse::<f64>().map(FieldValue::Percentage).map_err(|_|NormalizeError::UnrecognizedShape(raw.to_string()))
    } else {
        cleaned.parse::<u64>().map(FieldValue::Count).map_err(|_|NormalizeError::CountOutOfRange(raw.to_string()))
    }
}

/// Parse something that has to be a vote count.
pub fn parse_count(raw:&str) -> Result<FieldValue,NormalizeError> {
    match parse_field_value(raw)? {
        FieldValue::Percentage(_) => Err(NormalizeError::ExpectedCount(raw.to_string())),
        count => Ok(count),
    }
}

/// Parse something that has to be a percentage.
pub fn parse_percentage(raw:&str) -> Result<FieldValue,NormalizeError> {
    match parse_field_value(raw)? {
        FieldValue::Count(_) => Err(NormalizeError::ExpectedPercentage(raw.to_string())),
        percentage => Ok(percentage),
    }
}

/// Convert a party name into a column name: lower case, `_` instead of spaces and hyphens, no accents.
/// Applying it to its own output changes nothing.
///
/// ```
/// use elections::normalize::canonical_key;
/// assert_eq!(canonical_key("Más Madrid"),"mas_madrid");
/// assert_eq!(canonical_key("Podemos-IU"),"podemos_iu");
/// assert_eq!(canonical_key("mas_madrid"),"mas_madrid");
/// ```
pub fn canonical_key(name:&str) -> String {
    merge_whitespace_to_space(name)
        .to_lowercase()
        .replace(|c:char|c=='-'||c==' ',"_")
        .nfd()
        .filter(|c|!is_combining_mark(*c))
        .filter(char::is_ascii)
        .collect()
}

/// The rows of the summary table that are understood.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SummaryField {
    /// Percentage of polling stations counted.
    Counted,
    TotalVotes,
    Abstention,
    NullVotes,
    BlankVotes,
}

impl SummaryField {
    pub const ALL : [SummaryField;5] = [SummaryField::Counted,SummaryField::TotalVotes,SummaryField::Abstention,SummaryField::NullVotes,SummaryField::BlankVotes];

    /// Identify a row of the summary table by its header text, e.g. `Votos nulos:`
    pub fn from_header(header:&str) -> Option<SummaryField> {
        match merge_whitespace_to_space(header).trim_end_matches(':').trim() {
            "Escrutado" => Some(SummaryField::Counted),
            "Votos contabilizados" => Some(SummaryField::TotalVotes),
            "Abstenciones" => Some(SummaryField::Abstention),
            "Votos nulos" => Some(SummaryField::NullVotes),
            "Votos en blanco" => Some(SummaryField::BlankVotes),
            _ => None,
        }
    }

    /// The column holding the number of votes, if this row has one.
    pub fn count_key(self) -> Option<&'static str> {
        match self {
            SummaryField::Counted => None,
            SummaryField::TotalVotes => Some("total_votes"),
            SummaryField::Abstention => Some("abstention"),
            SummaryField::NullVotes => Some("null_votes"),
            SummaryField::BlankVotes => Some("blank_votes"),
        }
    }

    pub fn percentage_key(self) -> &'static str {
        match self {
            SummaryField::Counted => "counted_percentage",
            SummaryField::TotalVotes => "total_votes_percentage",
            SummaryField::Abstention => "abstention_percentage",
            SummaryField::NullVotes => "null_votes_percentage",
            SummaryField::BlankVotes => "blank_votes_percentage",
        }
    }

    /// All summary columns, in the order they are presented.
    pub fn all_keys() -> Vec<&'static str> {
        Self::ALL.iter().flat_map(|f|f.count_key().into_iter().chain(std::iter::once(f.percentage_key()))).collect()
    }
}

/// Name of the column holding a party's percentage of the vote.
pub fn percentage_key(party_key:&str) -> String { format!("{}_percentage",party_key) }

/// Clean one cell. Missing or malformed cells become `None`; malformed ones are logged.
fn clean_cell(cell:&Option<String>,parse:fn(&str)->Result<FieldValue,NormalizeError>,municipality:&str,key:&str) -> Option<FieldValue> {
    match cell {
        None => {
            debug!(municipality,key,"missing cell");
            None
        }
        Some(text) => match parse(text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(municipality,key,error=%e,"malformed cell, treating as null");
                None
            }
        }
    }
}

/// Normalize the rows of the summary table. Rows whose header is absent or not understood are skipped.
pub fn normalize_summary_rows(link:&MunicipalityLink,rows:&[RawSummaryRow]) -> Vec<NormalizedRecord> {
    let mut res = vec![];
    for row in rows {
        let Some(header) = &row.header else { continue };
        let Some(field) = SummaryField::from_header(header) else {
            debug!(municipality=%link.name,header=%header,"ignoring unknown summary row");
            continue;
        };
        let mut record = NormalizedRecord::new(link);
        if let Some(count_key) = field.count_key() {
            record.set(count_key,clean_cell(&row.number,parse_count,&link.name,count_key));
        }
        record.set(field.percentage_key(),clean_cell(&row.percentage,parse_percentage,&link.name,field.percentage_key()));
        res.push(record);
    }
    res
}

/// Normalize the rows of the party table. Rows without a party name are skipped.
pub fn normalize_party_rows(link:&MunicipalityLink,rows:&[RawPartyRow]) -> Vec<NormalizedRecord> {
    let mut res = vec![];
    for row in rows {
        let Some(party) = &row.party else { continue };
        let key = canonical_key(party);
        if key.is_empty() {
            warn!(municipality=%link.name,party=%party,"party name has no usable characters, skipping row");
            continue;
        }
        let mut record = NormalizedRecord::new(link);
        record.set(&key,clean_cell(&row.votes,parse_count,&link.name,&key));
        let pkey = percentage_key(&key);
        record.set(&pkey,clean_cell(&row.percentage,parse_percentage,&link.name,&pkey));
        res.push(record);
    }
    res
}

pub fn normalize_municipality(tables:&RawMunicipalityTables) -> NormalizedMunicipality {
    NormalizedMunicipality {
        summary: normalize_summary_rows(&tables.link,&tables.summary),
        parties: normalize_party_rows(&tables.link,&tables.parties),
    }
}
