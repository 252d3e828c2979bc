// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! This crate ties results sources, boundaries and analyses together.
//! It also contains the main binary.

use elections::metrics::Bloc;

pub mod analysis;
pub mod ec_data_source;
pub mod pipeline;

/// Utility that is helpful for parsing in clap a bloc written as `name=party+party+...`, or just `party`.
pub fn try_parse_bloc(s:&str) -> Result<Bloc,String> {
    let (name,parties) = match s.split_once('=') {
        Some((name,parties)) => (name.trim(),parties),
        None => (s.trim(),s),
    };
    let parties : Vec<&str> = parties.split('+').map(str::trim).collect();
    if name.is_empty() || parties.iter().any(|p|p.is_empty()) { return Err(format!("Could not understand bloc {}",s)); }
    Ok(Bloc::new(name,&parties))
}
