// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! Per municipality election results: the data model, cleaning of scraped tables,
//! assembly into one row per municipality, joining with boundaries, and comparison statistics.
//! Source specific scraping lives in other crates that implement [datasource_description::ResultsLoader].

pub mod municipality;
pub mod normalize;
pub mod assemble;
pub mod geo_join;
pub mod metrics;
pub mod report;
pub mod format;
pub mod export;
pub mod util;
pub mod parse_util;
pub mod download;
pub mod datasource_description;
