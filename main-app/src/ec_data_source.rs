// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.


use std::fmt::{Display, Formatter};
use std::str::FromStr;
use elections::datasource_description::{ElectionResultsSource, ResultsLoader};
use elections::download::CacheDir;
use elpais::parse_elpais::ElPaisDataSource;

/// Municipal boundaries of the Comunidad de Madrid, with names in the `municipio` property.
pub const MADRID_BOUNDARIES : &str = "https://raw.githubusercontent.com/FMullor/TopoJson/master/MadridMunicipios.geojson";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResultsProvider {
    ElPais,
}

impl FromStr for ResultsProvider {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ElPais" => Ok(ResultsProvider::ElPais),
            _ => Err("No such results provider supported")
        }
    }
}

impl Display for ResultsProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResultsProvider::ElPais => "ElPais",
        };
        f.write_str(s)
    }
}

impl ResultsProvider {
    pub fn source(&self) -> Box<dyn ElectionResultsSource> {
        match self {
            ResultsProvider::ElPais => Box::new(ElPaisDataSource{}),
        }
    }

    pub fn loader(&self,year:&str,cache:&CacheDir) -> anyhow::Result<Box<dyn ResultsLoader>> {
        self.source().get_loader_for_year(year,cache)
    }

    /// The boundary file and name property that go with this provider's region.
    pub fn default_boundaries(&self) -> (&'static str,&'static str) {
        match self {
            ResultsProvider::ElPais => (MADRID_BOUNDARIES,"municipio"),
        }
    }
}
