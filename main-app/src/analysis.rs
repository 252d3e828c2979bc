// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.


use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Serialize,Deserialize};
use elections::metrics::Bloc;

/// Which parties, blocs and head to head contests a comparison reports on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisPreset {
    /// The main parties of the Comunidad de Madrid.
    Madrid,
}

impl FromStr for AnalysisPreset {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Madrid" => Ok(AnalysisPreset::Madrid),
            _ => Err("No such analysis preset supported")
        }
    }
}

impl Display for AnalysisPreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnalysisPreset::Madrid => "Madrid",
        };
        f.write_str(s)
    }
}

impl AnalysisPreset {
    pub fn parties(&self) -> Vec<String> {
        match self {
            AnalysisPreset::Madrid => ["pp","psoe","cs","mas_madrid","vox","podemos_iu"].iter().map(|s|s.to_string()).collect(),
        }
    }

    pub fn blocs(&self) -> Vec<Bloc> {
        match self {
            AnalysisPreset::Madrid => vec![
                Bloc::new("right",&["pp","cs","vox"]),
                Bloc::new("left",&["psoe","mas_madrid","podemos_iu"]),
                Bloc::new("pp_psoe",&["pp","psoe"]),
                Bloc::new("otros_partidos",&["cs","mas_madrid","podemos_iu","vox"]),
            ],
        }
    }

    /// The contests for which municipalities won are counted.
    pub fn pairs(&self) -> Vec<(Bloc,Bloc)> {
        match self {
            AnalysisPreset::Madrid => {
                let blocs = self.blocs();
                vec![
                    (Bloc::single("pp"),Bloc::single("psoe")),
                    (Bloc::single("pp"),Bloc::single("mas_madrid")),
                    (Bloc::single("mas_madrid"),Bloc::single("podemos_iu")),
                    (blocs[0].clone(),blocs[1].clone()),
                    (blocs[2].clone(),blocs[3].clone()),
                ]
            }
        }
    }
}
