// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! A comparison of two elections, as data and as a text report.

use std::fmt::{Display, Formatter};
use serde::{Deserialize,Serialize};
use crate::assemble::{DatasetError, ElectionDataset};
use crate::format::{format_percentage, format_percentage_points, format_vote_change, format_votes};
use crate::metrics::{abstention_column, bloc_results, head_to_head, Bloc, HeadToHead, VoteDifference, VoteTotal};

/// One party or bloc's result in both elections.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct BlocComparison {
    pub bloc : Bloc,
    pub earlier : VoteTotal,
    pub later : VoteTotal,
    pub change : VoteDifference,
}

impl BlocComparison {
    pub fn compute(bloc:&Bloc,earlier:&ElectionDataset,later:&ElectionDataset) -> Result<Self,DatasetError> {
        let earlier_result = bloc_results(earlier,bloc)?;
        let later_result = bloc_results(later,bloc)?;
        Ok(BlocComparison{ bloc: bloc.clone(), earlier: earlier_result, later: later_result, change: VoteDifference::between(later_result,earlier_result) })
    }
}

/// Who won more municipalities, in each election.
#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct HeadToHeadComparison {
    pub earlier : HeadToHead,
    pub later : HeadToHead,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct ElectionComparison {
    pub earlier_year : String,
    pub later_year : String,
    pub parties : Vec<BlocComparison>,
    pub blocs : Vec<BlocComparison>,
    /// Abstentions as a percentage of votes cast. None unless both elections have an abstention column.
    pub abstention : Option<BlocComparison>,
    pub head_to_head : Vec<HeadToHeadComparison>,
}

impl ElectionComparison {
    /// Compare each party and bloc between the elections, and count municipalities won for each pair of blocs.
    pub fn compute(earlier:&ElectionDataset,later:&ElectionDataset,parties:&[String],blocs:&[Bloc],pairs:&[(Bloc,Bloc)]) -> Result<Self,DatasetError> {
        let parties = parties.iter().map(|p|BlocComparison::compute(&Bloc::single(p),earlier,later)).collect::<Result<Vec<_>,_>>()?;
        let blocs = blocs.iter().map(|b|BlocComparison::compute(b,earlier,later)).collect::<Result<Vec<_>,_>>()?;
        let abstention_bloc = Bloc::single(abstention_column());
        let abstention = if earlier.column_index(abstention_column()).is_some() && later.column_index(abstention_column()).is_some() {
            Some(BlocComparison::compute(&abstention_bloc,earlier,later)?)
        } else { None };
        let mut head_to_head_results = vec![];
        for (first,second) in pairs {
            head_to_head_results.push(HeadToHeadComparison{ earlier: head_to_head(earlier,first,second)?, later: head_to_head(later,first,second)? });
        }
        Ok(ElectionComparison{ earlier_year: earlier.year.clone(), later_year: later.year.clone(), parties, blocs, abstention, head_to_head: head_to_head_results })
    }

    fn write_section(&self,f:&mut Formatter<'_>,title:&str,comparisons:&[BlocComparison]) -> std::fmt::Result {
        if comparisons.is_empty() { return Ok(()); }
        writeln!(f,"{}",title)?;
        for c in comparisons {
            writeln!(f,"  {}",c.bloc)?;
            writeln!(f,"    {} : {} ({})",self.earlier_year,format_votes(c.earlier.votes),format_percentage(c.earlier.percentage))?;
            writeln!(f,"    {} : {} ({})",self.later_year,format_votes(c.later.votes),format_percentage(c.later.percentage))?;
            writeln!(f,"    change : {} ({})",format_vote_change(c.change.votes),format_percentage_points(c.change.percentage_points))?;
        }
        Ok(())
    }
}

fn write_head_to_head(f:&mut Formatter<'_>,year:&str,h:&HeadToHead) -> std::fmt::Result {
    write!(f,"    {} : {} won {}, {} won {}",year,h.first,h.first_won,h.second,h.second_won)?;
    if !h.ties.is_empty() { write!(f,", tied in {} ({})",h.ties.len(),h.ties.join(", "))?; }
    writeln!(f)
}

impl Display for ElectionComparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f,"Comparison of {} with {}",self.later_year,self.earlier_year)?;
        self.write_section(f,"Parties",&self.parties)?;
        self.write_section(f,"Blocs",&self.blocs)?;
        if let Some(abstention) = &self.abstention { self.write_section(f,"Abstention",std::slice::from_ref(abstention))?; }
        if !self.head_to_head.is_empty() {
            writeln!(f,"Municipalities won")?;
            for h in &self.head_to_head {
                writeln!(f,"  {} vs {}",h.later.first,h.later.second)?;
                write_head_to_head(f,&self.earlier_year,&h.earlier)?;
                write_head_to_head(f,&self.later_year,&h.later)?;
            }
        }
        Ok(())
    }
}
