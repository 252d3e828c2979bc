// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! Totals, differences and head to head comparisons derived from election datasets.
//!
//! A null vote count is treated as zero in every sum and comparison. This means a
//! municipality where a party did not stand counts as that party getting no votes.

use std::fmt::{Display, Formatter};
use serde::{Deserialize,Serialize};
use crate::assemble::{DatasetError, ElectionDataset, MunicipalityRow};
use crate::municipality::FieldValue;
use crate::normalize::SummaryField;

/// The column holding the denominator for vote shares.
pub fn total_votes_column() -> &'static str { SummaryField::TotalVotes.count_key().unwrap_or("total_votes") }
pub fn abstention_column() -> &'static str { SummaryField::Abstention.count_key().unwrap_or("abstention") }

/// A named group of parties whose votes are added together, e.g. `right = pp + cs + vox`.
#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct Bloc {
    pub name : String,
    pub parties : Vec<String>,
}

impl Bloc {
    pub fn new(name:&str,parties:&[&str]) -> Self {
        Bloc{ name: name.to_string(), parties: parties.iter().map(|p|p.to_string()).collect() }
    }
    /// A bloc of just one party, named after it.
    pub fn single(party:&str) -> Self { Bloc::new(party,&[party]) }
}

impl Display for Bloc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.parties.len()==1 && self.parties[0]==self.name { write!(f,"{}",self.name) }
        else { write!(f,"{} ({})",self.name,self.parties.join("+")) }
    }
}

/// A vote total and what percentage it is of all votes. The percentage is NaN if there were no votes.
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct VoteTotal {
    pub votes : u64,
    pub percentage : f64,
}

/// The change from one election to another, or the gap between two blocs in one election.
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct VoteDifference {
    pub votes : i64,
    pub percentage_points : f64,
}

impl VoteDifference {
    pub fn between(later:VoteTotal,earlier:VoteTotal) -> Self {
        VoteDifference{ votes: later.votes as i64-earlier.votes as i64, percentage_points: later.percentage-earlier.percentage }
    }
}

/// `subset` as a percentage of `total`, NaN if `total` is zero.
pub fn percentage(subset:u64,total:u64) -> f64 {
    if total==0 { f64::NAN } else { 100.0*subset as f64/total as f64 }
}

/// A vote count from a row. Null is zero; a percentage in a vote column is an error.
fn count(row:&MunicipalityRow,index:usize,column:&str) -> Result<u64,DatasetError> {
    match row.values[index] {
        None => Ok(0),
        Some(FieldValue::Count(n)) => Ok(n),
        Some(FieldValue::Percentage(_)) => Err(DatasetError::NotACount{ column: column.to_string(), municipality: row.municipality.clone() }),
    }
}

/// The sum of a bloc's columns for every row, in row order.
pub fn bloc_values(dataset:&ElectionDataset,bloc:&Bloc) -> Result<Vec<u64>,DatasetError> {
    let indices = bloc.parties.iter().map(|p|dataset.require_column(p)).collect::<Result<Vec<usize>,_>>()?;
    dataset.rows.iter().map(|row| -> Result<u64,DatasetError> {
        let mut sum = 0;
        for (&index,party) in indices.iter().zip(bloc.parties.iter()) { sum+=count(row,index,party)?; }
        Ok(sum)
    }).collect()
}

/// The sum of one column over all municipalities.
pub fn column_sum(dataset:&ElectionDataset,column:&str) -> Result<u64,DatasetError> {
    bloc_sum(dataset,&Bloc::single(column))
}

/// The sum of all the bloc's columns over all municipalities.
pub fn bloc_sum(dataset:&ElectionDataset,bloc:&Bloc) -> Result<u64,DatasetError> {
    Ok(bloc_values(dataset,bloc)?.into_iter().sum())
}

/// A bloc's votes over the whole region, and its share of all votes.
pub fn bloc_results(dataset:&ElectionDataset,bloc:&Bloc) -> Result<VoteTotal,DatasetError> {
    let votes = bloc_sum(dataset,bloc)?;
    let total = column_sum(dataset,total_votes_column())?;
    Ok(VoteTotal{ votes, percentage: percentage(votes,total) })
}

/// A party's votes over the whole region, and its share of all votes.
pub fn total_results(dataset:&ElectionDataset,party:&str) -> Result<VoteTotal,DatasetError> {
    bloc_results(dataset,&Bloc::single(party))
}

/// How a bloc's result changed from `earlier` to `later`.
pub fn difference_elections(bloc:&Bloc,later:&ElectionDataset,earlier:&ElectionDataset) -> Result<VoteDifference,DatasetError> {
    Ok(VoteDifference::between(bloc_results(later,bloc)?,bloc_results(earlier,bloc)?))
}

/// How far `first` is ahead of `second` in one election.
pub fn difference_blocs(dataset:&ElectionDataset,first:&Bloc,second:&Bloc) -> Result<VoteDifference,DatasetError> {
    Ok(VoteDifference::between(bloc_results(dataset,first)?,bloc_results(dataset,second)?))
}

/// Per municipality comparison of two blocs.
#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct HeadToHead {
    pub first : String,
    pub second : String,
    /// number of municipalities where first got strictly more votes than second.
    pub first_won : usize,
    pub second_won : usize,
    /// municipalities where the two got exactly the same number of votes, counted for neither.
    pub ties : Vec<String>,
}

impl HeadToHead {
    pub fn municipalities(&self) -> usize { self.first_won+self.second_won+self.ties.len() }
}

pub fn head_to_head(dataset:&ElectionDataset,first:&Bloc,second:&Bloc) -> Result<HeadToHead,DatasetError> {
    let a = bloc_values(dataset,first)?;
    let b = bloc_values(dataset,second)?;
    let mut res = HeadToHead{ first: first.name.clone(), second: second.name.clone(), first_won: 0, second_won: 0, ties: vec![] };
    for ((a,b),row) in a.into_iter().zip(b).zip(&dataset.rows) {
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => res.first_won+=1,
            std::cmp::Ordering::Less => res.second_won+=1,
            std::cmp::Ordering::Equal => res.ties.push(row.municipality.clone()),
        }
    }
    Ok(res)
}

/// The number of municipalities where `first` got strictly more votes than `second`.
pub fn won_municipalities(dataset:&ElectionDataset,first:&Bloc,second:&Bloc) -> Result<usize,DatasetError> {
    Ok(head_to_head(dataset,first,second)?.first_won)
}

/// The municipalities where `first` and `second` got the same number of votes.
pub fn tied_municipalities(dataset:&ElectionDataset,first:&Bloc,second:&Bloc) -> Result<Vec<String>,DatasetError> {
    Ok(head_to_head(dataset,first,second)?.ties)
}

/// Each municipality's votes for the bloc as a percentage of its total votes. None where the total is zero or missing.
pub fn share(dataset:&ElectionDataset,bloc:&Bloc) -> Result<Vec<(String,Option<f64>)>,DatasetError> {
    let total_column = total_votes_column();
    let totals_index = dataset.require_column(total_column)?;
    let values = bloc_values(dataset,bloc)?;
    dataset.rows.iter().zip(values).map(|(row,v)| -> Result<(String,Option<f64>),DatasetError> {
        let total = match row.values[totals_index] { None => None, Some(_) => Some(count(row,totals_index,total_column)?) };
        Ok((row.municipality.clone(),total.filter(|&t|t>0).map(|t|percentage(v,t))))
    }).collect()
}

/// Each municipality's votes for `bloc` as a percentage of the votes for `first` and `second` combined, e.g. a party
/// relative to the two main parties. None where the combined vote is zero.
pub fn relative_share(dataset:&ElectionDataset,bloc:&Bloc,first:&Bloc,second:&Bloc) -> Result<Vec<(String,Option<f64>)>,DatasetError> {
    let values = bloc_values(dataset,bloc)?;
    let a = bloc_values(dataset,first)?;
    let b = bloc_values(dataset,second)?;
    Ok(dataset.rows.iter().zip(values).zip(a.into_iter().zip(b)).map(|((row,v),(a,b))|{
        let denominator = a+b;
        (row.municipality.clone(),if denominator==0 { None } else { Some(percentage(v,denominator)) })
    }).collect())
}

/// Add a `{bloc}_share` column for each bloc, and for each pair a `{first}_share_of_{first}_{second}` column
/// holding the first's percentage of the pair's combined votes. Undefined shares are null.
/// A column name already present is not added again.
pub fn with_share_columns(mut dataset:ElectionDataset,blocs:&[Bloc],pairs:&[(Bloc,Bloc)]) -> Result<ElectionDataset,DatasetError> {
    let mut added : Vec<(String,Vec<(String,Option<f64>)>)> = vec![];
    for bloc in blocs { added.push((format!("{}_share",bloc.name),share(&dataset,bloc)?)); }
    for (first,second) in pairs {
        added.push((format!("{}_share_of_{}_{}",first.name,first.name,second.name),relative_share(&dataset,first,first,second)?));
    }
    for (column,values) in added {
        if dataset.column_index(&column).is_some() { continue; }
        dataset.columns.push(column);
        for (row,(_,value)) in dataset.rows.iter_mut().zip(values) { row.values.push(value.map(FieldValue::Percentage)); }
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(year:&str,columns:&[&str],rows:&[(&str,&[Option<u64>])]) -> ElectionDataset {
        ElectionDataset{
            year: year.to_string(),
            columns: columns.iter().map(|c|c.to_string()).collect(),
            rows: rows.iter().map(|(name,values)|MunicipalityRow{
                municipality: name.to_string(),
                link: None,
                values: values.iter().map(|v|v.map(FieldValue::Count)).collect(),
                geometry: None,
            }).collect(),
        }
    }

    #[test]
    fn test_two_municipality_scenario() {
        let d = dataset("2021",&["p1","p2","total_votes"],&[("A",&[Some(100),Some(150),Some(300)]),("B",&[Some(200),Some(50),Some(300)])]);
        let p1 = Bloc::single("p1");
        let p2 = Bloc::single("p2");
        assert_eq!(won_municipalities(&d,&p1,&p2),Ok(1));
        assert_eq!(won_municipalities(&d,&p2,&p1),Ok(1));
        assert_eq!(bloc_sum(&d,&p1),Ok(300));
        let total = total_results(&d,"p1").unwrap();
        assert_eq!(total.votes,300);
        assert!((total.percentage-50.0).abs()<1e-9);
        assert_eq!(bloc_sum(&d,&Bloc::new("both",&["p1","p2"])),Ok(500));
    }

    #[test]
    fn test_ties_and_nulls() {
        let d = dataset("2021",&["pp","psoe","total_votes"],&[
            ("A",&[Some(10),Some(10),Some(30)]),
            ("B",&[None,Some(3),Some(5)]),
            ("C",&[Some(4),None,Some(0)]),
            ("D",&[None,None,None]),
        ]);
        let pp = Bloc::single("pp");
        let psoe = Bloc::single("psoe");
        let h = head_to_head(&d,&pp,&psoe).unwrap();
        assert_eq!(h.first_won,1);
        assert_eq!(h.second_won,1);
        assert_eq!(h.ties,vec!["A".to_string(),"D".to_string()]);
        assert_eq!(h.municipalities(),d.rows.len());
        assert_eq!(won_municipalities(&d,&psoe,&pp).unwrap()+won_municipalities(&d,&pp,&psoe).unwrap()+tied_municipalities(&d,&pp,&psoe).unwrap().len(),4);
        let shares = share(&d,&pp).unwrap();
        assert_eq!(shares[1],("B".to_string(),Some(0.0)));
        assert_eq!(shares[2],("C".to_string(),None));
        assert_eq!(shares[3],("D".to_string(),None));
        let relative = relative_share(&d,&pp,&pp,&psoe).unwrap();
        assert_eq!(relative[0].1,Some(50.0));
        assert_eq!(relative[3].1,None);
    }

    #[test]
    fn test_differences() {
        let earlier = dataset("2019",&["vox","total_votes"],&[("A",&[Some(10),Some(100)])]);
        let later = dataset("2021",&["vox","total_votes"],&[("A",&[Some(5),Some(50)])]);
        let d = difference_elections(&Bloc::single("vox"),&later,&earlier).unwrap();
        assert_eq!(d.votes,-5);
        assert!(d.percentage_points.abs()<1e-9);
        let gap = difference_blocs(&later,&Bloc::single("total_votes"),&Bloc::single("vox")).unwrap();
        assert_eq!(gap.votes,45);
        assert!((gap.percentage_points-90.0).abs()<1e-9);
    }

    #[test]
    fn test_errors() {
        let mut d = dataset("2021",&["pp","total_votes"],&[("A",&[Some(1),Some(2)])]);
        assert_eq!(bloc_sum(&d,&Bloc::single("podemos")),Err(DatasetError::NoSuchColumn("podemos".to_string())));
        d.rows[0].values[0]=Some(FieldValue::Percentage(3.5));
        assert_eq!(bloc_sum(&d,&Bloc::single("pp")),Err(DatasetError::NotACount{ column: "pp".to_string(), municipality: "A".to_string() }));
        let empty = dataset("2021",&["pp","total_votes"],&[]);
        assert!(total_results(&empty,"pp").unwrap().percentage.is_nan());
    }

    #[test]
    fn test_share_columns() {
        let d = dataset("2021",&["pp","psoe","total_votes"],&[("A",&[Some(30),Some(10),Some(100)]),("B",&[None,None,Some(0)])]);
        let pp = Bloc::single("pp");
        let psoe = Bloc::single("psoe");
        let d = with_share_columns(d,&[pp.clone(),psoe.clone(),pp.clone()],&[(pp,psoe)]).unwrap();
        assert_eq!(d.columns,vec!["pp","psoe","total_votes","pp_share","psoe_share","pp_share_of_pp_psoe"]);
        let value = |municipality:&str,column:&str| d.value(d.find_row(municipality).unwrap(),column);
        assert_eq!(value("A","pp_share"),Some(FieldValue::Percentage(30.0)));
        assert_eq!(value("A","pp_share_of_pp_psoe"),Some(FieldValue::Percentage(75.0)));
        assert_eq!(value("B","psoe_share"),None);
        assert_eq!(value("B","pp_share_of_pp_psoe"),None);
        assert!(d.rows.iter().all(|r|r.values.len()==d.columns.len()));
        let missing = dataset("2021",&["pp","total_votes"],&[]);
        assert_eq!(with_share_columns(missing,&[Bloc::single("vox")],&[]).map(|d|d.columns),Err(DatasetError::NoSuchColumn("vox".to_string())));
    }

    #[test]
    fn test_bloc_display() {
        assert_eq!(Bloc::single("pp").to_string(),"pp");
        assert_eq!(Bloc::new("right",&["pp","cs","vox"]).to_string(),"right (pp+cs+vox)");
    }
}
