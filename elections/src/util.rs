// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::HashSet;
use std::hash::Hash;

/// A utility to see if all values passing by are the same value.
pub struct DetectUnique<T:Eq> {
    seen_multiple : bool,
    res : Option<T>,
}

impl <T:Eq> Default for DetectUnique<T> {
    fn default() -> Self { DetectUnique{seen_multiple:false, res:None}}
}
impl <T:Eq> DetectUnique<T> {
    /// observe a value passing by
    pub fn add(&mut self,v:T) {
        if !self.seen_multiple {
            match &self.res {
                None => { self.res=Some(v); }
                Some(existing) => {
                    if *existing!=v {
                        self.res=None;
                        self.seen_multiple=true;
                    }
                }
            }
        }
    }
    /// true if at least two different values have been seen.
    pub fn seen_multiple(&self) -> bool { self.seen_multiple }
}

/// Values of `a` that are not in `b`, sorted and without repeats.
/// Used for the name reconciliation checks, which want a stable, readable list.
pub fn sorted_difference<'a,T:Eq+Hash+Ord+Clone+'a>(a:impl IntoIterator<Item=&'a T>,b:impl IntoIterator<Item=&'a T>) -> Vec<T> {
    let exclude : HashSet<&T> = b.into_iter().collect();
    let mut res : Vec<T> = a.into_iter().filter(|v|!exclude.contains(v)).cloned().collect();
    res.sort();
    res.dedup();
    res
}

/// Values that occur more than once, sorted and listed once each.
pub fn sorted_repeats<'a,T:Eq+Hash+Ord+Clone+'a>(values:impl IntoIterator<Item=&'a T>) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut res : Vec<T> = values.into_iter().filter(|v|!seen.insert(*v)).cloned().collect();
    res.sort();
    res.dedup();
    res
}
