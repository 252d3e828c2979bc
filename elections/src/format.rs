// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

//! Human readable numbers for the text reports.

/// Write an integer with `,` between groups of three digits, e.g. `-1,234,567`.
pub fn group_thousands(n:i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut res = String::with_capacity(digits.len()+digits.len()/3+1);
    if n<0 { res.push('-'); }
    for (i,c) in digits.chars().enumerate() {
        if i>0 && (digits.len()-i)%3==0 { res.push(','); }
        res.push(c);
    }
    res
}

pub fn format_votes(n:u64) -> String {
    format!("{} votes",group_thousands(i64::try_from(n).unwrap_or(i64::MAX)))
}

/// A change in votes, always signed.
pub fn format_vote_change(n:i64) -> String {
    if n>0 { format!("+{} votes",group_thousands(n)) } else { format!("{} votes",group_thousands(n)) }
}

/// A percentage to two decimals. Undefined percentages (no votes at all) are shown as `n/a`.
pub fn format_percentage(p:f64) -> String {
    if p.is_finite() { format!("{:.2} %",p) } else { "n/a".to_string() }
}

/// A change in percentage points, always signed.
pub fn format_percentage_points(p:f64) -> String {
    if p.is_finite() { format!("{:+.2} pp",p) } else { "n/a".to_string() }
}
