// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.


//! Some utility routines that make parsing files easier.

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use anyhow::Context;
use encoding_rs::WINDOWS_1252;
use crate::download::CacheDir;

/// Read a file to a string. Like file.read_to_string but doesn't need a provided buffer.
pub fn file_to_string(file:&mut File) -> anyhow::Result<String> {
    let mut res = String::new();
    file.read_to_string(&mut res)?;
    Ok(res)
}

/// Collapse runs of whitespace (including non breaking spaces) into a single space, and trim the ends.
pub fn merge_whitespace_to_space(s:&str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Web pages are usually utf-8, but older Spanish sites are sometimes served as Windows-1252.
/// Try utf-8 first, and fall back to Windows-1252 which can decode any byte sequence.
pub fn decode_page_bytes(bytes:&[u8]) -> Cow<'_,str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}

/// True if the text looks like something that should be downloaded rather than read from disk.
pub fn is_url(source:&str) -> bool {
    url::Url::parse(source).map(|u|u.scheme()=="http"||u.scheme()=="https").unwrap_or(false)
}

/// Get the contents of a source that may be a local file or an http(s) url, the latter going through the cache.
pub fn read_local_or_remote(source:&str,cache:&CacheDir) -> anyhow::Result<String> {
    if is_url(source) { cache.get_or_download_string(source) }
    else {
        let mut file = File::open(source).with_context(||format!("Could not open {}",source))?;
        file_to_string(&mut file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_page_bytes() {
        assert_eq!(decode_page_bytes("Móstoles".as_bytes()),"Móstoles");
        assert_eq!(decode_page_bytes(b"M\xf3stoles"),"Móstoles");
    }

    #[test]
    fn test_merge_whitespace() {
        assert_eq!(merge_whitespace_to_space("  Votos\n  en\u{a0}blanco: "),"Votos en blanco:");
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://raw.githubusercontent.com/a/b.geojson"));
        assert!(!is_url("data/madrid.geojson"));
        assert!(!is_url("/tmp/madrid.geojson"));
    }
}
