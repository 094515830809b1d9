/**
    xenstore-rs provides a Rust based xenstore implementation.
    Copyright (C) 2016 Star Lab Corp.

    This program is free software; you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation; either version 2 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License along
    with this program; if not, see <http://www.gnu.org/licenses/>.
**/

use std::str;
use super::wire;

pub type Mfn = u64;
pub type EvtChnPort = u16;

pub mod request;
pub mod response;
pub mod unmarshal;

/// Exactly one string with its NUL terminator
pub fn one_string(data: &[u8]) -> Option<String> {
    if data.is_empty() || data[data.len() - 1] != b'\0' {
        return None;
    }

    let body = &data[..data.len() - 1];
    if body.contains(&b'\0') {
        return None;
    }

    str::from_utf8(body).ok().map(|s| s.to_owned())
}

/// Split at the first NUL. The second half is handed back verbatim,
/// terminators and all.
pub fn two_strings(data: &[u8]) -> Option<(String, String)> {
    let split = match data.iter().position(|b| *b == b'\0') {
        Some(idx) => idx,
        None => return None,
    };

    let a = str::from_utf8(&data[..split]).ok();
    let b = str::from_utf8(&data[split + 1..]).ok();
    match (a, b) {
        (Some(a), Some(b)) => Some((a.to_owned(), b.to_owned())),
        _ => None,
    }
}

/// Drop a single trailing NUL, tolerating producers that double-terminate
pub fn strip_nul(s: &str) -> &str {
    if s.ends_with('\0') {
        &s[..s.len() - 1]
    } else {
        s
    }
}

/// Join strings with a NUL after every entry
pub fn nul_terminated(items: &[String]) -> Vec<u8> {
    let mut data = Vec::new();
    for item in items {
        data.extend_from_slice(item.as_bytes());
        data.push(b'\0');
    }
    data
}

/// Undo `nul_terminated`: every entry must carry its terminator
pub fn split_strings(data: &[u8]) -> Option<Vec<String>> {
    if data.is_empty() {
        return Some(Vec::new());
    }

    if data[data.len() - 1] != b'\0' {
        return None;
    }

    let mut items = Vec::new();
    for chunk in data[..data.len() - 1].split(|b| *b == b'\0') {
        match str::from_utf8(chunk) {
            Ok(s) => items.push(s.to_owned()),
            Err(_) => return None,
        }
    }

    Some(items)
}

/// Permissive domain id scan: skip to the first digit, then read digits.
/// No digits at all reads as domain 0.
pub fn parse_domid(s: &str) -> wire::DomainId {
    let mut domid: wire::DomainId = 0;
    let digits = s.chars()
        .skip_while(|c| !c.is_digit(10))
        .take_while(|c| c.is_digit(10));
    for c in digits {
        domid = domid
            .wrapping_mul(10)
            .wrapping_add(c.to_digit(10).unwrap_or(0));
    }
    domid
}

/// The wire encoding of a boolean is "T" or "F", nothing else
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "T" => Some(true),
        "F" => Some(false),
        _ => None,
    }
}
