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
#[cfg(test)]
extern crate quickcheck;

use wire;

#[cfg(test)]
use self::quickcheck::{Arbitrary, Gen};

/// A single domain's access to a node
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Perm {
    None,
    Read,
    Write,
    Rdwr,
}

impl Perm {
    pub fn to_char(self) -> char {
        match self {
            Perm::None => 'n',
            Perm::Read => 'r',
            Perm::Write => 'w',
            Perm::Rdwr => 'b',
        }
    }

    pub fn of_char(c: char) -> Option<Perm> {
        match c {
            'n' => Some(Perm::None),
            'r' => Some(Perm::Read),
            'w' => Some(Perm::Write),
            'b' => Some(Perm::Rdwr),
            _ => None,
        }
    }
}

/// The access control list attached to a store node: the owning domain, the
/// default permission for everyone else, and per-domain overrides.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Acl {
    pub owner: wire::DomainId,
    pub other: Perm,
    pub acl: Vec<(wire::DomainId, Perm)>,
}

impl Acl {
    /// Serialized form: `<char><domid>` entries joined by NUL bytes. The
    /// owner entry comes first and carries the default permission character.
    pub fn marshal(&self) -> String {
        let mut entries = vec![format!("{}{}", self.other.to_char(), self.owner)];
        for &(domid, perm) in &self.acl {
            entries.push(format!("{}{}", perm.to_char(), domid));
        }
        entries.join("\0")
    }

    /// Parse the serialized form. Any malformed entry rejects the whole
    /// string, an empty entry included; the empty string is the blank list
    /// owned by domain 0.
    pub fn unmarshal(s: &str) -> Option<Acl> {
        if s.is_empty() {
            return Some(Acl {
                            owner: 0,
                            other: Perm::None,
                            acl: vec![],
                        });
        }

        let mut parsed = Vec::new();
        for entry in s.split('\0') {
            match Acl::parse_entry(entry) {
                Some(entry) => parsed.push(entry),
                None => return None,
            }
        }

        match parsed.split_first() {
            Some((&(owner, other), rest)) => {
                Some(Acl {
                         owner: owner,
                         other: other,
                         acl: rest.to_vec(),
                     })
            }
            None => None,
        }
    }

    fn parse_entry(entry: &str) -> Option<(wire::DomainId, Perm)> {
        // a permission character plus at least one digit
        if entry.len() < 2 {
            return None;
        }
        match entry.chars().next() {
            Some(c) => {
                Perm::of_char(c).and_then(|perm| {
                    entry[1..]
                        .parse::<wire::DomainId>()
                        .ok()
                        .map(|domid| (domid, perm))
                })
            }
            None => None,
        }
    }
}

#[cfg(test)]
impl Arbitrary for Perm {
    fn arbitrary<G: Gen>(g: &mut G) -> Perm {
        match g.gen_range(0, 4) {
            0 => Perm::None,
            1 => Perm::Read,
            2 => Perm::Write,
            _ => Perm::Rdwr,
        }
    }
}

#[cfg(test)]
impl Arbitrary for Acl {
    fn arbitrary<G: Gen>(g: &mut G) -> Acl {
        let entries = g.gen_range(0, 8);
        let mut acl = Vec::with_capacity(entries);
        for _ in 0..entries {
            acl.push((u32::arbitrary(g), Perm::arbitrary(g)));
        }

        Acl {
            owner: u32::arbitrary(g),
            other: Perm::arbitrary(g),
            acl: acl,
        }
    }
}
