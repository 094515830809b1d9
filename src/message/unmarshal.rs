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

// Typed accessors for reply payloads. Each reads a packet and yields a
// decoded value, or `None` when the payload has the wrong shape.

use std::str;
use super::split_strings;
use super::super::acl::Acl;
use super::super::wire::Packet;

/// The whole payload as a string, trailing NUL trimmed
pub fn string(pkt: &Packet) -> Option<String> {
    str::from_utf8(pkt.get_data()).ok().map(|s| s.to_owned())
}

/// A NUL-separated list payload
pub fn list(pkt: &Packet) -> Option<Vec<String>> {
    split_strings(pkt.get_data_raw())
}

pub fn acl(pkt: &Packet) -> Option<Acl> {
    string(pkt).and_then(|s| Acl::unmarshal(&s))
}

pub fn int(pkt: &Packet) -> Option<u32> {
    string(pkt).and_then(|s| s.trim().parse::<u32>().ok())
}

pub fn int32(pkt: &Packet) -> Option<i32> {
    string(pkt).and_then(|s| s.trim().parse::<i32>().ok())
}

/// An empty payload
pub fn unit(pkt: &Packet) -> Option<()> {
    if pkt.get_data().is_empty() {
        Some(())
    } else {
        None
    }
}

/// The literal `OK` acknowledgement
pub fn ok(pkt: &Packet) -> Option<()> {
    string(pkt).and_then(|s| if s == "OK" { Some(()) } else { None })
}

#[cfg(test)]
mod tests {

    use super::*;
    use super::super::super::acl::Perm;
    use super::super::super::wire::{Op, Packet};

    #[test]
    fn string_trims_the_terminator() {
        let pkt = Packet::create(0, 7, Op::Read, b"hello".to_vec());
        assert_eq!(string(&pkt), Some("hello".to_owned()));

        let pkt = Packet::create(0, 0, Op::Getdomainpath, b"/local/domain/5\0".to_vec());
        assert_eq!(string(&pkt), Some("/local/domain/5".to_owned()));

        let pkt = Packet::create(0, 0, Op::Read, vec![0xff, 0xfe]);
        assert_eq!(string(&pkt), None);
    }

    #[test]
    fn list_splits_directory_entries() {
        let pkt = Packet::create(0, 0, Op::Directory, b"backend\0device\0".to_vec());
        assert_eq!(list(&pkt),
                   Some(vec!["backend".to_owned(), "device".to_owned()]));

        let pkt = Packet::create(0, 0, Op::Directory, vec![]);
        assert_eq!(list(&pkt), Some(Vec::<String>::new()));
    }

    #[test]
    fn acl_decodes_a_getperms_reply() {
        let pkt = Packet::create(0, 0, Op::Getperms, b"b0\0r2\0".to_vec());
        let acl = acl(&pkt).unwrap();

        assert_eq!(acl.owner, 0);
        assert_eq!(acl.other, Perm::Rdwr);
        assert_eq!(acl.acl, vec![(2, Perm::Read)]);
    }

    #[test]
    fn int_decodes_a_transaction_id() {
        let pkt = Packet::create(0, 0, Op::TransactionStart, b"4023\0".to_vec());
        assert_eq!(int(&pkt), Some(4023));

        let pkt = Packet::create(0, 0, Op::TransactionStart, b"nope\0".to_vec());
        assert_eq!(int(&pkt), None);
    }

    #[test]
    fn int32_decodes_signed_values() {
        let pkt = Packet::create(0, 0, Op::Read, b"-7\0".to_vec());
        assert_eq!(int32(&pkt), Some(-7));
    }

    #[test]
    fn unit_requires_an_empty_payload() {
        let pkt = Packet::create(0, 0, Op::Watch, vec![]);
        assert_eq!(unit(&pkt), Some(()));

        let pkt = Packet::create(0, 0, Op::Watch, b"x".to_vec());
        assert_eq!(unit(&pkt), None);
    }

    #[test]
    fn ok_matches_exactly() {
        let pkt = Packet::create(0, 0, Op::Write, b"OK\0".to_vec());
        assert_eq!(ok(&pkt), Some(()));

        let pkt = Packet::create(0, 0, Op::Write, b"OK no\0".to_vec());
        assert_eq!(ok(&pkt), None);
    }
}
