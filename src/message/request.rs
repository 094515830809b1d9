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

use super::{EvtChnPort, Mfn, nul_terminated, one_string, parse_bool, parse_domid, split_strings,
            strip_nul, two_strings};
use super::super::acl::Acl;
use super::super::wire::{self, Op, Packet};

#[cfg(test)]
use self::quickcheck::{Arbitrary, Gen};

/// The operations that address a single store path
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathOp {
    Read,
    Directory,
    Getperms,
    Write(String),
    Mkdir,
    Rm,
    Setperms(Acl),
}

/// Everything a client can put on the wire. `Watchevent` and `Error` are
/// carried so ingress dispatch stays exhaustive, but they are reply
/// payloads: marshalling one as a request is a programmer error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    PathOp(String, PathOp),
    Getdomainpath(wire::DomainId),
    TransactionStart,
    TransactionEnd(bool),
    Watch(String, String),
    Unwatch(String, String),
    Debug(Vec<String>),
    Introduce(wire::DomainId, Mfn, EvtChnPort),
    Resume(wire::DomainId),
    Release(wire::DomainId),
    SetTarget(wire::DomainId, wire::DomainId),
    Restrict(wire::DomainId),
    Isintroduced(wire::DomainId),
    Watchevent(String),
    Error(String),
}

impl Request {
    pub fn ty(&self) -> Op {
        match *self {
            Request::PathOp(_, ref op) => {
                match *op {
                    PathOp::Read => Op::Read,
                    PathOp::Directory => Op::Directory,
                    PathOp::Getperms => Op::Getperms,
                    PathOp::Write(_) => Op::Write,
                    PathOp::Mkdir => Op::Mkdir,
                    PathOp::Rm => Op::Rm,
                    PathOp::Setperms(_) => Op::Setperms,
                }
            }
            Request::Getdomainpath(_) => Op::Getdomainpath,
            Request::TransactionStart => Op::TransactionStart,
            Request::TransactionEnd(_) => Op::TransactionEnd,
            Request::Watch(_, _) => Op::Watch,
            Request::Unwatch(_, _) => Op::Unwatch,
            Request::Debug(_) => Op::Debug,
            Request::Introduce(_, _, _) => Op::Introduce,
            Request::Resume(_) => Op::Resume,
            Request::Release(_) => Op::Release,
            Request::SetTarget(_, _) => Op::SetTarget,
            Request::Restrict(_) => Op::Restrict,
            Request::Isintroduced(_) => Op::Isintroduced,
            Request::Watchevent(_) => Op::Watchevent,
            Request::Error(_) => Op::Error,
        }
    }

    /// Only path operations and transaction ends run inside a transaction
    fn transactional(&self) -> bool {
        match *self {
            Request::PathOp(_, _) | Request::TransactionEnd(_) => true,
            _ => false,
        }
    }

    fn data(&self) -> Vec<u8> {
        match *self {
            Request::PathOp(ref path, ref op) => {
                let mut data = path.as_bytes().to_owned();
                data.push(b'\0');
                match *op {
                    PathOp::Write(ref value) => {
                        // the value is not NUL terminated on the wire
                        data.extend_from_slice(value.as_bytes());
                    }
                    PathOp::Setperms(ref acl) => {
                        data.extend_from_slice(acl.marshal().as_bytes());
                        data.push(b'\0');
                    }
                    PathOp::Read | PathOp::Directory | PathOp::Getperms | PathOp::Mkdir |
                    PathOp::Rm => {}
                }
                data
            }
            Request::Getdomainpath(domid) |
            Request::Resume(domid) |
            Request::Release(domid) |
            Request::Restrict(domid) |
            Request::Isintroduced(domid) => {
                let mut data = format!("{}", domid).into_bytes();
                data.push(b'\0');
                data
            }
            Request::TransactionStart => Vec::new(),
            Request::TransactionEnd(commit) => {
                vec![if commit { b'T' } else { b'F' }, b'\0']
            }
            Request::Watch(ref path, ref token) |
            Request::Unwatch(ref path, ref token) => {
                let mut data = path.as_bytes().to_owned();
                data.push(b'\0');
                data.extend_from_slice(token.as_bytes());
                data.push(b'\0');
                data
            }
            Request::Debug(ref items) => nul_terminated(items),
            Request::Introduce(domid, mfn, port) => {
                let mut data = format!("{}", domid).into_bytes();
                data.push(b'\0');
                data.extend_from_slice(format!("{}", mfn).as_bytes());
                data.push(b'\0');
                data.extend_from_slice(format!("{}", port).as_bytes());
                data.push(b'\0');
                data
            }
            Request::SetTarget(mine, yours) => {
                let mut data = format!("{}", mine).into_bytes();
                data.push(b'\0');
                data.extend_from_slice(format!("{}", yours).as_bytes());
                data.push(b'\0');
                data
            }
            Request::Watchevent(_) | Request::Error(_) => {
                unreachable!("watch events and errors are reply payloads")
            }
        }
    }

    /// Render the request as a packet. The transaction id is dropped for
    /// payloads that cannot run inside a transaction.
    pub fn marshal(&self, tid: wire::TxId, rid: wire::ReqId) -> Packet {
        let tid = if self.transactional() { tid } else { 0 };
        Packet::create(tid, rid, self.ty(), self.data())
    }

    /// Decode a request packet back into its payload. `None` means the
    /// payload did not split into the fields its operation requires.
    pub fn parse(pkt: &Packet) -> Option<Request> {
        let data = pkt.get_data_raw();
        match pkt.get_ty() {
            Op::Read => one_string(data).map(|p| Request::PathOp(p, PathOp::Read)),
            Op::Directory => one_string(data).map(|p| Request::PathOp(p, PathOp::Directory)),
            Op::Getperms => one_string(data).map(|p| Request::PathOp(p, PathOp::Getperms)),
            Op::Mkdir => one_string(data).map(|p| Request::PathOp(p, PathOp::Mkdir)),
            Op::Rm => one_string(data).map(|p| Request::PathOp(p, PathOp::Rm)),
            Op::Write => {
                two_strings(data).map(|(path, value)| {
                                          Request::PathOp(path, PathOp::Write(value))
                                      })
            }
            Op::Setperms => {
                two_strings(data).and_then(|(path, perms)| {
                    Acl::unmarshal(strip_nul(&perms))
                        .map(|acl| Request::PathOp(path, PathOp::Setperms(acl)))
                })
            }
            Op::Watch => {
                two_strings(data).map(|(path, token)| {
                                          Request::Watch(path, strip_nul(&token).to_owned())
                                      })
            }
            Op::Unwatch => {
                two_strings(data).map(|(path, token)| {
                                          Request::Unwatch(path, strip_nul(&token).to_owned())
                                      })
            }
            Op::TransactionStart => {
                if pkt.get_data().is_empty() {
                    Some(Request::TransactionStart)
                } else {
                    None
                }
            }
            Op::TransactionEnd => {
                one_string(data)
                    .and_then(|s| parse_bool(&s))
                    .map(Request::TransactionEnd)
            }
            Op::Debug => split_strings(data).map(Request::Debug),
            Op::Introduce => {
                split_strings(data).and_then(|items| {
                    if items.len() != 3 {
                        return None;
                    }
                    let domid = parse_domid(&items[0]);
                    let mfn = match items[1].parse::<Mfn>() {
                        Ok(mfn) => mfn,
                        Err(_) => return None,
                    };
                    let port = match items[2].parse::<EvtChnPort>() {
                        Ok(port) => port,
                        Err(_) => return None,
                    };
                    Some(Request::Introduce(domid, mfn, port))
                })
            }
            Op::Getdomainpath => {
                one_string(data).map(|s| Request::Getdomainpath(parse_domid(&s)))
            }
            Op::Resume => one_string(data).map(|s| Request::Resume(parse_domid(&s))),
            Op::Release => one_string(data).map(|s| Request::Release(parse_domid(&s))),
            Op::Restrict => one_string(data).map(|s| Request::Restrict(parse_domid(&s))),
            Op::Isintroduced => one_string(data).map(|s| Request::Isintroduced(parse_domid(&s))),
            Op::SetTarget => {
                two_strings(data).map(|(mine, yours)| {
                    Request::SetTarget(parse_domid(&mine), parse_domid(strip_nul(&yours)))
                })
            }
            Op::Watchevent => one_string(data).map(Request::Watchevent),
            Op::Error => one_string(data).map(Request::Error),
        }
    }
}

#[cfg(test)]
fn arb_path<G: Gen>(g: &mut G) -> String {
    const CHARS: &'static [u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-_@/";
    let size = g.gen_range(1, 16);
    let mut s = String::with_capacity(size);
    for _ in 0..size {
        s.push(CHARS[g.gen_range(0, CHARS.len())] as char);
    }
    s
}

#[cfg(test)]
fn arb_token<G: Gen>(g: &mut G) -> String {
    if g.gen() {
        format!("{}:{}", u32::arbitrary(g), arb_path(g))
    } else {
        String::new()
    }
}

#[cfg(test)]
impl Arbitrary for Request {
    fn arbitrary<G: Gen>(g: &mut G) -> Request {
        match g.gen_range(0, 19) {
            0 => Request::PathOp(arb_path(g), PathOp::Read),
            1 => Request::PathOp(arb_path(g), PathOp::Directory),
            2 => Request::PathOp(arb_path(g), PathOp::Getperms),
            3 => Request::PathOp(arb_path(g), PathOp::Mkdir),
            4 => Request::PathOp(arb_path(g), PathOp::Rm),
            5 => Request::PathOp(arb_path(g), PathOp::Write(String::arbitrary(g))),
            6 => Request::PathOp(arb_path(g), PathOp::Setperms(Acl::arbitrary(g))),
            7 => Request::Getdomainpath(u32::arbitrary(g)),
            8 => Request::TransactionStart,
            9 => Request::TransactionEnd(bool::arbitrary(g)),
            10 => Request::Watch(arb_path(g), arb_token(g)),
            11 => Request::Unwatch(arb_path(g), arb_token(g)),
            12 => {
                let items = g.gen_range(0, 4);
                Request::Debug((0..items).map(|_| arb_path(g)).collect())
            }
            13 => Request::Introduce(u32::arbitrary(g), u64::arbitrary(g), u16::arbitrary(g)),
            14 => Request::Resume(u32::arbitrary(g)),
            15 => Request::Release(u32::arbitrary(g)),
            16 => Request::SetTarget(u32::arbitrary(g), u32::arbitrary(g)),
            17 => Request::Restrict(u32::arbitrary(g)),
            _ => Request::Isintroduced(u32::arbitrary(g)),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use super::quickcheck::quickcheck;
    use super::super::super::acl::{Acl, Perm};
    use super::super::super::wire::{Op, Packet};

    #[test]
    fn read_request_wire_format() {
        let req = Request::PathOp("/foo/bar".to_owned(), PathOp::Read);
        let bytes = req.marshal(0, 7).marshal();

        let expected_header = [0x02, 0, 0, 0, 0x07, 0, 0, 0, 0, 0, 0, 0, 0x09, 0, 0, 0];
        assert_eq!(&bytes[..16], &expected_header);
        assert_eq!(&bytes[16..], &b"/foo/bar\0"[..]);
    }

    #[test]
    fn write_value_has_no_terminator() {
        let req = Request::PathOp("/k".to_owned(), PathOp::Write("v1".to_owned()));
        let pkt = req.marshal(9, 1);

        assert_eq!(pkt.get_ty(), Op::Write);
        assert_eq!(pkt.get_tid(), 9);
        assert_eq!(pkt.get_data_raw(), b"/k\0v1");
    }

    #[test]
    fn setperms_carries_the_acl_string() {
        let acl = Acl {
            owner: 1,
            other: Perm::None,
            acl: vec![(2, Perm::Read)],
        };
        let req = Request::PathOp("/k".to_owned(), PathOp::Setperms(acl));
        let pkt = req.marshal(0, 0);

        assert_eq!(pkt.get_data_raw(), b"/k\0n1\0r2\0");
    }

    #[test]
    fn introduce_wire_format() {
        let req = Request::Introduce(3, 0x1234, 5);
        let pkt = req.marshal(0, 1);
        let bytes = pkt.marshal();

        assert_eq!(pkt.get_ty().to_u32(), 8);
        assert_eq!(pkt.get_rid(), 1);
        assert_eq!(&bytes[16..], &b"3\x004660\x005\x00"[..]);
    }

    #[test]
    fn transaction_end_is_t_or_f() {
        assert_eq!(Request::TransactionEnd(true).marshal(4, 0).get_data_raw(),
                   b"T\0");
        assert_eq!(Request::TransactionEnd(false).marshal(4, 0).get_data_raw(),
                   b"F\0");
    }

    #[test]
    fn non_transactional_requests_drop_the_tid() {
        fn prop(req: Request, tid: u32) -> bool {
            let pkt = req.marshal(tid, 0);
            match req {
                Request::PathOp(_, _) |
                Request::TransactionEnd(_) => pkt.get_tid() == tid,
                _ => pkt.get_tid() == 0,
            }
        }

        quickcheck(prop as fn(Request, u32) -> bool);
    }

    #[test]
    fn requests_roundtrip() {
        fn prop(req: Request, tid: u32, rid: u32) -> bool {
            let pkt = req.marshal(tid, rid);
            Request::parse(&pkt) == Some(req)
        }

        quickcheck(prop as fn(Request, u32, u32) -> bool);
    }

    #[test]
    fn watch_tolerates_double_termination() {
        let pkt = Packet::create(0, 0, Op::Watch, b"/k\0tok\0\0".to_vec());

        assert_eq!(Request::parse(&pkt),
                   Some(Request::Watch("/k".to_owned(), "tok\0".to_owned())));

        let pkt = Packet::create(0, 0, Op::Watch, b"/k\0tok\0".to_vec());
        assert_eq!(Request::parse(&pkt),
                   Some(Request::Watch("/k".to_owned(), "tok".to_owned())));
    }

    #[test]
    fn garbage_does_not_parse() {
        let pkt = Packet::create(0, 0, Op::Read, b"no terminator".to_vec());
        assert_eq!(Request::parse(&pkt), None);

        let pkt = Packet::create(0, 0, Op::TransactionEnd, b"X\0".to_vec());
        assert_eq!(Request::parse(&pkt), None);

        let pkt = Packet::create(0, 0, Op::Introduce, b"1\02\0".to_vec());
        assert_eq!(Request::parse(&pkt), None);
    }

    #[test]
    fn error_replies_parse_as_payloads() {
        let pkt = Packet::create(0, 0, Op::Error, b"ENOENT\0".to_vec());

        assert_eq!(Request::parse(&pkt),
                   Some(Request::Error("ENOENT".to_owned())));
    }

    #[test]
    #[should_panic]
    fn marshalling_a_watchevent_is_a_programmer_error() {
        Request::Watchevent("/k".to_owned()).marshal(0, 0);
    }
}
