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

use super::{nul_terminated, unmarshal};
use super::super::acl::Acl;
use super::super::wire::{self, Op, Packet};

/// Everything a server can answer with, one variant per operation. The
/// ack-only operations all render as the literal `OK` payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Debug(Vec<String>),
    Directory(Vec<String>),
    Read(String),
    Getperms(Acl),
    Watch,
    Unwatch,
    TransactionStart(wire::TxId),
    TransactionEnd,
    Introduce,
    Release,
    Getdomainpath(String),
    Write,
    Mkdir,
    Rm,
    Setperms,
    Watchevent(String, String),
    Error(String),
    Isintroduced(bool),
    Resume,
    SetTarget,
    Restrict,
}

impl Response {
    pub fn ty(&self) -> Op {
        match *self {
            Response::Debug(_) => Op::Debug,
            Response::Directory(_) => Op::Directory,
            Response::Read(_) => Op::Read,
            Response::Getperms(_) => Op::Getperms,
            Response::Watch => Op::Watch,
            Response::Unwatch => Op::Unwatch,
            Response::TransactionStart(_) => Op::TransactionStart,
            Response::TransactionEnd => Op::TransactionEnd,
            Response::Introduce => Op::Introduce,
            Response::Release => Op::Release,
            Response::Getdomainpath(_) => Op::Getdomainpath,
            Response::Write => Op::Write,
            Response::Mkdir => Op::Mkdir,
            Response::Rm => Op::Rm,
            Response::Setperms => Op::Setperms,
            Response::Watchevent(_, _) => Op::Watchevent,
            Response::Error(_) => Op::Error,
            Response::Isintroduced(_) => Op::Isintroduced,
            Response::Resume => Op::Resume,
            Response::SetTarget => Op::SetTarget,
            Response::Restrict => Op::Restrict,
        }
    }

    fn data(&self) -> Vec<u8> {
        match *self {
            Response::Read(ref value) => value.as_bytes().to_owned(),
            Response::Debug(ref items) => nul_terminated(items),
            Response::Directory(ref entries) => nul_terminated(entries),
            Response::Getperms(ref acl) => {
                let mut data = acl.marshal().into_bytes();
                data.push(b'\0');
                data
            }
            Response::Getdomainpath(ref path) => {
                let mut data = path.as_bytes().to_owned();
                data.push(b'\0');
                data
            }
            Response::TransactionStart(tid) => {
                let mut data = format!("{}", tid).into_bytes();
                data.push(b'\0');
                data
            }
            Response::Isintroduced(introduced) => {
                vec![if introduced { b'T' } else { b'F' }, b'\0']
            }
            Response::Watchevent(ref path, ref token) => {
                let mut data = path.as_bytes().to_owned();
                data.push(b'\0');
                data.extend_from_slice(token.as_bytes());
                data.push(b'\0');
                data
            }
            Response::Error(ref msg) => {
                let mut data = msg.as_bytes().to_owned();
                data.push(b'\0');
                data
            }
            Response::Watch |
            Response::Unwatch |
            Response::TransactionEnd |
            Response::Introduce |
            Response::Release |
            Response::Write |
            Response::Mkdir |
            Response::Rm |
            Response::Setperms |
            Response::Resume |
            Response::SetTarget |
            Response::Restrict => b"OK\0".to_vec(),
        }
    }

    /// Render the response as a packet, echoing the request's ids
    pub fn marshal(&self, tid: wire::TxId, rid: wire::ReqId) -> Packet {
        Packet::create(tid, rid, self.ty(), self.data())
    }

    /// Decode an asynchronous watch notification
    pub fn parse_watchevent(pkt: &Packet) -> Option<Response> {
        if pkt.get_ty() != Op::Watchevent {
            return None;
        }

        unmarshal::list(pkt).and_then(|items| {
            if items.len() == 2 {
                Some(Response::Watchevent(items[0].clone(), items[1].clone()))
            } else {
                None
            }
        })
    }
}
