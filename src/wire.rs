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

use bytes::{Buf, BufMut, BytesMut, LittleEndian};
use std::cmp;
use std::io;
use tokio_io::codec::{Decoder, Encoder};
use super::error::{Error, Result};

#[cfg(test)]
use self::quickcheck::{Arbitrary, Gen};

/// XenStore error tokens
pub const XSE_EINVAL: &'static str = "EINVAL";
pub const XSE_EACCES: &'static str = "EACCES";
pub const XSE_EEXIST: &'static str = "EEXIST";
pub const XSE_EISDIR: &'static str = "EISDIR";
pub const XSE_ENOENT: &'static str = "ENOENT";
pub const XSE_ENOMEM: &'static str = "ENOMEM";
pub const XSE_ENOSPC: &'static str = "ENOSPC";
pub const XSE_EIO: &'static str = "EIO";
pub const XSE_ENOTEMPTY: &'static str = "ENOTEMPTY";
pub const XSE_ENOSYS: &'static str = "ENOSYS";
pub const XSE_EROFS: &'static str = "EROFS";
pub const XSE_EBUSY: &'static str = "EBUSY";
pub const XSE_EAGAIN: &'static str = "EAGAIN";
pub const XSE_EISCONN: &'static str = "EISCONN";
pub const XSE_E2BIG: &'static str = "E2BIG";

/// Miscellaneous protocol values
pub const XENSTORE_PAYLOAD_MAX: usize = 4096;

pub type ReqId = u32;
pub type TxId = u32;
pub type DomainId = u32;

/// A `Header` is always 16 bytes long
pub const HEADER_SIZE: usize = 16;

/// XenStore operations. The wire code of an operation is its zero based
/// position in this list; the list must never be reordered.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Op {
    Debug,
    Directory,
    Read,
    Getperms,
    Watch,
    Unwatch,
    TransactionStart,
    TransactionEnd,
    Introduce,
    Release,
    Getdomainpath,
    Write,
    Mkdir,
    Rm,
    Setperms,
    Watchevent,
    Error,
    Isintroduced,
    Resume,
    SetTarget,
    Restrict,
}

impl Op {
    /// All operations in wire order
    pub fn all() -> &'static [Op; 21] {
        static ALL: [Op; 21] = [Op::Debug,
                                Op::Directory,
                                Op::Read,
                                Op::Getperms,
                                Op::Watch,
                                Op::Unwatch,
                                Op::TransactionStart,
                                Op::TransactionEnd,
                                Op::Introduce,
                                Op::Release,
                                Op::Getdomainpath,
                                Op::Write,
                                Op::Mkdir,
                                Op::Rm,
                                Op::Setperms,
                                Op::Watchevent,
                                Op::Error,
                                Op::Isintroduced,
                                Op::Resume,
                                Op::SetTarget,
                                Op::Restrict];
        &ALL
    }

    pub fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn from_u32(id: u32) -> Result<Op> {
        Op::all()
            .get(id as usize)
            .map(|op| *op)
            .ok_or(Error::UnknownOp(id))
    }
}

/// The `Header` type that is generic to all messages
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub ty: Op,
    pub req_id: ReqId,
    pub tx_id: TxId,
    pub len: u32,
}

impl Header {
    /// Parse the header
    pub fn parse(bytes: &[u8]) -> Result<Header> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::ParseFailure(format!("expected {} header bytes, got {}",
                                                   HEADER_SIZE,
                                                   bytes.len())));
        }
        let mut input = io::Cursor::new(bytes);
        let ty = Op::from_u32(input.get_u32::<LittleEndian>())?;
        let req_id = input.get_u32::<LittleEndian>();
        let tx_id = input.get_u32::<LittleEndian>();
        let len = input.get_u32::<LittleEndian>();

        Ok(Header {
               ty: ty,
               req_id: req_id,
               tx_id: tx_id,
               len: len,
           })
    }

    /// Output the header as a vector of bytes
    pub fn to_vec(&self) -> Vec<u8> {
        let mut ret = vec![];
        ret.put_u32::<LittleEndian>(self.ty.to_u32());
        ret.put_u32::<LittleEndian>(self.req_id);
        ret.put_u32::<LittleEndian>(self.tx_id);
        ret.put_u32::<LittleEndian>(self.len);

        ret
    }

    /// Provide the length that the body should be, bounded by the payload
    /// ceiling. A peer that declares more is already malformed; the layer
    /// owning the connection decides what to do with it.
    pub fn body_len(&self) -> usize {
        cmp::min(self.len as usize, XENSTORE_PAYLOAD_MAX)
    }
}

/// A single framed message: the four header fields plus the payload bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packet {
    ty: Op,
    rid: ReqId,
    tid: TxId,
    len: usize,
    data: Vec<u8>,
}

impl Packet {
    /// Build a packet from payload bytes. The payload is truncated at
    /// `XENSTORE_PAYLOAD_MAX` so no constructor can emit an oversized frame.
    pub fn create(tid: TxId, rid: ReqId, ty: Op, data: Vec<u8>) -> Packet {
        let mut data = data;
        data.truncate(XENSTORE_PAYLOAD_MAX);
        let len = data.len();
        Packet {
            ty: ty,
            rid: rid,
            tid: tid,
            len: len,
            data: data,
        }
    }

    pub fn get_ty(&self) -> Op {
        self.ty
    }

    pub fn get_rid(&self) -> ReqId {
        self.rid
    }

    pub fn get_tid(&self) -> TxId {
        self.tid
    }

    /// The payload with a single trailing NUL stripped. Many payloads are
    /// C-string terminated on the wire but higher layers want logical strings.
    pub fn get_data(&self) -> &[u8] {
        let len = self.data.len();
        if len > 0 && self.data[len - 1] == b'\0' {
            &self.data[..len - 1]
        } else {
            &self.data
        }
    }

    /// The payload exactly as it appeared on the wire
    pub fn get_data_raw(&self) -> &[u8] {
        &self.data
    }

    /// Output the whole frame as a vector of bytes
    pub fn marshal(&self) -> Vec<u8> {
        let header = Header {
            ty: self.ty,
            req_id: self.rid,
            tx_id: self.tid,
            len: self.len as u32,
        };
        let mut ret = header.to_vec();
        ret.extend_from_slice(&self.data);
        ret
    }
}

/// What the consumer of a `Parser` should do next
#[derive(Clone, Debug, PartialEq)]
pub enum ParseState {
    /// feed in at most this many more bytes
    Continue(usize),
    /// a frame completed; extract the result and allocate a new parser
    Done(Result<Packet>),
}

enum State {
    ReadingHeader(usize, [u8; HEADER_SIZE]),
    ReadingBody(Packet),
    Finished(Result<Packet>),
}

/// An incremental frame parser. Single owner, advanced by `input`, bounded
/// buffers: 16 bytes of header plus at most `XENSTORE_PAYLOAD_MAX` of body.
pub struct Parser {
    state: State,
}

impl Parser {
    pub fn new() -> Parser {
        Parser { state: State::ReadingHeader(0, [0; HEADER_SIZE]) }
    }

    pub fn state(&self) -> ParseState {
        match self.state {
            State::ReadingHeader(received, _) => ParseState::Continue(HEADER_SIZE - received),
            State::ReadingBody(ref pkt) => ParseState::Continue(pkt.len - pkt.data.len()),
            State::Finished(ref result) => ParseState::Done(result.clone()),
        }
    }

    /// Feed a fragment in. Callers size their reads from `state`; bytes
    /// beyond what the current state needs are ignored. Once a frame has
    /// finished, so has the parser: further input is discarded.
    pub fn input(&mut self, bytes: &[u8]) {
        let next = match self.state {
            State::ReadingHeader(ref mut received, ref mut buf) => {
                let take = cmp::min(HEADER_SIZE - *received, bytes.len());
                buf[*received..*received + take].copy_from_slice(&bytes[..take]);
                *received += take;
                if *received < HEADER_SIZE {
                    return;
                }
                Parser::parse_header(&buf[..])
            }
            State::ReadingBody(ref mut pkt) => {
                let take = cmp::min(pkt.len - pkt.data.len(), bytes.len());
                pkt.data.extend_from_slice(&bytes[..take]);
                if pkt.data.len() < pkt.len {
                    return;
                }
                State::Finished(Ok(pkt.clone()))
            }
            State::Finished(_) => return,
        };
        self.state = next;
    }

    fn parse_header(bytes: &[u8]) -> State {
        match Header::parse(bytes) {
            Ok(header) => {
                let len = header.body_len();
                let pkt = Packet {
                    ty: header.ty,
                    rid: header.req_id,
                    tid: header.tx_id,
                    len: len,
                    data: Vec::with_capacity(len),
                };
                if len == 0 {
                    State::Finished(Ok(pkt))
                } else {
                    State::ReadingBody(pkt)
                }
            }
            Err(e) => State::Finished(Err(e)),
        }
    }
}

/// Frames `Packet`s over a tokio transport
pub struct PacketCodec;

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Packet>> {
        // We must have at least header size
        if buf.len() < HEADER_SIZE {
            // not a full message
            return Ok(None);
        }

        let header = Header::parse(&buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{}", e)))?;
        let len = header.body_len();

        // We must get the full body size
        if buf.len() < HEADER_SIZE + len {
            // not a full message
            return Ok(None);
        }

        buf.split_to(HEADER_SIZE);
        let body = buf.split_to(len);

        Ok(Some(Packet {
                    ty: header.ty,
                    rid: header.req_id,
                    tid: header.tx_id,
                    len: len,
                    data: body.to_vec(),
                }))
    }
}

impl Encoder for PacketCodec {
    type Item = Packet;
    type Error = io::Error;

    fn encode(&mut self, msg: Packet, buf: &mut BytesMut) -> io::Result<()> {
        buf.extend(msg.marshal());
        Ok(())
    }
}

#[cfg(test)]
impl Arbitrary for Op {
    fn arbitrary<G: Gen>(g: &mut G) -> Op {
        let ops = Op::all();
        ops[g.gen_range(0, ops.len())]
    }
}

#[cfg(test)]
impl Arbitrary for Header {
    fn arbitrary<G: Gen>(g: &mut G) -> Header {
        Header {
            ty: Op::arbitrary(g),
            req_id: u32::arbitrary(g),
            tx_id: u32::arbitrary(g),
            len: u32::arbitrary(g),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Packet {
    fn arbitrary<G: Gen>(g: &mut G) -> Packet {
        let size = g.gen_range(0, XENSTORE_PAYLOAD_MAX + 1);
        let mut data = Vec::with_capacity(size);
        for _ in 0..size {
            data.push(g.gen());
        }
        Packet::create(u32::arbitrary(g), u32::arbitrary(g), Op::arbitrary(g), data)
    }
}
