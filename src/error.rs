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

use std::error;
use std::fmt;
use std::io;
use std::result;
use wire;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// the peer used an operation id outside the protocol registry
    UnknownOp(u32),
    /// a payload could not be split into the fields its operation requires
    ParseFailure(String),
    /// a path broke the length or emptiness rules; carries path and reason
    InvalidPath(String, String),
    /// a path element contained a byte outside the permitted alphabet
    InvalidChar(char),
    /// the server reported a missing key
    ENOENT(String),
    /// the server asked for the transaction to be retried
    EAGAIN(String),
    /// the server rejected the request as malformed
    EINVAL(String),
    /// the underlying channel failed
    EIO(String),
    /// the server reported an error this crate does not classify
    Unexpected(String),
    /// a reply carried a different operation than the request
    PacketMismatch(wire::Op, wire::Op),
    /// the underlying channel returned zero bytes
    EndOfStream,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UnknownOp(id) => write!(f, "Unknown xenstore operation id: {}", id),
            Error::ParseFailure(ref msg) => write!(f, "Failed to parse payload: {}", msg),
            Error::InvalidPath(ref path, ref reason) => {
                write!(f, "Invalid path {:?}: {}", path, reason)
            }
            Error::InvalidChar(c) => write!(f, "Invalid character {:?} in path element", c),
            Error::ENOENT(ref msg) => write!(f, "{}: {}", wire::XSE_ENOENT, msg),
            Error::EAGAIN(ref msg) => write!(f, "{}: {}", wire::XSE_EAGAIN, msg),
            Error::EINVAL(ref msg) => write!(f, "{}: {}", wire::XSE_EINVAL, msg),
            Error::EIO(ref msg) => write!(f, "{}: {}", wire::XSE_EIO, msg),
            Error::Unexpected(ref msg) => write!(f, "Unexpected server error: {}", msg),
            Error::PacketMismatch(sent, received) => {
                write!(f,
                       "Unexpected packet: sent {:?} but the reply was {:?}",
                       sent,
                       received)
            }
            Error::EndOfStream => write!(f, "The xenstore connection has closed"),
        }
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        match *self {
            Error::UnknownOp(_) => "unknown operation id",
            Error::ParseFailure(_) => "failed to parse payload",
            Error::InvalidPath(_, _) => "invalid path",
            Error::InvalidChar(_) => "invalid character in path element",
            Error::ENOENT(_) => wire::XSE_ENOENT,
            Error::EAGAIN(_) => wire::XSE_EAGAIN,
            Error::EINVAL(_) => wire::XSE_EINVAL,
            Error::EIO(_) => wire::XSE_EIO,
            Error::Unexpected(_) => "unexpected server error",
            Error::PacketMismatch(_, _) => "reply did not match the request",
            Error::EndOfStream => "the connection has closed",
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::EIO(format!("{}", err))
    }
}

pub type Result<T> = result::Result<T, Error>;
