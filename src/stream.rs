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

use std::cmp;
use std::io::{Read, Write};
use super::error::{Error, Result};
use super::message::unmarshal;
use super::wire::{self, Op, Packet, ParseState, Parser};

/// Frames packets over a full-duplex byte channel. The blocking `Read` +
/// `Write` traits are the channel abstraction here; the codec in `wire`
/// covers event-driven transports.
///
/// The stream holds no locks: the caller keeps at most one `send` and one
/// `recv` outstanding. A `recv` abandoned mid-frame leaves the parser with
/// a partial frame, so discard the stream along with the channel.
pub struct PacketStream<T> {
    channel: T,
    parser: Parser,
}

impl<T: Read + Write> PacketStream<T> {
    pub fn new(channel: T) -> PacketStream<T> {
        PacketStream {
            channel: channel,
            parser: Parser::new(),
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.channel
    }

    /// Read one frame off the channel, however the channel fragments it
    pub fn recv(&mut self) -> Result<Packet> {
        let mut buf = [0u8; wire::XENSTORE_PAYLOAD_MAX];
        loop {
            let wanted = match self.parser.state() {
                ParseState::Done(result) => {
                    self.parser = Parser::new();
                    trace!("recv: {:?}", result);
                    return result;
                }
                ParseState::Continue(wanted) => cmp::min(wanted, buf.len()),
            };

            let count = self.channel.read(&mut buf[..wanted])?;
            if count == 0 {
                return Err(Error::EndOfStream);
            }

            debug!("recv: {:?} bytes", count);
            self.parser.input(&buf[..count]);
        }
    }

    /// Write one frame to the channel in full
    pub fn send(&mut self, pkt: &Packet) -> Result<()> {
        let bytes = pkt.marshal();
        debug!("send: {:?}, {} bytes", pkt.get_ty(), bytes.len());
        self.channel.write_all(&bytes)?;
        Ok(())
    }
}

/// Decode a reply in terms of the request that prompted it. Server errors
/// are classified; a reply for a different operation is a mismatch; a
/// payload the decoder cannot read is a parse failure carrying the hint.
pub fn response<T, F>(hint: &str, sent: &Packet, received: &Packet, decode: F) -> Result<T>
    where F: Fn(&Packet) -> Option<T>
{
    if received.get_ty() == Op::Error {
        let err = match unmarshal::string(received) {
            Some(err) => err,
            None => {
                return Err(Error::ParseFailure(format!("{}: unreadable error payload", hint)));
            }
        };
        return Err(match err.as_str() {
                       wire::XSE_ENOENT => Error::ENOENT(hint.to_owned()),
                       wire::XSE_EAGAIN => Error::EAGAIN(hint.to_owned()),
                       wire::XSE_EINVAL => Error::EINVAL(hint.to_owned()),
                       _ => Error::Unexpected(err.clone()),
                   });
    }

    if sent.get_ty() == received.get_ty() {
        return match decode(received) {
                   Some(value) => Ok(value),
                   None => {
                       Err(Error::ParseFailure(format!("{}: failed to decode payload {:?}",
                                                       hint,
                                                       received.get_data_raw())))
                   }
               };
    }

    Err(Error::PacketMismatch(sent.get_ty(), received.get_ty()))
}
