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

use rand::Rng;
use std::fmt;

/// An opaque cookie tagging a watch registration. The server echoes it
/// verbatim with every matching watch event. The part before the first `:`
/// is an internal cookie; the part after it belongs to the user.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Token(String);

impl Token {
    pub fn from_string(s: &str) -> Token {
        Token(s.to_owned())
    }

    /// The user supplied part, after the internal cookie
    pub fn user_string(&self) -> &str {
        match self.0.find(':') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mints watch tokens with a fresh internal cookie.
pub struct TokenFactory<R: Rng + ?Sized> {
    rng: Box<R>,
}

impl<R: Rng + ?Sized> TokenFactory<R> {
    pub fn new(rng: Box<R>) -> TokenFactory<R> {
        TokenFactory { rng: rng }
    }

    pub fn fresh(&mut self, user: &str) -> Token {
        Token(format!("{}:{}", self.rng.next_u32(), user))
    }
}
