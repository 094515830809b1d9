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

use std::fmt;
use super::error::{Error, Result};

#[cfg(test)]
use self::quickcheck::{Arbitrary, Gen};

/// Longest encoded form a path may take on the wire
const MAX_PATH: usize = 1024;

/// A store path: an ordered sequence of elements over `[A-Za-z0-9_\-@]`.
/// The empty path is the root itself. Whether a path hangs off the root or
/// off some other node is the business of `name::Name`, not of `Path`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Path(Vec<String>);

fn check_element(path: &str, element: &str) -> Result<()> {
    if element.is_empty() {
        return Err(Error::InvalidPath(path.to_owned(),
                                      "empty path element is not allowed".to_owned()));
    }

    for c in element.chars() {
        match c {
            'a'...'z' | 'A'...'Z' | '0'...'9' | '_' | '-' | '@' => {}
            _ => {
                return Err(Error::InvalidChar(c));
            }
        }
    }

    Ok(())
}

impl Path {
    /// The root
    pub fn empty() -> Path {
        Path(Vec::new())
    }

    pub fn of_string(s: &str) -> Result<Path> {
        if s == "" {
            return Err(Error::InvalidPath(s.to_owned(), "empty path is not allowed".to_owned()));
        }

        if s.len() > MAX_PATH {
            return Err(Error::InvalidPath(s.to_owned(),
                                          format!("path must be at most {} bytes", MAX_PATH)));
        }

        // a leading / marks absoluteness, which the caller tracks
        let rest = if s.starts_with('/') { &s[1..] } else { s };
        if rest.is_empty() {
            return Ok(Path::empty());
        }

        let mut elements = Vec::new();
        for element in rest.split('/') {
            check_element(s, element)?;
            elements.push(element.to_owned());
        }

        Ok(Path(elements))
    }

    pub fn elements(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop the last element. The root is its own parent.
    pub fn dirname(&self) -> Path {
        let mut elements = self.0.clone();
        elements.pop();
        Path(elements)
    }

    pub fn basename(&self) -> Option<&str> {
        self.0.last().map(|e| e.as_str())
    }

    pub fn push(&self, element: &str) -> Result<Path> {
        check_element(element, element)?;
        let mut elements = self.0.clone();
        elements.push(element.to_owned());
        Ok(Path(elements))
    }

    pub fn concat(&self, other: &Path) -> Path {
        let mut elements = self.0.clone();
        elements.extend(other.0.iter().cloned());
        Path(elements)
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Strip `prefix` off the front
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if self.starts_with(prefix) {
            Some(Path(self.0[prefix.0.len()..].to_vec()))
        } else {
            None
        }
    }

    /// Fold a function over the elements, left to right
    pub fn walk<A, F>(&self, mut f: F, init: A) -> A
        where F: FnMut(A, &str) -> A
    {
        let mut acc = init;
        for element in &self.0 {
            acc = f(acc, element);
        }
        acc
    }

    /// Fold a function over every non-empty prefix, shortest first
    pub fn fold<A, F>(&self, mut f: F, init: A) -> A
        where F: FnMut(A, &Path) -> A
    {
        let mut acc = init;
        let mut prefix = Vec::new();
        for element in &self.0 {
            prefix.push(element.clone());
            acc = f(acc, &Path(prefix.clone()));
        }
        acc
    }

    /// Visit every non-empty prefix, shortest first
    pub fn iter<F>(&self, mut f: F)
        where F: FnMut(&Path)
    {
        self.fold(|_, prefix| f(prefix), ());
    }

    pub fn common_prefix(&self, other: &Path) -> Path {
        let mut elements = Vec::new();
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            if a != b {
                break;
            }
            elements.push(a.clone());
        }
        Path(elements)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

#[cfg(test)]
fn arb_element<G: Gen>(g: &mut G) -> String {
    const CHARS: &'static [u8] =
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-@";
    let size = g.gen_range(1, 12);
    let mut s = String::with_capacity(size);
    for _ in 0..size {
        s.push(CHARS[g.gen_range(0, CHARS.len())] as char);
    }
    s
}

#[cfg(test)]
impl Arbitrary for Path {
    fn arbitrary<G: Gen>(g: &mut G) -> Path {
        let elements = g.gen_range(0, 6);
        Path((0..elements).map(|_| arb_element(g)).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::quickcheck::quickcheck;
    use super::super::error::Error;

    #[test]
    #[should_panic]
    fn empty_path() {
        Path::of_string("").unwrap();
    }

    #[test]
    #[should_panic]
    fn doubled_slash() {
        Path::of_string("/root//bar").unwrap();
    }

    #[test]
    #[should_panic]
    fn trailing_slash() {
        Path::of_string("/root/").unwrap();
    }

    #[test]
    fn bad_character_is_named() {
        match Path::of_string("/foo/b*r") {
            Err(Error::InvalidChar('*')) => {}
            other => panic!("expected InvalidChar, got {:?}", other),
        }
    }

    #[test]
    #[should_panic]
    fn long_path() {
        let mut s = String::new();
        for _ in 0..(super::MAX_PATH + 1) {
            s.push('a');
        }

        Path::of_string(&s).unwrap();
    }

    #[test]
    fn max_path() {
        let mut s = String::new();
        for _ in 0..super::MAX_PATH {
            s.push('a');
        }

        Path::of_string(&s).unwrap();
    }

    #[test]
    fn root_is_empty() {
        let root = Path::of_string("/").unwrap();

        assert!(root.is_empty());
        assert_eq!(root.to_string(), "");
        assert_eq!(root.basename(), None);
        assert_eq!(root.dirname(), root);
    }

    #[test]
    fn leading_slash_is_dropped() {
        let with = Path::of_string("/local/domain/0").unwrap();
        let without = Path::of_string("local/domain/0").unwrap();

        assert_eq!(with, without);
        assert_eq!(with.to_string(), "local/domain/0");
    }

    #[test]
    fn dirname_and_basename() {
        let path = Path::of_string("/root/filesystem/test").unwrap();

        assert_eq!(path.basename(), Some("test"));
        assert_eq!(path.dirname(), Path::of_string("/root/filesystem").unwrap());
        assert_eq!(path.dirname().dirname(), Path::of_string("/root").unwrap());
        assert_eq!(path.dirname().dirname().dirname(), Path::empty());
    }

    #[test]
    fn prefixes_shortest_first() {
        let path = Path::of_string("/a/b/c").unwrap();
        let mut seen = Vec::new();
        path.iter(|prefix| seen.push(prefix.to_string()));

        assert_eq!(seen, vec!["a", "a/b", "a/b/c"]);
    }

    #[test]
    fn walk_concatenates() {
        let path = Path::of_string("/a/b/c").unwrap();
        let flat = path.walk(|mut acc: String, element| {
                                 acc.push_str(element);
                                 acc
                             },
                             String::new());

        assert_eq!(flat, "abc");
    }

    #[test]
    fn common_prefix() {
        let a = Path::of_string("/a/b/c/d").unwrap();
        let b = Path::of_string("/a/b/x").unwrap();

        assert_eq!(a.common_prefix(&b), Path::of_string("/a/b").unwrap());
        assert_eq!(a.common_prefix(&Path::empty()), Path::empty());
    }

    #[test]
    fn strip_prefix() {
        let full = Path::of_string("/a/b/c").unwrap();
        let base = Path::of_string("/a/b").unwrap();
        let other = Path::of_string("/x").unwrap();

        assert_eq!(full.strip_prefix(&base), Some(Path::of_string("c").unwrap()));
        assert_eq!(full.strip_prefix(&other), None);
        assert_eq!(full.strip_prefix(&Path::empty()), Some(full.clone()));
    }

    #[test]
    fn path_strings_idempotent() {
        fn prop(path: Path) -> bool {
            // the root renders as the empty string, which only parses in
            // its leading slash form
            if path.is_empty() {
                return Path::of_string("/").unwrap() == path;
            }

            let rendered = path.to_string();
            Path::of_string(&rendered).unwrap() == path &&
            Path::of_string(&format!("/{}", rendered)).unwrap() == path
        }

        quickcheck(prop as fn(Path) -> bool);
    }

    #[test]
    fn push_validates() {
        let base = Path::of_string("/a").unwrap();

        assert_eq!(base.push("b").unwrap(), Path::of_string("/a/b").unwrap());
        assert!(base.push("").is_err());
        assert!(base.push("b/c").is_err());
    }
}
