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
use super::error::Result;
use super::path::Path;

#[cfg(test)]
use self::quickcheck::{Arbitrary, Gen};

/// Something a client can address or watch: one of the two predefined
/// domain lifecycle names, or a store path.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Name {
    IntroduceDomain,
    ReleaseDomain,
    Absolute(Path),
    Relative(Path),
}

impl Name {
    pub fn of_string(s: &str) -> Result<Name> {
        match s {
            "@introduceDomain" => Ok(Name::IntroduceDomain),
            "@releaseDomain" => Ok(Name::ReleaseDomain),
            _ => {
                if s.starts_with('/') {
                    Path::of_string(s).map(Name::Absolute)
                } else {
                    Path::of_string(s).map(Name::Relative)
                }
            }
        }
    }

    pub fn is_absolute(&self) -> bool {
        match *self {
            Name::Absolute(_) => true,
            _ => false,
        }
    }

    /// The store path behind this name, if it has one
    pub fn to_path(&self) -> Option<&Path> {
        match *self {
            Name::Absolute(ref path) | Name::Relative(ref path) => Some(path),
            Name::IntroduceDomain | Name::ReleaseDomain => None,
        }
    }

    /// Ground a relative name against an absolute base. Anything else
    /// passes through unchanged.
    pub fn resolve(self, relative_to: &Name) -> Name {
        match (self, relative_to) {
            (Name::Relative(path), &Name::Absolute(ref base)) => {
                Name::Absolute(base.concat(&path))
            }
            (name, _) => name,
        }
    }

    /// Express an absolute name relative to an absolute base when the base
    /// is a prefix of it. Anything else passes through unchanged.
    pub fn relative(self, base: &Name) -> Name {
        match (self, base) {
            (Name::Absolute(path), &Name::Absolute(ref base_path)) => {
                match path.strip_prefix(base_path) {
                    Some(rest) => Name::Relative(rest),
                    None => Name::Absolute(path),
                }
            }
            (name, _) => name,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Name::IntroduceDomain => write!(f, "@introduceDomain"),
            Name::ReleaseDomain => write!(f, "@releaseDomain"),
            Name::Absolute(ref path) => write!(f, "/{}", path),
            Name::Relative(ref path) => write!(f, "{}", path),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Name {
    fn arbitrary<G: Gen>(g: &mut G) -> Name {
        match g.gen_range(0, 4) {
            0 => Name::IntroduceDomain,
            1 => Name::ReleaseDomain,
            2 => Name::Absolute(Path::arbitrary(g)),
            _ => {
                // the empty relative name has no string form
                let mut path = Path::arbitrary(g);
                while path.is_empty() {
                    path = Path::arbitrary(g);
                }
                Name::Relative(path)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::quickcheck::quickcheck;
    use super::super::path::Path;

    #[test]
    fn predefined_names_roundtrip() {
        for s in &["@introduceDomain", "@releaseDomain"] {
            let name = Name::of_string(s).unwrap();
            assert_eq!(name.to_path(), None);
            assert_eq!(name.to_string(), *s);
        }
    }

    #[test]
    fn leading_slash_selects_absolute() {
        let abs = Name::of_string("/local/domain/7").unwrap();
        let rel = Name::of_string("local/domain/7").unwrap();

        assert!(abs.is_absolute());
        assert!(!rel.is_absolute());
        assert_eq!(abs.to_string(), "/local/domain/7");
        assert_eq!(rel.to_string(), "local/domain/7");
    }

    #[test]
    fn root_roundtrips() {
        let root = Name::of_string("/").unwrap();

        assert_eq!(root, Name::Absolute(Path::empty()));
        assert_eq!(root.to_string(), "/");
    }

    #[test]
    fn resolve_grounds_relative_names() {
        let base = Name::of_string("/local/domain/0").unwrap();
        let rel = Name::of_string("device/vbd").unwrap();

        assert_eq!(rel.resolve(&base).to_string(), "/local/domain/0/device/vbd");
    }

    #[test]
    fn resolve_leaves_everything_else_alone() {
        let base = Name::of_string("/local").unwrap();
        let abs = Name::of_string("/other").unwrap();
        let sentinel = Name::of_string("@releaseDomain").unwrap();

        assert_eq!(abs.clone().resolve(&base), abs);
        assert_eq!(sentinel.clone().resolve(&base), sentinel);

        // a relative base grounds nothing
        let rel = Name::of_string("device").unwrap();
        let rel_base = Name::of_string("elsewhere").unwrap();
        assert_eq!(rel.clone().resolve(&rel_base), rel);
    }

    #[test]
    fn relative_strips_a_prefix() {
        let base = Name::of_string("/local/domain/0").unwrap();
        let full = Name::of_string("/local/domain/0/device/vbd").unwrap();

        assert_eq!(full.relative(&base).to_string(), "device/vbd");
    }

    #[test]
    fn relative_without_prefix_is_unchanged() {
        let base = Name::of_string("/local/domain/0").unwrap();
        let outside = Name::of_string("/tool/xenstored").unwrap();

        assert_eq!(outside.clone().relative(&base), outside);
    }

    #[test]
    fn valid_names_roundtrip() {
        let names = ["/",
                     "/local",
                     "/local/domain/0",
                     "local/domain/0",
                     "device/vbd/768",
                     "a",
                     "/a-b_c@d/e0",
                     "@introduceDomain",
                     "@releaseDomain"];

        for s in &names {
            assert_eq!(Name::of_string(s).unwrap().to_string(), *s);
        }
    }

    #[test]
    fn resolve_inverts_relative() {
        let base = Name::of_string("/local/domain/0").unwrap();
        let full = Name::of_string("/local/domain/0/device/vbd/768").unwrap();

        let round = full.clone().relative(&base).resolve(&base);
        assert_eq!(round, full);
    }

    #[test]
    fn names_idempotent() {
        fn prop(name: Name) -> bool {
            Name::of_string(&name.to_string()) == Ok(name.clone())
        }

        quickcheck(prop as fn(Name) -> bool);
    }

    #[test]
    fn relative_then_resolve_is_identity() {
        fn prop(base_path: Path, rest: Path) -> bool {
            let base = Name::Absolute(base_path.clone());
            let full = Name::Absolute(base_path.concat(&rest));

            full.clone().relative(&base).resolve(&base) == full
        }

        quickcheck(prop as fn(Path, Path) -> bool);
    }

    #[test]
    fn relative_without_a_prefix_is_identity() {
        fn prop(name: Name, base: Name) -> bool {
            match (&name, &base) {
                (&Name::Absolute(ref path), &Name::Absolute(ref base_path))
                    if path.starts_with(base_path) => {
                    // the inversion property covers this pair
                    true
                }
                _ => name.clone().relative(&base) == name,
            }
        }

        quickcheck(prop as fn(Name, Name) -> bool);
    }

    #[test]
    fn resolve_grounds_only_relative_names() {
        fn prop(name: Name, base: Name) -> bool {
            let resolved = name.clone().resolve(&base);
            match (&name, &base) {
                (&Name::Relative(ref path), &Name::Absolute(ref base_path)) => {
                    resolved == Name::Absolute(base_path.concat(path))
                }
                _ => resolved == name,
            }
        }

        quickcheck(prop as fn(Name, Name) -> bool);
    }
}
