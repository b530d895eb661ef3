// Wallet-level libraries for bitcoin protocol by LNP/BP Association
//
// Written in 2020-2022 by
//     Dr. Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// This software is distributed without any warranty.
//
// You should have received a copy of the Apache-2.0 License
// along with this software.
// If not, see <https://opensource.org/licenses/Apache-2.0>.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
#[cfg(feature = "strict_encoding")]
use std::io;
use std::ops::Deref;
use std::str::FromStr;

#[cfg(feature = "strict_encoding")]
use strict_encoding::{self, StrictDecode, StrictEncode};

use crate::{ChildNumber, Error};

/// Path prefix telling whether a path leads to a private or a public key.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
pub enum Prefix {
    /// Path capable of producing private keys, `m`
    #[display("m")]
    Private,

    /// Public-only path, `M`
    #[display("M")]
    Public,
}

impl Prefix {
    /// Returns character used to render the prefix
    #[inline]
    pub const fn symbol(self) -> char {
        match self {
            Prefix::Private => 'm',
            Prefix::Public => 'M',
        }
    }

    /// Detects prefix from its symbol
    pub const fn from_char(c: char) -> Option<Prefix> {
        match c {
            'm' => Some(Prefix::Private),
            'M' => Some(Prefix::Public),
            _ => None,
        }
    }

    /// Detects prefix from a path token, which must consist of the prefix
    /// symbol only
    pub fn from_token(token: &str) -> Option<Prefix> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Prefix::from_char(c),
            _ => None,
        }
    }

    /// Returns whether the prefix denotes a private-key capable path
    #[inline]
    pub const fn has_private_key(self) -> bool { matches!(self, Prefix::Private) }
}

impl From<bool> for Prefix {
    #[inline]
    fn from(has_private_key: bool) -> Self {
        if has_private_key {
            Prefix::Private
        } else {
            Prefix::Public
        }
    }
}

/// Hierarchical deterministic key derivation path.
///
/// The path is an immutable sequence of [`ChildNumber`] segments together with
/// a flag telling whether it denotes a path to a private key (rendered with
/// `m` prefix) or a public-only path (`M` prefix). The flag carries intent
/// only and does not restrict which segments may be present. A path may be
/// empty, in which case it is rendered as a bare prefix.
///
/// Operations which look like modifications ([`HdPath::extend`],
/// [`HdPath::parent`], [`HdPath::ancestors`]) always return new paths. Read
/// access to the segments is provided through [`Deref`] into a slice, so the
/// usual `len()`, `is_empty()`, `get()`, `iter()` and indexing work, while no
/// mutable access is ever exposed.
///
/// Equality, ordering and hashing consider segments only: `m/44H` and `M/44H`
/// are equal paths, and the prefix has to be compared explicitly with
/// [`HdPath::prefix`] where it matters.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
#[derive(Clone, Debug)]
pub struct HdPath {
    segments: Cow<'static, [ChildNumber]>,
    has_private_key: bool,
}

impl HdPath {
    pub(crate) const fn from_static(
        has_private_key: bool,
        segments: &'static [ChildNumber],
    ) -> HdPath {
        HdPath {
            segments: Cow::Borrowed(segments),
            has_private_key,
        }
    }

    /// Constructs path for a private (if `has_private_key` is set) or public
    /// key out of a sequence of segments.
    pub fn new(has_private_key: bool, segments: impl IntoIterator<Item = ChildNumber>) -> HdPath {
        HdPath {
            segments: Cow::Owned(segments.into_iter().collect()),
            has_private_key,
        }
    }

    /// Constructs path with a given prefix out of a sequence of segments.
    #[inline]
    pub fn of(prefix: Prefix, segments: impl IntoIterator<Item = ChildNumber>) -> HdPath {
        HdPath::new(prefix.has_private_key(), segments)
    }

    /// Constructs public key path (`M/...`). Use `HdPath::M([])` for an empty
    /// path.
    #[allow(non_snake_case)]
    #[inline]
    pub fn M(segments: impl IntoIterator<Item = ChildNumber>) -> HdPath {
        HdPath::of(Prefix::Public, segments)
    }

    /// Constructs private key path (`m/...`). Use `HdPath::m([])` for an empty
    /// path.
    #[inline]
    pub fn m(segments: impl IntoIterator<Item = ChildNumber>) -> HdPath {
        HdPath::of(Prefix::Private, segments)
    }

    /// Parses path from its human-readable form, like `m / 44H / 0H / 0H / 1`.
    ///
    /// The first token is treated as a prefix if it is exactly `m` or `M`;
    /// otherwise the path is public and all tokens are segments. Whitespace
    /// around tokens and empty tokens produced by stray separators are
    /// ignored, so an empty string is parsed into an empty public path.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MalformedPath`] on the first token which can't be
    /// parsed as a [`ChildNumber`].
    pub fn parse(s: &str) -> Result<HdPath, Error> {
        let mut tokens = Vec::new();
        let mut offset = 0usize;
        for raw in s.split('/') {
            let position = offset + raw.len() - raw.trim_start().len();
            tokens.push((raw.trim(), position));
            offset += raw.len() + 1;
        }

        let prefix = tokens
            .first()
            .and_then(|(token, _)| Prefix::from_token(token));
        let segments = tokens
            .into_iter()
            .skip(usize::from(prefix.is_some()))
            .filter(|(token, _)| !token.is_empty())
            .map(|(token, position)| {
                ChildNumber::parse_token(token).map_err(|reason| {
                    log::debug!("rejected derivation path `{}` at byte {}: {}", s, position, reason);
                    Error::malformed(token, position, reason)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let path = HdPath::of(prefix.unwrap_or(Prefix::Public), segments);
        log::trace!("parsed derivation path {}", path);
        Ok(path)
    }

    /// Reconstructs path from a list of packed segments as it is stored by
    /// wallet serialization formats (see [`ChildNumber::pack`]).
    ///
    /// The packed form does not record whether the path leads to a private
    /// key, so the returned path is always public.
    pub fn deserialize(packed: impl IntoIterator<Item = i32>) -> HdPath {
        let path = HdPath::M(packed.into_iter().map(ChildNumber::from_packed));
        log::trace!("deserialized derivation path {}", path);
        path
    }

    /// Returns list of packed segments, which can be converted back with
    /// [`HdPath::deserialize`]. Prefix is not a part of the output.
    pub fn serialize(&self) -> Vec<i32> { self.segments.iter().map(|child| child.pack()).collect() }

    /// Returns prefix of this path
    #[inline]
    pub fn prefix(&self) -> Prefix { Prefix::from(self.has_private_key) }

    /// Detects whether this is a path to a private key (`m`)
    #[inline]
    pub fn has_private_key(&self) -> bool { self.has_private_key }

    /// Returns path segments as a slice
    #[inline]
    pub fn as_slice(&self) -> &[ChildNumber] { &self.segments }

    /// Returns segment at a given position.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::IndexOutOfBounds`] if the path is shorter.
    pub fn segment(&self, index: usize) -> Result<ChildNumber, Error> {
        self.segments
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                index,
                len: self.segments.len(),
            })
    }

    /// Returns new path with given segments appended after the segments of
    /// this path. The prefix of this path is kept.
    ///
    /// Accepts any ordered sequence of segments, including a reference to
    /// another [`HdPath`]; the prefix of such a path is ignored.
    pub fn extend(&self, children: impl IntoIterator<Item = ChildNumber>) -> HdPath {
        HdPath::new(self.has_private_key, self.segments.iter().copied().chain(children))
    }

    /// Returns new path with a single segment appended.
    #[inline]
    pub fn child(&self, child: ChildNumber) -> HdPath { self.extend([child]) }

    /// Returns parent path, i.e. the path without its last segment.
    ///
    /// Parent of a single-segment path and parent of an empty path are both
    /// the empty path with the same prefix. Check `is_empty()` where the root
    /// needs to be told apart.
    pub fn parent(&self) -> HdPath {
        let len = self.segments.len().saturating_sub(1);
        HdPath::new(self.has_private_key, self.segments[..len].iter().copied())
    }

    /// Returns all non-empty paths leading to this one, starting from the
    /// shortest. This path itself is included last if `include_self` is set.
    /// For an empty path the result is always empty.
    pub fn ancestors(&self, include_self: bool) -> Vec<HdPath> {
        let end = self.segments.len() + usize::from(include_self);
        (1..end)
            .map(|len| HdPath::new(self.has_private_key, self.segments[..len].iter().copied()))
            .collect()
    }
}

impl Default for HdPath {
    /// Empty public path, `M`
    fn default() -> Self { HdPath::from_static(false, &[]) }
}

impl PartialEq for HdPath {
    fn eq(&self, other: &Self) -> bool { self.segments == other.segments }
}

impl Eq for HdPath {}

impl PartialOrd for HdPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for HdPath {
    fn cmp(&self, other: &Self) -> Ordering { self.segments.cmp(&other.segments) }
}

impl Hash for HdPath {
    fn hash<H: Hasher>(&self, state: &mut H) { self.segments.hash(state) }
}

// This is needed to get methods line `len()` and `is_empty()` working.
impl Deref for HdPath {
    type Target = [ChildNumber];

    #[inline]
    fn deref(&self) -> &Self::Target { &self.segments }
}

impl AsRef<[ChildNumber]> for HdPath {
    #[inline]
    fn as_ref(&self) -> &[ChildNumber] { &self.segments }
}

impl Display for HdPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.prefix(), f)?;
        for segment in self.segments.iter() {
            f.write_str("/")?;
            Display::fmt(segment, f)?;
        }
        Ok(())
    }
}

impl FromStr for HdPath {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { HdPath::parse(s) }
}

impl IntoIterator for HdPath {
    type Item = ChildNumber;
    type IntoIter = std::vec::IntoIter<ChildNumber>;

    fn into_iter(self) -> Self::IntoIter { self.segments.into_owned().into_iter() }
}

impl<'path> IntoIterator for &'path HdPath {
    type Item = ChildNumber;
    type IntoIter = std::iter::Copied<std::slice::Iter<'path, ChildNumber>>;

    fn into_iter(self) -> Self::IntoIter { self.segments.iter().copied() }
}

impl FromIterator<ChildNumber> for HdPath {
    /// Collects segments into a public path
    fn from_iter<T: IntoIterator<Item = ChildNumber>>(iter: T) -> Self { HdPath::M(iter) }
}

#[cfg(feature = "strict_encoding")]
impl StrictEncode for HdPath {
    /// Encodes the packed segments only; the prefix is not persisted.
    #[inline]
    fn strict_encode<E: io::Write>(&self, e: E) -> Result<usize, strict_encoding::Error> {
        self.segments.to_vec().strict_encode(e)
    }
}

#[cfg(feature = "strict_encoding")]
impl StrictDecode for HdPath {
    /// Decoded path is always public.
    #[inline]
    fn strict_decode<D: io::Read>(d: D) -> Result<Self, strict_encoding::Error> {
        Ok(HdPath::M(Vec::<ChildNumber>::strict_decode(d)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TokenError;

    fn h(index: u32) -> ChildNumber { ChildNumber::hardened(index).unwrap() }

    fn n(index: u32) -> ChildNumber { ChildNumber::normal(index).unwrap() }

    #[test]
    fn prefix_default() {
        let path = HdPath::parse("44H/0H/0H/1/1").unwrap();
        assert!(!path.has_private_key());
        assert_eq!(path.prefix(), Prefix::Public);
        assert_eq!(path.as_slice(), &[h(44), h(0), h(0), n(1), n(1)]);
    }

    #[test]
    fn private_prefix() {
        let public = HdPath::parse("44H/0H/0H/1/1").unwrap();
        let private = HdPath::parse("m/44H/0H/0H/1/1").unwrap();
        assert!(private.has_private_key());
        assert_eq!(private.prefix(), Prefix::Private);
        assert_eq!(private.as_slice(), public.as_slice());
        assert_eq!(private, public);
        assert_ne!(private.prefix(), public.prefix());
    }

    #[test]
    fn prefix_ignored_in_comparison() {
        use std::collections::hash_map::DefaultHasher;
        use std::collections::{BTreeSet, HashSet};

        fn hash(path: &HdPath) -> u64 {
            let mut hasher = DefaultHasher::new();
            path.hash(&mut hasher);
            hasher.finish()
        }

        let private = HdPath::m([h(44)]);
        let public = HdPath::M([h(44)]);
        assert_eq!(private, public);
        assert_eq!(hash(&private), hash(&public));
        assert_eq!(private.cmp(&public), Ordering::Equal);
        assert_eq!(HdPath::m([]), HdPath::M([]));
        assert_ne!(HdPath::m([h(44)]), HdPath::m([n(44)]));
        assert!(HdPath::M([n(1)]) < HdPath::m([h(1)]));
        assert!(HdPath::m([h(44)]) < HdPath::M([h(44), n(0)]));

        let set = [private.clone(), public.clone()].into_iter().collect::<HashSet<_>>();
        assert_eq!(set.len(), 1);
        let set = [private, public].into_iter().collect::<BTreeSet<_>>();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn whitespace_and_separators() {
        let path = HdPath::parse(" m / 44H / 0H / 0H / 1 / 1 ").unwrap();
        assert_eq!(path, HdPath::m([h(44), h(0), h(0), n(1), n(1)]));
        assert_eq!(HdPath::parse("M//44h/").unwrap(), HdPath::M([h(44)]));
        assert_eq!(HdPath::parse("/44'/1").unwrap(), HdPath::M([h(44), n(1)]));
        assert_eq!(HdPath::parse("m").unwrap(), HdPath::m([]));
        assert_eq!(HdPath::parse(" M ").unwrap(), HdPath::M([]));
    }

    #[test]
    fn empty_path() {
        let empty = HdPath::parse("").unwrap();
        assert_eq!(empty, HdPath::M([]));
        assert_eq!(empty.prefix(), Prefix::Public);
        assert_eq!(empty, HdPath::default());
        assert!(!HdPath::default().has_private_key());
        assert_eq!(HdPath::M([]).to_string(), "M");
        assert_eq!(HdPath::m([]).to_string(), "m");
        assert!(HdPath::M([]).is_empty());
        assert_eq!(HdPath::parse("   ").unwrap(), HdPath::M([]));
    }

    #[test]
    fn malformed() {
        assert_eq!(
            HdPath::parse("m/abc"),
            Err(Error::malformed("abc", 2, TokenError::InvalidDigits))
        );
        assert_eq!(
            HdPath::parse("m/44H/ 2147483648"),
            Err(Error::malformed("2147483648", 7, TokenError::IndexOverflow))
        );
        assert_eq!(
            HdPath::parse("m/M/1"),
            Err(Error::malformed("M", 2, TokenError::InvalidDigits))
        );
        assert_eq!(
            HdPath::parse("0/-1"),
            Err(Error::malformed("-1", 2, TokenError::InvalidDigits))
        );
        assert!(HdPath::parse("mm/1").is_err());
        assert!(HdPath::parse("1/m").is_err());
    }

    #[test]
    fn text_round_trip() {
        for s in ["m/44H/0H/0H/1/1", "M/84H/1H/0H/0/5", "m", "M", "M/0", "m/2147483647H/0"] {
            assert_eq!(HdPath::parse(s).unwrap().to_string(), s);
        }
        let path = HdPath::m([h(86), h(0), h(0), n(0), n(7)]);
        assert_eq!(path.to_string().parse::<HdPath>().unwrap(), path);
        assert_eq!(format!("{:#}", path), "m/86'/0'/0'/0/7");
        assert_eq!(format!("{:#}", path).parse::<HdPath>().unwrap(), path);
    }

    #[test]
    fn deserialize() {
        let packed = [0x8000_002Cu32 as i32, 0, 0, 1, 1];
        let path = HdPath::deserialize(packed);
        assert!(!path.has_private_key());
        assert_eq!(path.as_slice(), &[h(44), n(0), n(0), n(1), n(1)]);
        assert_eq!(path.serialize(), packed);

        let path = HdPath::deserialize(vec![-1, i32::MIN]);
        assert!(!path.has_private_key());
        assert_eq!(path.to_string(), "M/2147483647H/0H");
        assert_eq!(HdPath::m([h(0), n(3)]).serialize(), vec![i32::MIN, 3]);
        assert_eq!(HdPath::deserialize([]), HdPath::M([]));
    }

    #[test]
    fn parent() {
        let empty = HdPath::m([]);
        assert_eq!(empty.parent(), empty);
        assert_eq!(empty.parent().parent(), empty);

        let single = HdPath::m([h(44)]);
        assert!(single.parent().is_empty());
        assert!(single.parent().has_private_key());

        let path = HdPath::M([h(44), h(0), n(1)]);
        assert_eq!(path.parent(), HdPath::M([h(44), h(0)]));
        assert_eq!(path.parent().parent(), HdPath::M([h(44)]));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn ancestors() {
        let path = HdPath::m([h(44), h(0), h(0)]);
        assert_eq!(path.ancestors(false), vec![HdPath::m([h(44)]), HdPath::m([h(44), h(0)])]);
        assert_eq!(path.ancestors(true), vec![
            HdPath::m([h(44)]),
            HdPath::m([h(44), h(0)]),
            HdPath::m([h(44), h(0), h(0)]),
        ]);
        assert!(HdPath::M([]).ancestors(false).is_empty());
        assert!(HdPath::M([]).ancestors(true).is_empty());
        assert!(HdPath::M([n(1)]).ancestors(false).is_empty());
        assert_eq!(HdPath::M([n(1)]).ancestors(true), vec![HdPath::M([n(1)])]);
    }

    #[test]
    fn extend() {
        let base = HdPath::m([h(44), h(0)]);
        let child = base.child(h(0));
        assert!(child.has_private_key());
        assert_eq!(child.len(), base.len() + 1);
        assert_eq!(base.len(), 2);

        let relative = HdPath::M([n(1), n(5)]);
        let full = child.extend(&relative);
        assert_eq!(full, HdPath::m([h(44), h(0), h(0), n(1), n(5)]));
        assert_eq!(relative.extend(&base), HdPath::M([n(1), n(5), h(44), h(0)]));
        assert_eq!(base.extend(vec![n(2), n(3)]), HdPath::m([h(44), h(0), n(2), n(3)]));
        assert_eq!(base.extend([]), base);
    }

    #[test]
    fn sequence_access() {
        let path = HdPath::M([h(84), h(0), n(9)]);
        assert_eq!(path[2], n(9));
        assert_eq!(path.get(3), None);
        assert_eq!(path.first(), Some(&h(84)));
        assert_eq!(path.segment(1), Ok(h(0)));
        assert_eq!(path.segment(3), Err(Error::IndexOutOfBounds { index: 3, len: 3 }));
        assert_eq!(path.iter().filter(|c| c.is_hardened()).count(), 2);
        assert_eq!((&path).into_iter().collect::<Vec<_>>(), vec![h(84), h(0), n(9)]);
        assert_eq!(path.clone().into_iter().count(), 3);
        assert_eq!(path.iter().copied().collect::<HdPath>(), path);
    }

    #[test]
    fn prefix_symbols() {
        assert_eq!(Prefix::from_char('m'), Some(Prefix::Private));
        assert_eq!(Prefix::from_char('M'), Some(Prefix::Public));
        assert_eq!(Prefix::from_char('x'), None);
        assert_eq!(Prefix::from_token("m"), Some(Prefix::Private));
        assert_eq!(Prefix::from_token("mm"), None);
        assert_eq!(Prefix::from_token(""), None);
        assert_eq!(Prefix::Private.symbol(), 'm');
        assert_eq!(Prefix::Public.to_string(), "M");
        assert_eq!(HdPath::of(Prefix::Private, [n(0)]), HdPath::new(true, [n(0)]));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_json_shape() {
        let path = HdPath::m([h(44), n(0)]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"{"segments":[2147483692,0],"hasPrivateKey":true}"#);
        let decoded: HdPath = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, path);
        assert!(decoded.has_private_key());

        let public: HdPath =
            serde_json::from_str(r#"{"segments":[2147483732],"hasPrivateKey":false}"#).unwrap();
        assert_eq!(public.to_string(), "M/84H");

        assert_eq!(serde_json::to_string(&Prefix::Private).unwrap(), r#""private""#);
        assert_eq!(serde_json::to_string(&Prefix::Public).unwrap(), r#""public""#);
        assert_eq!(serde_json::from_str::<Prefix>(r#""public""#).unwrap(), Prefix::Public);
    }

    #[cfg(feature = "strict_encoding")]
    #[test]
    fn strict_encoding() {
        let path = HdPath::m([h(44), h(0), n(1)]);
        let mut data = vec![];
        path.strict_encode(&mut data).unwrap();
        let decoded = HdPath::strict_decode(&data[..]).unwrap();
        assert!(!decoded.has_private_key());
        assert_eq!(decoded.as_slice(), path.as_slice());
    }
}
