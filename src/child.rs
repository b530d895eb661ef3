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

use std::fmt::{self, Debug, Display, Formatter};
#[cfg(feature = "strict_encoding")]
use std::io;
use std::str::FromStr;

#[cfg(feature = "strict_encoding")]
use strict_encoding::{self, StrictDecode, StrictEncode};

use crate::{Error, TokenError, HARDENED_INDEX_BOUNDARY};

/// Single segment of a derivation path: a 31-bit index together with a flag
/// telling whether hardened derivation must be used.
///
/// Internally the segment is kept in its packed BIP32 form, where the most
/// significant bit is the hardened flag and the remaining 31 bits are the
/// index. Equality and ordering follow the unsigned packed value, so hardened
/// segments sort after all unhardened ones.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default)]
pub struct ChildNumber(u32);

impl ChildNumber {
    /// Unhardened segment with index 0
    pub const ZERO: ChildNumber = ChildNumber::with(0, false);

    /// Unhardened segment with index 1
    pub const ONE: ChildNumber = ChildNumber::with(1, false);

    /// Hardened segment with index 0
    pub const ZERO_HARDENED: ChildNumber = ChildNumber::with(0, true);

    /// Hardened segment with index 1
    pub const ONE_HARDENED: ChildNumber = ChildNumber::with(1, true);

    /// BIP44 purpose segment (`44H`)
    pub const PURPOSE_BIP44: ChildNumber = ChildNumber::with(44, true);

    /// BIP49 purpose segment (`49H`)
    pub const PURPOSE_BIP49: ChildNumber = ChildNumber::with(49, true);

    /// BIP84 purpose segment (`84H`)
    pub const PURPOSE_BIP84: ChildNumber = ChildNumber::with(84, true);

    /// BIP86 purpose segment (`86H`)
    pub const PURPOSE_BIP86: ChildNumber = ChildNumber::with(86, true);

    /// Index must be checked by the caller to be below
    /// [`HARDENED_INDEX_BOUNDARY`].
    const fn with(index: u32, hardened: bool) -> ChildNumber {
        if hardened {
            ChildNumber(index | HARDENED_INDEX_BOUNDARY)
        } else {
            ChildNumber(index)
        }
    }

    /// Constructs derivation segment from an index and hardened flag.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] if the index does not fit into
    /// 31 bits.
    pub fn new(index: u32, hardened: bool) -> Result<ChildNumber, Error> {
        if index >= HARDENED_INDEX_BOUNDARY {
            return Err(Error::InvalidArgument(index));
        }
        Ok(ChildNumber::with(index, hardened))
    }

    /// Constructs unhardened segment, see [`ChildNumber::new`]
    #[inline]
    pub fn normal(index: u32) -> Result<ChildNumber, Error> { ChildNumber::new(index, false) }

    /// Constructs hardened segment, see [`ChildNumber::new`]
    #[inline]
    pub fn hardened(index: u32) -> Result<ChildNumber, Error> { ChildNumber::new(index, true) }

    /// Reconstructs segment from its packed signed 32-bit form, in which the
    /// sign bit carries the hardened flag. Any value is a valid packed form.
    #[inline]
    pub const fn from_packed(packed: i32) -> ChildNumber { ChildNumber(packed as u32) }

    /// Returns packed signed 32-bit form of the segment, as it is stored by
    /// wallet serialization formats.
    #[inline]
    pub const fn pack(self) -> i32 { self.0 as i32 }

    /// Returns value used during derivation, which for normal indexes lies in
    /// range `0..`[`HARDENED_INDEX_BOUNDARY`] and for hardened in range of
    /// [`HARDENED_INDEX_BOUNDARY`]`..=u32::MAX`
    #[inline]
    pub const fn derivation_value(self) -> u32 { self.0 }

    /// Returns index with the hardened flag removed, always in range of
    /// `0..`[`HARDENED_INDEX_BOUNDARY`]
    #[inline]
    pub const fn index(self) -> u32 { self.0 & !HARDENED_INDEX_BOUNDARY }

    /// Detects whether the segment requires hardened derivation
    #[inline]
    pub const fn is_hardened(self) -> bool { self.0 & HARDENED_INDEX_BOUNDARY != 0 }

    /// Parses a single derivation path segment in form of `<index>` or
    /// `<index>H`. Hardened marker is case-insensitive; an apostrophe is also
    /// accepted in its place. Whitespace surrounding the index or the marker
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MalformedPath`] if the index is absent, is not a
    /// plain decimal number, does not fit into 31 bits, or is followed by
    /// anything other than a single hardened marker.
    pub fn parse(token: &str) -> Result<ChildNumber, Error> {
        let trimmed = token.trim();
        let position = token.len() - token.trim_start().len();
        ChildNumber::parse_token(trimmed).map_err(|reason| {
            log::debug!("rejected derivation segment `{}`: {}", trimmed, reason);
            Error::malformed(trimmed, position, reason)
        })
    }

    /// Parses a token which already has its surrounding whitespace removed.
    pub(crate) fn parse_token(token: &str) -> Result<ChildNumber, TokenError> {
        let (digits, hardened) = match token.strip_suffix(&['H', 'h', '\''][..]) {
            Some(digits) => (digits.trim_end(), true),
            None => (token, false),
        };
        if digits.is_empty() {
            return Err(TokenError::Empty);
        }
        // `u32::from_str` also accepts a leading `+`
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenError::InvalidDigits);
        }
        let index = u32::from_str(digits).map_err(|_| TokenError::IndexOverflow)?;
        if index >= HARDENED_INDEX_BOUNDARY {
            return Err(TokenError::IndexOverflow);
        }
        Ok(ChildNumber::with(index, hardened))
    }
}

impl Display for ChildNumber {
    /// Renders the segment as `<index>` or `<index>H`; the alternate form
    /// (`{:#}`) uses an apostrophe as the hardened marker.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.index(), f)?;
        match (self.is_hardened(), f.alternate()) {
            (false, _) => Ok(()),
            (true, false) => f.write_str("H"),
            (true, true) => f.write_str("'"),
        }
    }
}

impl Debug for ChildNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChildNumber")
            .field(&format_args!("{}", self))
            .finish()
    }
}

impl FromStr for ChildNumber {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { ChildNumber::parse(s) }
}

impl From<u32> for ChildNumber {
    /// Interprets the value as a derivation value, i.e. the packed form with
    /// the top bit used as the hardened flag.
    #[inline]
    fn from(value: u32) -> Self { ChildNumber(value) }
}

impl From<ChildNumber> for u32 {
    #[inline]
    fn from(child: ChildNumber) -> Self { child.derivation_value() }
}

impl From<ChildNumber> for i32 {
    #[inline]
    fn from(child: ChildNumber) -> Self { child.pack() }
}

#[cfg(feature = "strict_encoding")]
impl StrictEncode for ChildNumber {
    #[inline]
    fn strict_encode<E: io::Write>(&self, e: E) -> Result<usize, strict_encoding::Error> {
        self.0.strict_encode(e)
    }
}

#[cfg(feature = "strict_encoding")]
impl StrictDecode for ChildNumber {
    #[inline]
    fn strict_decode<D: io::Read>(d: D) -> Result<Self, strict_encoding::Error> {
        Ok(Self(u32::strict_decode(d)?))
    }
}
