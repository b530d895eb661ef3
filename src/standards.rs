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

//! Purpose prefixes of derivation paths defined by BIP-43-based standards.

use std::str::FromStr;

use crate::{ChildNumber, HdPath};

/// string `{_0}` is neither a known BIP-43 purpose name nor a purpose segment
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub struct UnknownPurpose(pub String);

/// Purpose of a derivation path, stored as its first hardened segment
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[non_exhaustive]
pub enum Purpose {
    /// Account-based P2PKH derivation.
    ///
    /// `m / 44H / coin_type H / account H`
    #[display("bip44", alt = "m/44H")]
    Bip44,

    /// Account-based P2WPKH-in-P2SH derivation.
    ///
    /// `m / 49H / coin_type H / account H`
    #[display("bip49", alt = "m/49H")]
    Bip49,

    /// Account-based native P2WPKH derivation.
    ///
    /// `m / 84H / coin_type H / account H`
    #[display("bip84", alt = "m/84H")]
    Bip84,

    /// Account-based single-key P2TR derivation.
    ///
    /// `m / 86H / coin_type H / account H`
    #[display("bip86", alt = "m/86H")]
    Bip86,
}

impl HdPath {
    /// Partial path with BIP44 purpose, `m/44H`
    pub const BIP44_PARENT: HdPath = HdPath::from_static(true, &[ChildNumber::PURPOSE_BIP44]);

    /// Partial path with BIP49 purpose, `m/49H`
    pub const BIP49_PARENT: HdPath = HdPath::from_static(true, &[ChildNumber::PURPOSE_BIP49]);

    /// Partial path with BIP84 purpose, `m/84H`
    pub const BIP84_PARENT: HdPath = HdPath::from_static(true, &[ChildNumber::PURPOSE_BIP84]);

    /// Partial path with BIP86 purpose, `m/86H`
    pub const BIP86_PARENT: HdPath = HdPath::from_static(true, &[ChildNumber::PURPOSE_BIP86]);
}

impl Purpose {
    /// Returns hardened purpose segment
    pub const fn child_number(self) -> ChildNumber {
        match self {
            Purpose::Bip44 => ChildNumber::PURPOSE_BIP44,
            Purpose::Bip49 => ChildNumber::PURPOSE_BIP49,
            Purpose::Bip84 => ChildNumber::PURPOSE_BIP84,
            Purpose::Bip86 => ChildNumber::PURPOSE_BIP86,
        }
    }

    /// Returns private path consisting of the purpose segment only
    pub fn parent_path(self) -> HdPath {
        match self {
            Purpose::Bip44 => HdPath::BIP44_PARENT,
            Purpose::Bip49 => HdPath::BIP49_PARENT,
            Purpose::Bip84 => HdPath::BIP84_PARENT,
            Purpose::Bip86 => HdPath::BIP86_PARENT,
        }
    }

    /// Recognizes purpose from a derivation segment
    pub fn with_child_number(child: ChildNumber) -> Option<Purpose> {
        [Purpose::Bip44, Purpose::Bip49, Purpose::Bip84, Purpose::Bip86]
            .into_iter()
            .find(|purpose| purpose.child_number() == child)
    }

    /// Detects purpose of a path by its first segment. Does not check the
    /// rest of the path against the standard.
    pub fn detect(path: &HdPath) -> Option<Purpose> {
        path.first().copied().and_then(Purpose::with_child_number)
    }
}

impl FromStr for Purpose {
    type Err = UnknownPurpose;

    /// Parses either the purpose name (`bip84`) or the purpose segment (`84H`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bip44" => Ok(Purpose::Bip44),
            "bip49" => Ok(Purpose::Bip49),
            "bip84" => Ok(Purpose::Bip84),
            "bip86" => Ok(Purpose::Bip86),
            other => ChildNumber::parse(other)
                .ok()
                .and_then(Purpose::with_child_number)
                .ok_or_else(|| UnknownPurpose(s.to_owned())),
        }
    }
}

impl From<Purpose> for ChildNumber {
    #[inline]
    fn from(purpose: Purpose) -> Self { purpose.child_number() }
}
