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

//! Conversions between local path types and `rust-bitcoin` BIP32 types, which
//! are used by the code performing actual key derivation.

use bitcoin::util::bip32::{self, DerivationPath};

use crate::{ChildNumber, HdPath, Prefix};

impl From<ChildNumber> for bip32::ChildNumber {
    #[inline]
    fn from(child: ChildNumber) -> Self { bip32::ChildNumber::from(child.derivation_value()) }
}

impl From<bip32::ChildNumber> for ChildNumber {
    /// [`bip32::ChildNumber`] does not guarantee its index to be in range, so
    /// the conversion goes through the derivation value, where an overflown
    /// normal index turns into a hardened one exactly as it would be used in
    /// derivation.
    #[inline]
    fn from(child: bip32::ChildNumber) -> Self { ChildNumber::from(u32::from(child)) }
}

impl From<&HdPath> for DerivationPath {
    fn from(path: &HdPath) -> Self {
        path.iter()
            .copied()
            .map(bip32::ChildNumber::from)
            .collect::<Vec<_>>()
            .into()
    }
}

impl From<HdPath> for DerivationPath {
    #[inline]
    fn from(path: HdPath) -> Self { DerivationPath::from(&path) }
}

impl HdPath {
    /// Constructs path with a given prefix from `rust-bitcoin` derivation
    /// path, which does not track whether it leads to a private key.
    pub fn from_derivation_path(prefix: Prefix, path: &DerivationPath) -> HdPath {
        HdPath::of(prefix, path.into_iter().copied().map(ChildNumber::from))
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn child_number() {
        let hardened = ChildNumber::PURPOSE_BIP84;
        assert_eq!(bip32::ChildNumber::from(hardened), bip32::ChildNumber::Hardened {
            index: 84
        });
        assert_eq!(
            bip32::ChildNumber::from(ChildNumber::ONE),
            bip32::ChildNumber::Normal { index: 1 }
        );
        assert_eq!(ChildNumber::from(bip32::ChildNumber::Hardened { index: 84 }), hardened);
        assert_eq!(ChildNumber::from(bip32::ChildNumber::Normal { index: 0 }), ChildNumber::ZERO);
    }

    #[test]
    fn derivation_path() {
        let path = HdPath::parse("m/84H/0H/0H/1/7").unwrap();
        let derivation = DerivationPath::from(&path);
        assert_eq!(derivation, DerivationPath::from_str("m/84'/0'/0'/1/7").unwrap());
        assert_eq!(HdPath::from_derivation_path(Prefix::Private, &derivation), path);

        let public = HdPath::from_derivation_path(Prefix::Public, &derivation);
        assert!(!public.has_private_key());
        assert_eq!(public.as_slice(), path.as_slice());

        assert_eq!(DerivationPath::from(HdPath::M([])), DerivationPath::master());
    }
}
