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

//! Hierarchical deterministic key derivation paths.
//!
//! The library provides two value types: [`ChildNumber`], a single BIP32
//! derivation segment packing a 31-bit index together with a hardened flag,
//! and [`HdPath`], an immutable sequence of segments marked as either a
//! private-key capable (`m`) or a public-only (`M`) path.
//!
//! ```
//! use hd_path::{ChildNumber, HdPath};
//!
//! let path: HdPath = "m / 44H / 0H / 0H / 1 / 1".parse().unwrap();
//! assert!(path.has_private_key());
//! assert_eq!(path.len(), 5);
//! assert_eq!(path[0], ChildNumber::PURPOSE_BIP44);
//! assert_eq!(path.to_string(), "m/44H/0H/0H/1/1");
//! assert_eq!(path.parent().to_string(), "m/44H/0H/0H/1");
//! ```

// Coding conventions
#![recursion_limit = "256"]
#![deny(dead_code, missing_docs, warnings)]

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod bip32;
mod child;
mod error;
mod path;
pub mod standards;

pub use child::ChildNumber;
pub use error::{Error, TokenError};
pub use path::{HdPath, Prefix};
pub use standards::Purpose;

/// Constant determining BIP32 boundary for u32 values after which index
/// is treated as hardened
pub const HARDENED_INDEX_BOUNDARY: u32 = 1 << 31;
