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

/// Reasons for a single derivation path token to be rejected by the parser.
#[derive(
    Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Error
)]
#[display(doc_comments)]
pub enum TokenError {
    /// the token does not contain an index number
    Empty,

    /// the token contains characters other than decimal digits and a single
    /// trailing hardened marker (`H`, `h` or `'`)
    InvalidDigits,

    /// the index does not fit into 31 bits
    IndexOverflow,
}

/// Errors constructing, parsing or accessing derivation paths and their
/// segments.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum Error {
    /// child index {0} exceeds the maximal value of 2^31-1
    InvalidArgument(u32),

    /// malformed derivation path token `{token}` at byte {position}: {reason}
    MalformedPath {
        /// Offending token, with surrounding whitespace removed
        token: String,

        /// Byte offset of the token inside the parsed string
        position: usize,

        /// Reason why the token was rejected
        reason: TokenError,
    },

    /// segment #{index} is out of bounds for a path of {len} segments
    IndexOutOfBounds {
        /// Requested segment position
        index: usize,

        /// Number of segments in the path
        len: usize,
    },
}

impl Error {
    pub(crate) fn malformed(token: &str, position: usize, reason: TokenError) -> Error {
        Error::MalformedPath {
            token: token.to_owned(),
            position,
            reason,
        }
    }
}
