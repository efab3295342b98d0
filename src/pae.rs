//! Pre-authentication encoding.
//!
//! Every MAC and signature in this crate is computed over the output of
//! [`pre_auth_encode`], never over a naive concatenation of its inputs.

/// Encode a list of byte strings into a single unambiguous byte string.
///
/// The output is the number of pieces as a little-endian `u64`, followed by
/// each piece prefixed with its own length as a little-endian `u64`.
pub fn pre_auth_encode(pieces: &[&[u8]]) -> Vec<u8> {
    let len = pieces.iter().map(|p| 8 + p.len()).sum::<usize>() + 8;
    let mut out = Vec::with_capacity(len);

    out.extend_from_slice(&(pieces.len() as u64).to_le_bytes());
    for piece in pieces {
        out.extend_from_slice(&(piece.len() as u64).to_le_bytes());
        out.extend_from_slice(piece);
    }

    out
}
