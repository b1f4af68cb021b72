//! Identifier minting helpers.

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

// id minting for the fixed record prefixes. 16 uuid bytes stay well under the
// bech32 length limit, so encoding cannot fail for a valid prefix.
pub(crate) fn mint_id(prefix: &str) -> String {
    let hrp = bech32::Hrp::parse_unchecked(prefix);
    bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
        .expect("bech32 encoding of a uuid7 payload")
}
