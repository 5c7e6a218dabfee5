/// Decode a single-byte (Latin-1) text field. The charger pads fixed-width
/// serial numbers with NULs, so control characters and DEL are dropped.
pub fn decode_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| char::from(b))
        .filter(|&c| c >= ' ' && c != '\x7f')
        .collect()
}
