/// Deterministic party color via CRC32 hash of the party name.
/// Returns (r, g, b) from the first 3 bytes of the hash.
///
/// Only used when a result record arrives without a color of its own;
/// colors carried by the feed pass through verbatim.
pub fn party_color(name: &str) -> (u8, u8, u8) {
    let hash = crc32fast::hash(name.as_bytes());
    let bytes = hash.to_be_bytes();
    (bytes[0], bytes[1], bytes[2])
}

/// Format an RGB triple as a CSS hex color string.
pub fn rgb_css(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
