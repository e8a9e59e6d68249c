//! Stable per-name colors.

use hashers::fnv::FNV1aHasher32;
use std::hash::Hasher;

/// Codes that read badly on common terminal backgrounds.
const BLACKLIST: [u8; 9] = [1, 8, 16, 27, 28, 88, 89, 90, 91];

/// Pick an mIRC color code for `name`. The same name always gets the same
/// code, and codes in [`BLACKLIST`] are never returned.
pub fn ident_color(name: &str) -> u8 {
    let mut hasher = FNV1aHasher32::default();
    hasher.write(name.as_bytes());
    let mut code = (hasher.finish() % (99 - BLACKLIST.len() as u64)) as u8;
    for skipped in BLACKLIST {
        if skipped <= code {
            code += 1;
        }
    }
    code
}

/// The inline sequence selecting `code` as foreground color.
pub fn color_sequence(code: u8) -> String {
    format!("\x03{:02}", code)
}
