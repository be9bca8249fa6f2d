//! Repair of UTF-8 text that was decoded as Latin-1 or Windows-1252
//!
//! Pages served with a wrong charset show up as `â€™` instead of `’`, `Â `
//! instead of a space, and so on. [`fix_encoding`] undoes the common cases,
//! including text that went through the wrong decoding more than once.
//! Clean text comes back unchanged.

/// Known mis-decodings and their replacements, applied in order.
///
/// Longer sequences that share a prefix come first so the bare `â€` fallback
/// only catches what is left.
const GARBLED: &[(&str, &str)] = &[
    ("\u{e2}\u{20ac}\u{201d}", "\u{2014}"), // em dash
    ("\u{e2}\u{20ac}\u{201c}", "\u{2013}"), // en dash
    ("\u{e2}\u{20ac}\u{2122}", "\u{2019}"), // right single quote
    ("\u{e2}\u{20ac}\u{2dc}", "\u{2018}"),  // left single quote
    ("\u{e2}\u{20ac}\u{153}", "\u{201c}"),  // left double quote
    ("\u{e2}\u{20ac}\u{a6}", "\u{2026}"),   // ellipsis
    ("\u{e2}\u{20ac}\u{9d}", "\u{201d}"),   // right double quote
    ("\u{e2}\u{20ac}\u{a2}", "\u{2022}"),   // bullet
    ("\u{e2}\u{20ac}", "\u{201d}"),
    ("\u{c2}\u{a0}", " "),
    ("\u{c2} ", " "),
    ("\u{c2}\u{a9}", "\u{a9}"),
    ("\u{c2}\u{ae}", "\u{ae}"),
    ("\u{a0}", " "),
];

/// Repairs mojibake in extracted text
///
/// While every character fits in one byte, at least one is non-ASCII, and
/// those bytes form valid UTF-8, the text is re-decoded as UTF-8 (at most
/// [`MAX_REDECODE_ROUNDS`] times). The replacement table is applied last.
pub fn fix_encoding(text: &str) -> String {
    let mut current = text.to_string();

    for _ in 0..MAX_REDECODE_ROUNDS {
        match redecode_latin1(&current) {
            Some(redecoded) => current = redecoded,
            None => break,
        }
    }

    apply_table(&current)
}

/// Layers of double encoding undone before giving up
pub const MAX_REDECODE_ROUNDS: usize = 4;

fn redecode_latin1(text: &str) -> Option<String> {
    let mut any_high = false;
    let mut bytes = Vec::with_capacity(text.len());

    for c in text.chars() {
        let code = u32::from(c);
        if code > 0xFF {
            return None;
        }
        if code >= 0x80 {
            any_high = true;
        }
        bytes.push(code as u8);
    }

    if !any_high {
        return None;
    }

    String::from_utf8(bytes).ok()
}

fn apply_table(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    GARBLED
        .iter()
        .fold(text.to_string(), |acc, (garbled, fixed)| {
            if acc.contains(garbled) {
                acc.replace(garbled, fixed)
            } else {
                acc
            }
        })
}
