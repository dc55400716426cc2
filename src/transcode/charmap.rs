//! Typographic character folding.
//!
//! Legacy clients render a single-byte character set; characters that only
//! exist for typographic polish are folded to their ASCII look-alikes.

/// ASCII replacement for a typographic character, if it has one.
///
/// An empty string means the character is dropped.
pub fn fold(c: char) -> Option<&'static str> {
    let replacement = match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2212}' => "-",
        '\u{2014}' | '\u{2015}' => "--",
        '\u{2026}' => "...",
        '\u{2022}' | '\u{2023}' | '\u{2043}' => "*",
        '\u{00A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' => " ",
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => "",
        '\u{2122}' => "(TM)",
        _ => return None,
    };
    Some(replacement)
}

/// Fold every foldable character in `text`.
pub fn fold_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match fold(c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_and_dashes() {
        assert_eq!(
            fold_text("\u{201C}Hello\u{201D} \u{2014} it\u{2019}s 9\u{2013}5\u{2026}"),
            "\"Hello\" -- it's 9-5..."
        );
    }

    #[test]
    fn test_spaces_and_invisibles() {
        assert_eq!(fold_text("a\u{00A0}b\u{200B}c\u{2009}d"), "a bc d");
    }

    #[test]
    fn test_leaves_other_text_alone() {
        assert_eq!(fold_text("caf\u{00E9} <b>ok</b>"), "caf\u{00E9} <b>ok</b>");
    }
}
