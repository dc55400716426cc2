//! Entity policies for characters outside ASCII.

use crate::config::HtmlFormatter;

/// Named entities for U+00A0 through U+00FF, in code point order.
const LATIN1_NAMES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy", "ordf",
    "laquo", "not", "shy", "reg", "macr", "deg", "plusmn", "sup2", "sup3", "acute", "micro",
    "para", "middot", "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", "Egrave", "Eacute",
    "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", "ETH", "Ntilde", "Ograve", "Oacute",
    "Ocirc", "Otilde", "Ouml", "times", "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute",
    "THORN", "szlig", "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", "eth", "ntilde",
    "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave", "uacute",
    "ucirc", "uuml", "yacute", "thorn", "yuml",
];

fn latin1_name(c: char) -> Option<&'static str> {
    let cp = c as u32;
    if (0xA0..=0xFF).contains(&cp) {
        Some(LATIN1_NAMES[(cp - 0xA0) as usize])
    } else {
        None
    }
}

/// Rewrite non-ASCII characters of serialized markup per `formatter`.
pub fn encode(text: &str, formatter: HtmlFormatter) -> String {
    if formatter == HtmlFormatter::Minimal || text.is_ascii() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        match (formatter, latin1_name(c)) {
            (HtmlFormatter::Html, Some(name)) => {
                out.push('&');
                out.push_str(name);
                out.push(';');
            }
            _ => out.push_str(&format!("&#{};", c as u32)),
        }
    }
    out
}
