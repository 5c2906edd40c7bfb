//! Text normalization for free-text search terms.
//!
//! Search terms are lower-cased and folded to ASCII before they are compiled
//! into match clauses, so that `"Café"`, `"CAFÉ"` and `"cafe"` all produce the
//! same query. Index-side analyzers are expected to apply the equivalent
//! folding (Elasticsearch's `asciifolding` + `lowercase` filters) to stored
//! documents.
//!
//! # Folding
//!
//! 1. Lower-case the input (`str::to_lowercase`, which handles the Greek
//!    final sigma).
//! 2. Canonically decompose (NFD) and drop every combining mark, which strips
//!    accents from letters such as `é`, `ñ` or `å`.
//! 3. Replace the Latin letters and ligatures that have no canonical
//!    decomposition (`ß`, `æ`, `ø`, `ł`, `ﬁ`, ...) with their ASCII spelling.
//!
//! Characters with no ASCII counterpart (CJK, emoji, symbols) pass through
//! unchanged.
//!
//! Normalization is idempotent: `normalize(&normalize(s)) == normalize(s)`.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalizes a search term: lower-case, then fold to ASCII.
///
/// ```
/// use lookout_search::normalize::normalize;
///
/// assert_eq!(normalize("Café"), "cafe");
/// assert_eq!(normalize("Straße"), "strasse");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(term: &str) -> String {
    ascii_fold(&term.to_lowercase())
}

/// Normalizes an optional term; an absent term normalizes to the empty string.
pub fn normalize_opt(term: Option<&str>) -> String {
    term.map(normalize).unwrap_or_default()
}

/// Returns true if `term` is already in normalized form.
pub fn is_normalized(term: &str) -> bool {
    normalize(term) == term
}

/// Folds text to ASCII without changing case.
///
/// Accents are removed through canonical decomposition; letters without a
/// decomposition are mapped through a fixed table. Anything else is kept.
pub fn ascii_fold(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match fold_char(c) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.push(c),
        }
    }
    folded
}

/// ASCII spellings for characters NFD leaves intact.
fn fold_char(c: char) -> Option<&'static str> {
    let replacement = match c {
        'ß' => "ss",
        'ẞ' => "SS",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'ł' | 'ŀ' => "l",
        'Ł' | 'Ŀ' => "L",
        'þ' => "th",
        'Þ' => "TH",
        'ħ' => "h",
        'Ħ' => "H",
        'ŋ' => "n",
        'Ŋ' => "N",
        'ŧ' => "t",
        'Ŧ' => "T",
        'ı' => "i",
        'ſ' => "s",
        'ĳ' => "ij",
        'Ĳ' => "IJ",
        'ﬀ' => "ff",
        'ﬁ' => "fi",
        'ﬂ' => "fl",
        'ﬃ' => "ffi",
        'ﬄ' => "ffl",
        'ﬆ' => "st",
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => "-",
        '\u{00A0}' => " ",
        _ => return None,
    };
    Some(replacement)
}
