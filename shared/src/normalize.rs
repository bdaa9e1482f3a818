/// Characters stripped before lowercasing: straight and curly quote
/// variants that differ between the SVG labels, the seat metadata, and
/// the live feed's keys.
const QUOTE_VARIANTS: &[char] = &['\'', '"', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}'];

/// Reduce a display label to the canonical matching key shared by all
/// three datasets: quote variants removed, surrounding whitespace
/// trimmed, lowercased, then everything outside `[a-z0-9]` dropped.
///
/// Total and stable; any input (including the empty string) yields a
/// key, and equal inputs always yield equal keys.
pub fn canonical_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| !QUOTE_VARIANTS.contains(c))
        .collect::<String>()
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::canonical_key;

    #[test]
    fn strips_punctuation_and_whitespace() {
        assert_eq!(canonical_key("Dhaka-1"), "dhaka1");
        assert_eq!(canonical_key(" dhaka 1 "), "dhaka1");
        assert_eq!(canonical_key("DHAKA\u{2011}1"), "dhaka1");
    }

    #[test]
    fn strips_curly_and_straight_quotes() {
        assert_eq!(canonical_key("Cox's Bazar-3"), "coxsbazar3");
        assert_eq!(canonical_key("Cox\u{2019}s Bazar-3"), "coxsbazar3");
        assert_eq!(canonical_key("\u{201C}Bogra\u{201D}-6"), "bogra6");
    }

    #[test]
    fn empty_input_yields_empty_key() {
        assert_eq!(canonical_key(""), "");
        assert_eq!(canonical_key("   "), "");
        assert_eq!(canonical_key("---"), "");
    }

    #[test]
    fn idempotent() {
        for label in ["Dhaka-1", " dhaka 1 ", "Cox's Bazar-3", "", "Sylhet\u{2013}2"] {
            let once = canonical_key(label);
            assert_eq!(canonical_key(&once), once);
        }
    }

    #[test]
    fn non_ascii_letters_are_dropped_not_mangled() {
        // Bengali script labels normalize to whatever ASCII survives.
        assert_eq!(canonical_key("\u{09A2}\u{09BE}\u{0995}\u{09BE}-1"), "1");
    }
}
