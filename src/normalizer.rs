use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lower-cases the text and strips diacritics (NFD, combining marks removed).
/// No other characters are touched.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Collapses runs of whitespace (newlines, nbsp, tabs) into single spaces and trims.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents_and_lowercases() {
        assert_eq!(normalize("Miércoles y SÁBADO"), "miercoles y sabado");
        assert_eq!(normalize("Cuotas sin Interés"), "cuotas sin interes");
        assert_eq!(normalize("Año"), "ano");
    }

    #[test]
    fn test_keeps_other_characters() {
        assert_eq!(normalize("25% Dto. $8.000\n"), "25% dto. $8.000\n");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Visa\u{a0} Galicia\n MODO "), "Visa Galicia MODO");
        assert_eq!(collapse_whitespace(" \n "), "");
    }
}
