// Utility functions

/// Storage key of a merchant: trimmed, lower-case.
pub fn merchant_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Splits a comma separated argument list ("mercado pago, galicia") into terms.
pub fn split_terms(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_key() {
        assert_eq!(merchant_key("  Carrefour "), "carrefour");
    }

    #[test]
    fn test_split_terms() {
        assert_eq!(split_terms("Mercado Pago, galicia,, "), vec!["Mercado Pago", "galicia"]);
        assert!(split_terms("").is_empty());
    }
}
