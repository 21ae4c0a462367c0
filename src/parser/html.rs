use crate::model::ParserError;
use crate::normalizer::collapse_whitespace;
use scraper::{ElementRef, Selector};

pub fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|_| ParserError::Selector(css.to_string()))
}

/// Text of an element with whitespace collapsed.
pub fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first descendant matching `sel`, or empty.
pub fn first_text(element: ElementRef, sel: &Selector) -> String {
    element.select(sel).next().map(element_text).unwrap_or_default()
}

pub fn first_attr(element: ElementRef, sel: &Selector, attr: &str) -> String {
    element
        .select(sel)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Non-empty text nodes of an element, one per visual line, skipping text inside
/// descendants that match `skip`.
pub fn text_lines_excluding(element: ElementRef, skip: &Selector) -> Vec<String> {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let skipped = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| skip.matches(&ancestor));
            (!skipped).then(|| collapse_whitespace(text))
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Makes a site-relative path absolute.
pub fn absolute_url(base: &str, src: &str) -> String {
    if src.is_empty() || src.starts_with("http") {
        return src.to_string();
    }
    let path = src.trim_start_matches("../").trim_start_matches("./");
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_text_helpers() {
        let doc = Html::parse_fragment("<div><p>  25%\n off </p><p>Tope <b>$5.000</b></p></div>");
        let div = doc.select(&selector("div").unwrap()).next().unwrap();
        assert_eq!(element_text(div), "25% off Tope $5.000");
        assert_eq!(first_text(div, &selector("p").unwrap()), "25% off");
        assert_eq!(first_attr(div, &selector("img").unwrap(), "src"), "");
        assert_eq!(text_lines_excluding(div, &selector("b").unwrap()), vec!["25% off", "Tope"]);
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url("https://www.coto.com.ar", "../img/modo.png"), "https://www.coto.com.ar/img/modo.png");
        assert_eq!(absolute_url("https://www.coto.com.ar", "/img/a.png"), "https://www.coto.com.ar/img/a.png");
        assert_eq!(absolute_url("https://x", "https://cdn/a.png"), "https://cdn/a.png");
        assert_eq!(absolute_url("https://x", ""), "");
    }

    #[test]
    fn test_bad_selector() {
        assert!(matches!(selector("li[["), Err(ParserError::Selector(_))));
    }
}
