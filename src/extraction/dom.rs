//! DOM snapshot helpers shared by row extraction and pagination detection

use crate::browser::ElementPath;
use crate::error::{ExtractionError, Result};
use scraper::{ElementRef, Selector};

/// Compile a CSS selector, mapping the parse error into ours
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ExtractionError::InvalidSelector(format!("{css}: {e}")).into())
}

/// Trimmed text content with whitespace runs collapsed to one space
pub fn text_of(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Collapse whitespace runs (newlines included) to single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Structural path from the document root down to `element`
pub fn element_path(element: ElementRef<'_>) -> ElementPath {
    let mut segments = Vec::new();
    let mut current = Some(element);

    while let Some(el) = current {
        let name = el.value().name();
        if name == "html" {
            segments.push("html".to_string());
            break;
        }
        let position = 1 + el
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|sib| sib.value().name() == name)
            .count();
        segments.push(format!("{name}:nth-of-type({position})"));
        current = el.parent().and_then(ElementRef::wrap);
    }

    segments.reverse();
    ElementPath::new(segments.join(" > "))
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element
        .value()
        .classes()
        .any(|c| c.eq_ignore_ascii_case(class))
}

fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Disabled by attribute, ARIA state, or a `disabled` class on itself or its
/// wrapper (`li.disabled > a`)
pub fn is_disabled(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if el.attr("disabled").is_some() || el.attr("aria-disabled") == Some("true") {
        return true;
    }
    has_class(element, "disabled") || parent_element(element).is_some_and(|p| has_class(p, "disabled"))
}

/// Hidden by the `hidden` attribute or an inline `display: none`
pub fn is_hidden(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if el.attr("hidden").is_some() {
        return true;
    }
    el.attr("style").is_some_and(|style| {
        style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
            .contains("display:none")
    })
}

/// Marked as the current page via `aria-current="page"` or one of
/// `classes`, on the element itself or its wrapper
pub fn is_current(element: ElementRef<'_>, classes: &[String]) -> bool {
    if element.value().attr("aria-current") == Some("page") {
        return true;
    }
    let marked = |el: ElementRef<'_>| classes.iter().any(|c| has_class(el, c));
    marked(element) || parent_element(element).is_some_and(marked)
}
