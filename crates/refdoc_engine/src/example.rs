use std::collections::HashSet;

use refdoc_core::{PageLayout, NO_EXAMPLE};
use scraper::ElementRef;

use crate::dom::{rendered_text, text_content};
use crate::sections::{find_sub_header, section_body};

/// One way of turning a code element into example text.
pub type ExampleStrategy = fn(ElementRef, &PageLayout) -> Option<String>;

/// Strategies in decreasing fidelity; the first non-empty result wins.
pub const EXAMPLE_STRATEGIES: [(&str, ExampleStrategy); 3] = [
    ("structured-spans", structured_spans),
    ("raw-text-split", raw_text_split),
    ("rendered-text", rendered_text_split),
];

/// Code element of the "Example" section: the first `pre` after the
/// sub-header and before the next one, or its `code` child when present.
pub fn find_example_code<'a>(
    container: ElementRef<'a>,
    layout: &'a PageLayout,
) -> Option<ElementRef<'a>> {
    let header = find_sub_header(container, "Example", layout)?;
    let pre = section_body(header, layout).find(|el| el.value().name() == "pre")?;
    let code = pre
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "code");
    Some(code.unwrap_or(pre))
}

/// Example code of the page, or [`NO_EXAMPLE`]. Never empty.
pub fn extract_example(container: ElementRef, layout: &PageLayout) -> String {
    find_example_code(container, layout)
        .and_then(|code| run_strategies(code, layout))
        .unwrap_or_else(|| NO_EXAMPLE.to_string())
}

fn run_strategies(code: ElementRef, layout: &PageLayout) -> Option<String> {
    EXAMPLE_STRATEGIES.iter().find_map(|(name, strategy)| {
        let text = strategy(code, layout).filter(|text| !text.trim().is_empty())?;
        engine_logging::engine_trace!("example extracted with {} strategy", name);
        Some(text)
    })
}

/// Each line is rendered as an element wrapping token spans; take the text
/// of every such line element, in order. Tokens without a per-line wrapper
/// share one parent, whose text is split on newlines.
pub fn structured_spans(code: ElementRef, layout: &PageLayout) -> Option<String> {
    let mut seen = HashSet::new();
    let lines: Vec<String> = code
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| {
            el.value().name() == "span"
                && el
                    .value()
                    .attr("class")
                    .is_some_and(|class| class.contains(&layout.code_token_class))
        })
        .filter_map(|token| token.parent().and_then(ElementRef::wrap))
        .filter(|line| seen.insert(line.id()))
        .flat_map(|line| {
            text_content(line)
                .split('\n')
                .filter(|text| !text.trim().is_empty())
                .map(|text| text.trim_end().to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    (!lines.is_empty()).then(|| lines.join("\n"))
}

pub fn raw_text_split(code: ElementRef, _layout: &PageLayout) -> Option<String> {
    non_empty_lines(&text_content(code))
}

pub fn rendered_text_split(code: ElementRef, _layout: &PageLayout) -> Option<String> {
    non_empty_lines(&rendered_text(code))
}

fn non_empty_lines(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
