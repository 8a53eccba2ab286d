use refdoc_core::{split_remarks, PageLayout};
use scraper::ElementRef;

use crate::dom::{find_all_by_class, following_elements, has_class, text_content};

/// First sub-header inside `container` whose text contains `label`.
pub fn find_sub_header<'a>(
    container: ElementRef<'a>,
    label: &str,
    layout: &PageLayout,
) -> Option<ElementRef<'a>> {
    find_all_by_class(container, &layout.sub_header_class)
        .into_iter()
        .find(|header| text_content(*header).contains(label))
}

/// Siblings after `header` up to (not including) the next sub-header.
pub fn section_body<'a>(
    header: ElementRef<'a>,
    layout: &'a PageLayout,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    following_elements(header).take_while(move |el| !has_class(el, &layout.sub_header_class))
}

/// Text of the section labelled `label`, one sibling per line; empty when
/// the page has no such section.
pub fn extract_section(container: ElementRef, label: &str, layout: &PageLayout) -> String {
    let Some(header) = find_sub_header(container, label, layout) else {
        return String::new();
    };

    section_body(header, layout)
        .map(|el| text_content(el).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Non-empty lines of the "Remarks" section.
pub fn extract_remarks(container: ElementRef, layout: &PageLayout) -> Vec<String> {
    split_remarks(&extract_section(container, "Remarks", layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const SUB: &str = "tv-pine-reference-item__sub-header";

    fn page(body: &str) -> Html {
        Html::parse_document(&format!(
            r#"<div class="tv-pine-reference-item--selected">{body}</div>"#
        ))
    }

    fn container(doc: &Html) -> ElementRef<'_> {
        crate::dom::find_by_class(doc.root_element(), "tv-pine-reference-item--selected").unwrap()
    }

    #[test]
    fn collects_siblings_until_next_sub_header() {
        let doc = page(&format!(
            r#"<div class="{SUB}">Syntax</div>
               <div> ta.sma(source, length) </div>
               <div></div>
               <div>→ series float</div>
               <div class="{SUB}">Arguments</div>
               <div>source (series int/float)</div>"#
        ));
        let layout = PageLayout::default();
        assert_eq!(
            extract_section(container(&doc), "Syntax", &layout),
            "ta.sma(source, length)\n→ series float"
        );
    }

    #[test]
    fn missing_label_yields_empty_string() {
        let doc = page(&format!(r#"<div class="{SUB}">Syntax</div><div>x</div>"#));
        let layout = PageLayout::default();
        assert_eq!(extract_section(container(&doc), "Type", &layout), "");
        assert!(extract_remarks(container(&doc), &layout).is_empty());
    }

    #[test]
    fn section_at_end_of_container_runs_to_last_sibling() {
        let doc = page(&format!(
            r#"<div class="{SUB}">Remarks</div><p>Note one.</p><p>Note two.</p>"#
        ));
        let layout = PageLayout::default();
        assert_eq!(
            extract_remarks(container(&doc), &layout),
            vec!["Note one.", "Note two."]
        );
    }

    #[test]
    fn label_matches_by_containment() {
        let doc = page(&format!(r#"<div class="{SUB}">Returns Type</div><div>float</div>"#));
        let layout = PageLayout::default();
        assert_eq!(extract_section(container(&doc), "Type", &layout), "float");
    }
}
