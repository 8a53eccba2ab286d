//! Element queries over a parsed page.
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::ElementRef;

pub fn has_class(element: &ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// First descendant (excluding `root`) carrying `class`, in document order.
pub fn find_by_class<'a>(root: ElementRef<'a>, class: &str) -> Option<ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| has_class(el, class))
}

pub fn find_all_by_class<'a>(root: ElementRef<'a>, class: &str) -> Vec<ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| has_class(el, class))
        .collect()
}

/// Element siblings following `element`, text nodes skipped.
pub fn following_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.next_siblings().filter_map(ElementRef::wrap)
}

/// Concatenated descendant text, like DOM `textContent`.
pub fn text_content(element: ElementRef) -> String {
    element.text().collect()
}

/// Approximation of the visible text of `element` (DOM `innerText`):
/// whitespace runs collapse to one space, block elements and `<br>` start new
/// lines, `<pre>` content is kept as-is, scripts and styles are dropped.
pub fn rendered_text(element: ElementRef) -> String {
    let mut ctx = RenderContext::default();
    if element.value().name().eq_ignore_ascii_case("pre") || has_pre_ancestor(element) {
        ctx.pre_depth = 1;
    }
    for child in element.children() {
        visit_node(child, &mut ctx);
    }
    ctx.finish()
}

fn has_pre_ancestor(element: ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name().eq_ignore_ascii_case("pre"))
}

fn visit_node(node: NodeRef<'_, Node>, ctx: &mut RenderContext) {
    match node.value() {
        Node::Text(text) => ctx.append_text(text),
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                visit_element(element, ctx);
            }
        }
        _ => {}
    }
}

fn visit_element(element: ElementRef, ctx: &mut RenderContext) {
    let tag = element.value().name().to_ascii_lowercase();
    match tag.as_str() {
        "br" => ctx.push_newline(),
        "script" | "style" | "noscript" | "template" => {}
        "pre" => {
            ctx.ensure_newline();
            ctx.pre_depth += 1;
            visit_children(element, ctx);
            ctx.pre_depth -= 1;
            ctx.ensure_newline();
        }
        "p" | "div" | "section" | "article" | "header" | "footer" | "nav" | "li" | "ul"
        | "ol" | "table" | "tr" | "blockquote" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        | "dl" | "dt" | "dd" => {
            ctx.ensure_newline();
            visit_children(element, ctx);
            ctx.ensure_newline();
        }
        _ => visit_children(element, ctx),
    }
}

fn visit_children(element: ElementRef, ctx: &mut RenderContext) {
    for child in element.children() {
        visit_node(child, ctx);
    }
}

#[derive(Default)]
struct RenderContext {
    builder: String,
    pre_depth: usize,
}

impl RenderContext {
    fn append_text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            self.builder.push_str(text);
            return;
        }
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.builder.is_empty() || self.builder.ends_with(&[' ', '\n'][..]) {
                    continue;
                }
                self.builder.push(' ');
            } else {
                self.builder.push(ch);
            }
        }
    }

    fn ensure_newline(&mut self) {
        if self.builder.is_empty() || self.builder.ends_with('\n') {
            return;
        }
        self.push_newline();
    }

    fn push_newline(&mut self) {
        // A collapsed space before a line break is not visible.
        if self.pre_depth == 0 && self.builder.ends_with(' ') {
            self.builder.pop();
        }
        self.builder.push('\n');
    }

    fn finish(self) -> String {
        self.builder.trim().to_string()
    }
}
