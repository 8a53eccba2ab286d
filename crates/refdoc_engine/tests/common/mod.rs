//! Page fixtures shared by the engine integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use refdoc_engine::{HarvestEvent, HarvestSink};

pub const INDEX_URL: &str = "https://docs.example.com/ref/v5/";

/// Full entry URL for a fragment such as `fun_ta.sma`.
pub fn entry_url(fragment: &str) -> String {
    format!("{INDEX_URL}#{fragment}")
}

/// Index page linking to every fragment, the way the reference sidebar does.
pub fn index_page(fragments: &[&str]) -> String {
    let links: String = fragments
        .iter()
        .map(|fragment| format!(r##"<li><a href="#{fragment}">{fragment}</a></li>"##))
        .collect();
    format!("<html><body><nav><ul>{links}</ul></nav></body></html>")
}

/// Entry page whose selected container holds a heading and `body`.
pub fn entry_page(heading: &str, body: &str) -> String {
    format!(
        r#"<html><body>
<div class="tv-pine-reference-item">
  <h3 class="tv-pine-reference-item__header">other</h3>
</div>
<div class="tv-pine-reference-item tv-pine-reference-item--selected">
  <h3 class="tv-pine-reference-item__header">{heading}</h3>
  {body}
</div>
</body></html>"#
    )
}

/// Page the selected container never shows up on.
pub fn loading_page() -> String {
    r#"<html><body><div class="spinner">Loading...</div></body></html>"#.to_string()
}

pub fn full_entry_body() -> String {
    r#"<div class="tv-pine-reference-item__text">Returns the moving average.</div>
  <div class="tv-pine-reference-item__sub-header">Type</div>
  <div>series float</div>
  <div class="tv-pine-reference-item__sub-header">Syntax</div>
  <div>ta.sma(source, length) → series float</div>
  <div class="tv-pine-reference-item__sub-header">Example</div>
  <pre><code><div><span class="mtk1">//@version=5</span></div><div><span class="mtk6">plot</span><span class="mtk1">(ta.sma(close, 15))</span></div></code></pre>
  <div class="tv-pine-reference-item__sub-header">Remarks</div>
  <p>na values in the source series are ignored.</p>
  <p>Uses the sum of the last length values.</p>
  <div class="tv-pine-reference-item__sub-header">See also</div>
  <div class="tv-pine-reference-item__see-also">
    <span class="tv-tag-label">ta.ema</span>
    <span class="tv-tag-label">ta.wma</span>
    <span class="tv-tag-label">ta.ema</span>
  </div>"#
        .to_string()
}

#[derive(Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<HarvestEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<HarvestEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl HarvestSink for RecordingSink {
    fn emit(&self, event: HarvestEvent) {
        self.events.lock().unwrap().push(event);
    }
}
