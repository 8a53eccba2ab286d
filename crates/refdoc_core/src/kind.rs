use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Kind of a reference entry, derived from the URL fragment of its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Variable,
    Constant,
    Function,
    Keyword,
    Type,
    Operator,
    Annotation,
}

/// Fragment patterns in classification priority order. The first pattern
/// contained in a fragment decides the kind.
pub const FRAGMENT_PATTERNS: [(&str, EntryKind); 7] = [
    ("#var_", EntryKind::Variable),
    ("#const_", EntryKind::Constant),
    ("#fun_", EntryKind::Function),
    ("#kw_", EntryKind::Keyword),
    ("#type_", EntryKind::Type),
    ("#op_", EntryKind::Operator),
    ("#an_", EntryKind::Annotation),
];

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Variable => "Variable",
            EntryKind::Constant => "Constant",
            EntryKind::Function => "Function",
            EntryKind::Keyword => "Keyword",
            EntryKind::Type => "Type",
            EntryKind::Operator => "Operator",
            EntryKind::Annotation => "Annotation",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to do with a page whose fragment matches no pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKindPolicy {
    /// Drop the page.
    #[default]
    Discard,
    /// Retry against the whole decoded URL before dropping the page.
    WholeUrl,
}

/// Classify a decoded fragment (without the leading `#`).
pub fn classify_fragment(fragment: &str) -> Option<EntryKind> {
    classify_text(fragment)
}

fn classify_text(text: &str) -> Option<EntryKind> {
    FRAGMENT_PATTERNS.iter().find_map(|(pattern, kind)| {
        let marker = pattern.trim_start_matches('#');
        text.contains(marker).then_some(*kind)
    })
}

/// Decoded fragment of `url`, or `None` if the URL has no fragment.
pub fn decoded_fragment(url: &str) -> Option<String> {
    let raw = match Url::parse(url) {
        Ok(parsed) => parsed.fragment().map(ToOwned::to_owned),
        Err(_) => url.split_once('#').map(|(_, frag)| frag.to_string()),
    }?;
    Some(percent_decode(&raw))
}

/// Classify a page URL from its fragment, applying `policy` on no match.
pub fn classify_url(url: &str, policy: UnknownKindPolicy) -> Option<EntryKind> {
    let from_fragment = decoded_fragment(url).and_then(|frag| classify_fragment(&frag));
    match (from_fragment, policy) {
        (Some(kind), _) => Some(kind),
        (None, UnknownKindPolicy::Discard) => None,
        (None, UnknownKindPolicy::WholeUrl) => classify_text(&percent_decode(url)),
    }
}

fn percent_decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_fragment_marker() {
        assert_eq!(
            classify_url("https://docs.example.com/v5/#fun_ta.sma", UnknownKindPolicy::Discard),
            Some(EntryKind::Function)
        );
        assert_eq!(
            classify_url("https://docs.example.com/v5/#kw_if", UnknownKindPolicy::Discard),
            Some(EntryKind::Keyword)
        );
    }

    #[test]
    fn decodes_percent_escapes_before_matching() {
        assert_eq!(
            decoded_fragment("https://docs.example.com/v5/#op_%5B%5D").as_deref(),
            Some("op_[]")
        );
        assert_eq!(
            classify_url("https://docs.example.com/v5/#op_%5B%5D", UnknownKindPolicy::Discard),
            Some(EntryKind::Operator)
        );
    }

    #[test]
    fn first_pattern_in_priority_order_wins() {
        // Contains both "var_" and "fun_"; variables are checked first.
        assert_eq!(classify_fragment("fun_var_x"), Some(EntryKind::Variable));
    }

    #[test]
    fn no_fragment_or_unknown_marker_is_unclassified() {
        assert_eq!(
            classify_url("https://docs.example.com/v5/", UnknownKindPolicy::Discard),
            None
        );
        assert_eq!(
            classify_url("https://docs.example.com/v5/#section", UnknownKindPolicy::Discard),
            None
        );
    }

    #[test]
    fn whole_url_policy_retries_outside_the_fragment() {
        let url = "https://docs.example.com/fun_reference/#overview";
        assert_eq!(classify_url(url, UnknownKindPolicy::Discard), None);
        assert_eq!(
            classify_url(url, UnknownKindPolicy::WholeUrl),
            Some(EntryKind::Function)
        );
    }

}
