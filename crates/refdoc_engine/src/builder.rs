use std::time::Duration;

use refdoc_core::{
    classify_url, EntryFields, EntryRecord, HarvestConfig, PageLayout, UnknownKindPolicy,
};
use scraper::ElementRef;

use crate::dom::{find_all_by_class, find_by_class, rendered_text};
use crate::example::extract_example;
use crate::sections::{extract_remarks, extract_section};
use crate::{DocumentSource, ExtractError, FailureKind, Page, SourceError};

/// Turns one entry page into an [`EntryRecord`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    layout: PageLayout,
    unknown_kind: UnknownKindPolicy,
    page_timeout: Duration,
}

impl RecordBuilder {
    pub fn new(layout: PageLayout, unknown_kind: UnknownKindPolicy, page_timeout: Duration) -> Self {
        Self {
            layout,
            unknown_kind,
            page_timeout,
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(config.layout.clone(), config.unknown_kind, config.page_timeout)
    }

    /// Wait for the page's selected-content container, then extract.
    pub async fn build(
        &self,
        source: &dyn DocumentSource,
        url: &str,
    ) -> Result<EntryRecord, ExtractError> {
        let page = source
            .wait_for(url, &self.layout.container_selector(), self.page_timeout)
            .await
            .map_err(|err| match err {
                SourceError::Timeout { .. } => {
                    ExtractError::new(FailureKind::ExtractionTimeout, err.to_string())
                }
                other => ExtractError::new(FailureKind::Source, other.to_string()),
            })?;
        self.extract(&page)
    }

    /// Extract a record from an already loaded page.
    pub fn extract(&self, page: &Page) -> Result<EntryRecord, ExtractError> {
        let document = page.document();
        let container = find_by_class(document.root_element(), &self.layout.container_class)
            .ok_or_else(|| {
                ExtractError::new(
                    FailureKind::ExtractionTimeout,
                    format!("no `{}` container on page", self.layout.container_class),
                )
            })?;

        let heading = find_by_class(container, &self.layout.header_class)
            .map(rendered_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ExtractError::new(FailureKind::MissingTitle, "no heading element"))?;

        let kind = classify_url(&page.url, self.unknown_kind).ok_or_else(|| {
            ExtractError::new(
                FailureKind::UnknownKind,
                "fragment matches no known kind pattern",
            )
        })?;

        let fields = self.extract_fields(container);
        EntryRecord::compose(kind, &heading, fields)
            .ok_or_else(|| ExtractError::new(FailureKind::MissingTitle, "blank heading"))
    }

    /// Optional fields; each one is independently allowed to be absent.
    fn extract_fields(&self, container: ElementRef) -> EntryFields {
        let layout = &self.layout;
        EntryFields {
            description: find_by_class(container, &layout.description_class)
                .map(rendered_text)
                .unwrap_or_default(),
            type_signature: extract_section(container, "Type", layout),
            syntax: extract_section(container, "Syntax", layout),
            example: Some(extract_example(container, layout)),
            remarks: extract_remarks(container, layout),
            related_topics: self.related_topics(container),
        }
    }

    fn related_topics(&self, container: ElementRef) -> Vec<String> {
        let Some(see_also) = find_by_class(container, &self.layout.see_also_class) else {
            return Vec::new();
        };
        find_all_by_class(see_also, &self.layout.tag_label_class)
            .into_iter()
            .map(rendered_text)
            .filter(|label| !label.is_empty())
            .collect()
    }
}
