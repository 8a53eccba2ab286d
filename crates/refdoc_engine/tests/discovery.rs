mod common;

use std::time::Duration;

use common::{entry_url, index_page, RecordingSink, INDEX_URL};
use pretty_assertions::assert_eq;
use refdoc_engine::{HarvestEvent, LinkDiscoverer, NoopSink, StaticSource};

fn discoverer() -> LinkDiscoverer {
    LinkDiscoverer::new(INDEX_URL, Duration::from_millis(50))
}

#[tokio::test]
async fn links_are_grouped_by_pattern_and_deduplicated() {
    let source = StaticSource::new().with_page(
        INDEX_URL,
        index_page(&["fun_ta.sma", "var_close", "fun_ta.sma", "kw_if", "var_close"]),
    );

    let links = discoverer().discover(&source, &NoopSink).await;

    assert_eq!(
        links,
        vec![entry_url("var_close"), entry_url("fun_ta.sma"), entry_url("kw_if")]
    );
}

#[tokio::test]
async fn pattern_without_links_times_out_and_discovery_continues() {
    let source = StaticSource::new().with_page(INDEX_URL, index_page(&["var_open", "an_version"]));
    let sink = RecordingSink::new();

    let links = discoverer().discover(&source, &sink).await;
    assert_eq!(links, vec![entry_url("var_open"), entry_url("an_version")]);

    let events = sink.take();
    assert!(events.contains(&HarvestEvent::PatternDiscovered {
        pattern: "#var_",
        count: 1
    }));
    assert!(events.contains(&HarvestEvent::DiscoveryTimeout { pattern: "#fun_" }));
    assert_eq!(
        events.last(),
        Some(&HarvestEvent::DiscoveryFinished { total: 2 })
    );
}

#[tokio::test]
async fn per_pattern_limit_truncates_each_pattern() {
    let source = StaticSource::new().with_page(
        INDEX_URL,
        index_page(&["fun_a", "fun_b", "fun_c", "type_int", "type_bool"]),
    );

    let links = discoverer()
        .with_per_pattern_limit(Some(1))
        .discover(&source, &NoopSink)
        .await;

    assert_eq!(links, vec![entry_url("fun_a"), entry_url("type_int")]);
}

#[tokio::test]
async fn unreachable_index_yields_no_links() {
    let source = StaticSource::new();
    let sink = RecordingSink::new();

    let links = discoverer().discover(&source, &sink).await;

    assert!(links.is_empty());
    assert_eq!(
        sink.take().last(),
        Some(&HarvestEvent::DiscoveryFinished { total: 0 })
    );
}
