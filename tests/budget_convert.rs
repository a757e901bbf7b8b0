mod common;

use common::budget_alloc::BudgetAlloc;
use common::fixtures::offline_converter;
use html_runs::{ConvertOptions, StaticHost};

// Guardrail for a ~150KiB document against per-character or per-snapshot
// blowups. Tighten after measuring on CI.
const CONVERT_BUDGET_BYTES: usize = 24 * 1024 * 1024;

#[global_allocator]
static ALLOC: BudgetAlloc = BudgetAlloc::new();

fn long_document(sections: usize) -> String {
    let mut html = String::new();
    for i in 0..sections {
        html.push_str(&format!("<h2>Section {}</h2>", i));
        html.push_str(
            "<p>Lorem <b>ipsum</b> dolor <i>sit</i> amet, <a href=\"https://example.com\">consectetur</a> \
             adipiscing <span style=\"color: #333; font-size: 110%\">elit</span>.</p>",
        );
        html.push_str("<ul><li>alpha</li><li>beta<ol><li>gamma</li></ol></li></ul>");
        html.push_str("<table><tr><td>1</td><td>2</td><td>3</td></tr></table>");
    }
    html
}

#[test]
fn convert_long_document_under_budget() {
    let html = long_document(400);
    let host = StaticHost::default();
    let mut engine = offline_converter(ConvertOptions::default());

    let (doc, usage) = ALLOC.measure(|| engine.convert(&html, &host));
    assert!(!doc.runs().is_empty());
    assert!(doc.text().contains("Section 399"));
    assert!(
        usage.peak_bytes <= CONVERT_BUDGET_BYTES,
        "conversion peak heap {} exceeds budget {}",
        usage.peak_bytes,
        CONVERT_BUDGET_BYTES
    );
    assert!(usage.retained_bytes <= usage.peak_bytes);
}
