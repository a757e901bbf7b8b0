use std::hint::black_box;
use std::time::Instant;

use html_runs::{
    ConvertOptions, HtmlConverter, ImageOptions, ImageResolver, OfflineFetcher, StaticHost,
};

const PARAGRAPH: &str = "<p>Some <b>bold</b>, some <i>italic</i> and a \
    <a href=\"https://example.com\">link</a> with <span style=\"color: red; font-size: 120%\">\
    inline style</span>.</p>\n";

const LIST: &str = "<ul><li>one</li><li>two<ol type=\"a\"><li>nested</li><li>again</li></ol></li></ul>\n";

const TABLE: &str = "<table><tr><th>a</th><th>b</th></tr><tr><td>1</td><td>2</td></tr></table>\n";

#[derive(Clone, Debug)]
struct CaseResult {
    case: String,
    iterations: usize,
    min_ns: u128,
    median_ns: u128,
    mean_ns: u128,
    max_ns: u128,
}

fn percentile_u128(sorted: &[u128], percentile: f64) -> u128 {
    let idx = ((sorted.len().saturating_sub(1) as f64) * percentile).round() as usize;
    sorted[idx]
}

fn build_document(blocks: usize) -> String {
    let mut html = String::with_capacity(blocks * (PARAGRAPH.len() + LIST.len() + TABLE.len()));
    for i in 0..blocks {
        html.push_str(&format!("<h2>Section {}</h2>\n", i));
        html.push_str(PARAGRAPH);
        html.push_str(LIST);
        html.push_str(TABLE);
        html.push_str("<pre>  keep\n    this </pre>\n");
    }
    html
}

fn run_case<F>(case: &str, warmup_iters: usize, measure_iters: usize, mut op: F) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..warmup_iters {
        black_box(op());
    }

    let mut samples = Vec::with_capacity(measure_iters);
    for _ in 0..measure_iters {
        let start = Instant::now();
        black_box(op());
        samples.push(start.elapsed().as_nanos());
    }
    samples.sort_unstable();
    let sum: u128 = samples.iter().copied().sum();

    CaseResult {
        case: case.to_string(),
        iterations: measure_iters,
        min_ns: samples[0],
        median_ns: percentile_u128(&samples, 0.5),
        mean_ns: sum / samples.len() as u128,
        max_ns: samples[samples.len() - 1],
    }
}

fn offline_engine(options: ConvertOptions) -> HtmlConverter {
    HtmlConverter::new(
        options,
        ImageResolver::new(OfflineFetcher, &ImageOptions::default()),
    )
}

fn main() {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let warmup_iters = if quick { 1 } else { 3 };
    let measure_iters = if quick { 5 } else { 25 };

    println!("# html-runs benchmark");
    println!(
        "# mode={} warmup_iters={} measure_iters={}",
        if quick { "quick" } else { "full" },
        warmup_iters,
        measure_iters
    );
    println!("case,iterations,min_ns,median_ns,mean_ns,max_ns");

    let host = StaticHost::default().with_families(["Helvetica", "Courier"]);
    let small = build_document(10);
    let large = build_document(500);

    let mut results = Vec::new();
    for (name, html) in [("small", &small), ("large", &large)] {
        results.push(run_case(
            &format!("convert_strip_{}", name),
            warmup_iters,
            measure_iters,
            || {
                let mut engine = offline_engine(ConvertOptions::default());
                engine.convert(html, &host).runs().len()
            },
        ));
        results.push(run_case(
            &format!("convert_keep_whitespace_{}", name),
            warmup_iters,
            measure_iters,
            || {
                let mut engine = offline_engine(ConvertOptions::preserve_whitespace());
                engine.convert(html, &host).runs().len()
            },
        ));
        results.push(run_case(
            &format!("tokenize_{}", name),
            warmup_iters,
            measure_iters,
            || html_runs::MarkupTokens::new(html).count(),
        ));
    }

    for result in &results {
        println!(
            "{},{},{},{},{},{}",
            result.case,
            result.iterations,
            result.min_ns,
            result.median_ns,
            result.mean_ns,
            result.max_ns
        );
    }
}
