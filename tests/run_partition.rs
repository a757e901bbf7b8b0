mod common;

use common::fixtures::{assert_partition, offline_converter};
use html_runs::{ConvertOptions, StaticHost};

const FRAGMENTS: &[&str] = &[
    "<b>", "</b>", "<i>", "</i>", "<u>", "</u>", "<p>", "</p>", "<div>", "</div>", "<ul>",
    "</ul>", "<ol type=\"a\">", "</ol>", "<li>", "</li>", "<pre>", "</pre>", "<code>",
    "</code>", "<table>", "</table>", "<tr>", "</tr>", "<td>", "</td>", "<th>", "</th>",
    "<h2>", "</h2>", "<br>", "<br/>", "<mark>", "</mark>", "<a href=\"https://x.test\">",
    "</a>", "<span style=\"color: red; font-size: 20px\">", "</span>", "<blink>", "</blink>",
    "<img src=\"nowhere.png\">", "&amp;", "&#65;", "&#xZZ;", " ", "  \n ", "word", "\u{e9}t\u{e9}",
    "\t", "x y",
];

/// Deterministic xorshift so failures are reproducible.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next() % items.len() as u64) as usize]
    }
}

fn random_markup(rng: &mut Rng, len: usize) -> String {
    (0..len).map(|_| rng.pick(FRAGMENTS)).collect()
}

#[test]
fn runs_partition_the_stream_for_generated_markup() {
    let host = StaticHost::default();
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
    for options in [ConvertOptions::default(), ConvertOptions::preserve_whitespace()] {
        let mut engine = offline_converter(options);
        for case in 0..300 {
            let len = 1 + (rng.next() % 40) as usize;
            let html = random_markup(&mut rng, len);
            let doc = engine.convert(&html, &host);
            assert_partition(&doc);
            for (&run_index, target) in doc.links() {
                let run = doc
                    .runs()
                    .get(run_index)
                    .unwrap_or_else(|| panic!("case {}: dangling link index {}", case, run_index));
                assert_eq!(run.link.as_deref(), Some(target.as_str()));
            }
            for image in doc.images() {
                assert!(image.offset <= doc.char_len());
            }
        }
    }
}

#[test]
fn run_lookup_agrees_with_partition() {
    let doc = common::fixtures::convert(
        "<h1>Title</h1><p>Some <b>bold</b> and <a href=\"u\">link</a>.</p><ul><li>item</li></ul>",
    );
    assert_partition(&doc);
    for offset in 0..doc.char_len() {
        let (idx, run) = doc.run_at(offset).expect("every offset is covered");
        assert!(run.contains(offset));
        assert_eq!(&doc.runs()[idx], run);
    }
    assert!(doc.run_at(doc.char_len()).is_none());

    let rebuilt: String = doc.runs().iter().map(|run| doc.run_text(run)).collect();
    assert_eq!(rebuilt, doc.text());
}

#[test]
fn garbage_input_never_panics() {
    let host = StaticHost::default();
    let mut engine = offline_converter(ConvertOptions::default());
    for html in [
        "<",
        "<<<>>>",
        "</",
        "<b",
        "<p attr=\"unterminated>text",
        "<!-- unterminated comment",
        "<![CDATA[raw <b> text]]>after",
        "</b></i></u></li></ol></ul></table>",
        "<li>orphan item</li>",
        "&",
        "a & b",
        "&#;",
        "<script>if (a < b) { x(); }</script>tail",
    ] {
        let doc = engine.convert(html, &host);
        assert_partition(&doc);
    }
}

#[test]
fn orphan_list_item_emits_no_marker() {
    let doc = common::fixtures::convert("<li>orphan</li>");
    assert_eq!(doc.text(), "orphan");
}

#[test]
fn cdata_is_treated_as_text() {
    let doc = common::fixtures::convert("<p><![CDATA[a <b> c]]></p>");
    assert_eq!(doc.text(), "a <b> c");
}
