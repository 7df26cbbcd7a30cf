mod common;

use common::budget_alloc::BudgetAlloc;
use common::fixtures::{engine, DIALOG, MED_FONT};

#[global_allocator]
static ALLOC: BudgetAlloc = BudgetAlloc::new();

// Counting is process-wide, so every measurement lives in this one test.
#[test]
fn layout_paths_stay_within_allocation_budget() {
    let engine = engine();
    let long_text = DIALOG.repeat(40);

    for width in [0, 40, 128, 640] {
        for text in [DIALOG, long_text.as_slice()] {
            let ((lines, widest, word, longest), report) = ALLOC.measure(|| {
                (
                    engine.count_lines(MED_FONT, text, width),
                    engine.max_line_width(MED_FONT, text, width),
                    engine.max_word_width(MED_FONT, text),
                    engine.longest_line_width(MED_FONT, text),
                )
            });
            assert!(lines > 0);
            assert!(widest > 0 && word > 0 && longest > 0);
            assert_eq!(
                report.allocs, 0,
                "queries allocated {} times at width {} ({} bytes peak)",
                report.allocs, width, report.peak_bytes
            );
        }
    }

    let (streamed, report) = ALLOC.measure(|| {
        let mut lines = 0usize;
        engine.layout_with(MED_FONT, DIALOG, 128, |_| lines += 1);
        lines
    });
    assert_eq!(streamed, 5);
    assert_eq!(report.allocs, 0, "streaming layout allocated");

    // Five lines fit the inline line buffer.
    let (collected, report) = ALLOC.measure(|| engine.layout_text(MED_FONT, DIALOG, 128).len());
    assert_eq!(collected, 5);
    assert_eq!(report.allocs, 0, "short layout spilled to the heap");

    let (collected, report) =
        ALLOC.measure(|| engine.layout_text(MED_FONT, &long_text, 128).len());
    assert!(collected > 8);
    println!(
        "layout lines={} allocs={} peak_kib={:.1}",
        collected,
        report.allocs,
        report.peak_bytes as f64 / 1024.0
    );
}
