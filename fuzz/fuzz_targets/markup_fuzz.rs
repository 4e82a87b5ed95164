//! Fuzz the markup renderer with arbitrary UTF-8.
//!
//! Run with: cargo +nightly fuzz run markup_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use nexus_markup::{render, to_plain_text, MarkupBlock};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let blocks = render(input);

        // One block per input line
        assert_eq!(blocks.len(), input.split('\n').count());

        for block in &blocks {
            if let MarkupBlock::Header(heading) = block {
                assert!((1..=3).contains(&heading.tier()));
            }
        }

        let _ = to_plain_text(&blocks);
    }
});
