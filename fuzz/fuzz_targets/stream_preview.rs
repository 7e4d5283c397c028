#![no_main]

use std::io::Cursor;

use lambda_emu::runtime::parser::{preview, StreamLines, PREVIEW_CHARS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut expected = 1;
    for line in StreamLines::new(Cursor::new(data)) {
        let Ok(line) = line else { break };
        assert_eq!(line.sequence, expected);
        expected += 1;

        let shown = preview(&line.raw);
        assert!(shown.chars().count() <= PREVIEW_CHARS + 3);
        let _ = line.parse();
    }
});
