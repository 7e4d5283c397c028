#![no_main]

use lambda_emu::handler::HandlerReference;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(reference) = HandlerReference::parse(raw) {
            assert!(!reference.module().is_empty());
            assert!(!reference.function().is_empty());
            assert_eq!(
                format!("{}.{}", reference.module(), reference.function()),
                raw
            );
        }
    }
});
