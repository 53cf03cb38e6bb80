#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // The parser must never panic, and neither may rendering what it accepts.
        if let Ok(formula) = ctxeq_dsl::parse(s) {
            let _ = ctxeq_dsl::parse(&formula.to_string());
        }
        if let Ok(formula) = ctxeq_dsl::parse_ctl(s) {
            let _ = ctxeq_dsl::parse_ctl(&formula.to_string());
        }
    }
});
