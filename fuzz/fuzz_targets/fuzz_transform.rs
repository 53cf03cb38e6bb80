#![no_main]
use libfuzzer_sys::fuzz_target;

use ctxeq_ir::logic::Logic;
use ctxeq_ir::transform::{ContextMode, Transformer};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Some((left, right)) = s.split_once('\n') else {
        return;
    };
    let (Ok(left), Ok(right)) = (ctxeq_dsl::parse(left), ctxeq_dsl::parse(right)) else {
        return;
    };
    for mode in [ContextMode::Monotonic, ContextMode::General] {
        if let Ok(t) = Transformer::new(mode, Logic::Ltl.premise_wrap()).translate(&left, &right) {
            assert!(!t.left.has_context());
            assert!(!t.right.has_context());
            let _ = t.contexts.canonical_context();
        }
    }
});
