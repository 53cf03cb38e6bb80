#![no_main]
use libfuzzer_sys::fuzz_target;

use ctxeq_smt::ctlsat::CtlSatEncoder;
use ctxeq_smt::encoder::BoolEncoder;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(formula) = ctxeq_dsl::parse(s) {
            let _ = BoolEncoder::new().encode(&formula);
            let _ = ctxeq_smt::spot::to_spot(&formula);
            if ctxeq_ir::ctl::check_ctl(&formula).is_ok() {
                let adapted = ctxeq_ir::ctl::adapt_ctl(&formula);
                let _ = CtlSatEncoder::new().encode(&adapted);
            }
        }
    }
});
