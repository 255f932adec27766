#![no_main]

use libfuzzer_sys::fuzz_target;

use czicheck_domain::{check_from_name, resolve_checks};
use czicheck_types::Checks;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    if let Ok(mask) = resolve_checks(&s) {
        assert!(Checks::ALL.contains(mask));
    }
    if let Some(check) = check_from_name(&s) {
        assert!(check.is_single());
    }
});
