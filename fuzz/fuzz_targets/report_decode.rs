//! Engine output is untrusted: decoding must never panic, and
//! `file_result_from_payload` must always produce a result.

#![no_main]

use libfuzzer_sys::fuzz_target;

use czicheck_domain::{decode_report, file_result_from_payload};
use czicheck_types::CheckStatus;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let _ = decode_report(&s, "fuzz.czi");

    let result = file_result_from_payload("fuzz.czi", Some(&s), None);
    if result.diagnostic().is_some() && result.check_results().is_empty() {
        assert_eq!(result.file_status(), CheckStatus::Fail);
    }
});
