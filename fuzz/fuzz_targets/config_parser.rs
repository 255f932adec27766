#![no_main]

use libfuzzer_sys::fuzz_target;

use czicheck_domain::resolve_checks;
use czicheck_types::ConfigFile;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(cfg) = toml::from_str::<ConfigFile>(text) else {
        return;
    };
    if let Some(list) = cfg.defaults.checks.as_deref() {
        let _ = resolve_checks(list);
    }
});
