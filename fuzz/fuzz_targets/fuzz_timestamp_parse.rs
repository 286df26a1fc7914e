#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // First line is the date, the rest is the time
        let (date, time) = s.split_once('\n').unwrap_or((s, ""));
        let _ = keepsake::fuzz_api::parse_wall_clock(date, time);
        let stripped = keepsake::fuzz_api::strip_non_ascii(time);
        assert!(stripped.is_ascii());
    }
});
