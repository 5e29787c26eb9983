#![no_main]

use dlcscan_vdf::fuzz_parse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    fuzz_parse(data);
});
