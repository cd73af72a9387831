#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = diskmatch::arbitrary::matching_run(&mut Unstructured::new(data));
});
