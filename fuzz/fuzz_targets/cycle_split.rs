#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    len: u8,
    i: i16,
    j: i16,
}

fuzz_target!(|input: Input| {
    let n = input.len as usize % 32 + 1;
    let items: Vec<usize> = (0..n).collect();
    let (a, b) = diskmatch::cycle_split(&items, input.i as isize, input.j as isize);

    assert_eq!(a.first(), b.last());
    assert_eq!(a.last(), b.first());
    assert_eq!(a.len() + b.len(), n + 2);

    let mut walk = a.clone();
    walk.extend_from_slice(&b[1..b.len() - 1]);
    for (k, w) in walk.iter().enumerate() {
        assert_eq!(*w, (walk[0] + k) % n);
    }
});
