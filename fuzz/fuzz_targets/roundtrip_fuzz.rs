#![no_main]
use libfuzzer_sys::fuzz_target;
use oxilz::FinderConfig;
use oxilz::engine;

fuzz_target!(|data: &[u8]| {
    let Some((&flags, payload)) = data.split_first() else {
        return;
    };

    // The first byte picks the geometry.
    let dict = 16usize << (flags & 0x7);
    let headroom = 8usize << ((flags >> 3) & 0x3);
    let depth = 1 + (flags >> 5) as usize * 8;

    let config = FinderConfig::default()
        .with_dict_capacity(dict)
        .with_headroom(headroom)
        .with_depth(depth);
    let tokens = engine::parse(payload, &config).unwrap();
    for t in &tokens {
        if let engine::Token::Match { distance, .. } = *t {
            assert!(distance >= 1 && distance <= dict);
        }
    }
    let decoded = engine::expand(&tokens, dict).unwrap();
    assert_eq!(decoded, payload);
});
