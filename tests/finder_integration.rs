use oxilz::engine::{self, Token};
use oxilz::{FinderConfig, Match, MatchFinder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLE_TEXT: &str = "LZMA decoder test example
=========================
! LZMA ! Decoder ! TEST !
=========================
! TEST ! LZMA ! Decoder !
=========================
---- Test Line 1 --------
=========================
---- Test Line 2 --------
=========================
=== End of test file ====
=========================
";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn finder_walks_text_sample() {
    init_logger();
    const DEPTH: usize = 20;
    let config = FinderConfig::default()
        .with_dict_capacity(4096)
        .with_headroom(4096)
        .with_depth(DEPTH)
        .with_max_match_len(200);
    let mut f = MatchFinder::new(config).unwrap();
    let text = SAMPLE_TEXT.as_bytes();
    assert_eq!(f.write(text).unwrap(), text.len());
    f.finish();

    let mut matches = [Match::default(); DEPTH];
    let mut tokens = Vec::new();
    let mut longest = 0;
    while f.buffered() > 0 {
        let pos = f.position() as usize;
        let n = f.find_matches(&mut matches);
        for pair in matches[..n].windows(2) {
            assert!(pair[0].length < pair[1].length, "pos {pos}: {pair:?}");
        }
        for m in &matches[..n] {
            assert!(m.distance >= 1 && m.distance <= pos);
            assert!(m.length >= f.min_match_len());
            let src = pos - m.distance;
            assert_eq!(
                &text[src..src + m.length],
                &text[pos..pos + m.length],
                "pos {pos}: {m:?}"
            );
            if pos + m.length < text.len() {
                // Extension stops at the first mismatch.
                assert_ne!(text[src + m.length], text[pos + m.length]);
            }
        }
        let token = if n == 0 {
            Token::Literal(text[pos])
        } else {
            longest = longest.max(matches[n - 1].length);
            matches[n - 1].into()
        };
        assert_eq!(f.skip(token.len()), token.len());
        tokens.push(token);
    }

    // The separator line (26 bytes with newline) repeats five times.
    assert!(longest >= 26, "longest match {longest}");
    assert!(tokens.len() < text.len() / 2);
    assert_eq!(engine::expand(&tokens, 4096).unwrap(), text);
}

#[test]
fn streaming_with_tiny_window_round_trips() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..20_000).map(|_| b"abcd"[rng.random_range(0..4)]).collect();
    let config = FinderConfig::default()
        .with_dict_capacity(64)
        .with_headroom(16)
        .with_depth(8);

    let tokens = engine::parse(&data, &config).unwrap();
    for t in &tokens {
        if let Token::Match { distance, length } = *t {
            assert!(distance <= 64);
            assert!((2..=16).contains(&length));
        }
    }
    assert_eq!(engine::expand(&tokens, 64).unwrap(), data);
}

#[test]
fn presets_round_trip_structured_data() {
    let mut data = Vec::new();
    for i in 0..2_000u32 {
        data.extend_from_slice(format!("record {:05} value={}\n", i % 700, i * 7 % 13).as_bytes());
    }
    for config in [
        FinderConfig::fast(),
        FinderConfig::default(),
        FinderConfig::thorough(),
    ] {
        let config = config.with_dict_capacity(1 << 15);
        let tokens = engine::parse(&data, &config).unwrap();
        assert!(tokens.len() < data.len() / 2, "preset {}", config.name);
        assert_eq!(
            engine::expand(&tokens, 1 << 15).unwrap(),
            data,
            "preset {}",
            config.name
        );
    }
}

#[test]
fn reset_separates_streams() {
    let config = FinderConfig::default()
        .with_dict_capacity(1024)
        .with_headroom(1024);
    let mut f = MatchFinder::new(config).unwrap();
    f.write(b"segment one segment").unwrap();
    f.skip(12);
    let mut out = [Match::default(); 4];
    assert!(f.find_matches(&mut out) > 0);

    f.reset();
    f.write(b"segment").unwrap();
    assert_eq!(f.find_matches(&mut out), 0);
    assert!(!f.is_eof());
}
