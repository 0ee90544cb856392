#![no_main]
use libfuzzer_sys::fuzz_target;
use oxilz::{Window, WindowError};

fuzz_target!(|data: &[u8]| {
    let mut w = Window::new(64, 16).unwrap();
    let mut model: Vec<u8> = Vec::new();
    let mut drained = 0usize;
    let mut buf = [0u8; 64];

    for op in data.chunks_exact(3) {
        let (kind, a, b) = (op[0], op[1], op[2]);
        match kind % 3 {
            0 => {
                let bytes = [a; 8];
                let n = match w.append_literal(&bytes[..(b as usize % 8) + 1]) {
                    Ok(n) => n,
                    Err(WindowError::Capacity { .. }) => 0,
                    Err(e) => panic!("{e}"),
                };
                model.extend(std::iter::repeat_n(a, n));
            }
            1 => {
                let (distance, length) = (a as usize, b as usize % 40);
                if w.append_copy(distance, length).is_ok() {
                    for _ in 0..length {
                        model.push(model[model.len() - distance]);
                    }
                }
            }
            _ => {
                let n = w.consume(&mut buf[..a as usize % 64]).len();
                assert_eq!(&buf[..n], &model[drained..drained + n]);
                drained += n;
            }
        }
        assert!(w.read_position() <= w.position());
        assert!(w.position() <= w.read_position() + w.capacity() as u64);
        assert_eq!(w.position() as usize, model.len());
    }
});
