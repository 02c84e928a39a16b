use super::*;

#[test]
fn integer_narrowing_rounds_to_nearest() {
    assert_eq!(u8::narrow(10, 4), 3);
    assert_eq!(u8::narrow(9, 4), 2);
    assert_eq!(u16::narrow(u32::MAX, 65537), 65535);
}

#[test]
fn integer_windows_match_accumulator_headroom() {
    assert_eq!(u16::max_window(), 65537);
    assert_eq!(u8::max_window(), 16_843_009);
    let full = (0..u16::max_window()).fold(0u32, |acc, _| acc + u16::MAX.widen());
    assert_eq!(full, u32::MAX);
}

#[test]
fn float_accumulation_keeps_precision() {
    let mut acc = 0.0f64;
    for _ in 0..1_000_000 {
        acc = acc + 0.1f32.widen();
    }
    let mean = f32::narrow(acc, 1_000_000);
    assert!((mean - 0.1).abs() < 1e-6);
}

#[test]
fn color_accumulator_is_per_channel() {
    let a = Color::new(1.0, 0.0, 0.5, 1.0).widen();
    let b = Color::new(0.0, 1.0, 0.5, 0.0).widen();
    assert_eq!(Color::narrow(a + b, 2), Color::new(0.5, 0.5, 0.5, 0.5));
    assert_eq!(Color::narrow(a + b - b, 1), Color::new(1.0, 0.0, 0.5, 1.0));
}
