use super::*;

#[test]
fn negation_flips_every_channel() {
    let c = Color::new(0.25, -0.5, 1.0, 0.75);
    assert_eq!(-c, Color::new(-0.25, 0.5, -1.0, -0.75));
}

#[test]
fn premult_demult_roundtrip_for_nonzero_alpha() {
    let c = Color::new(0.5, 0.25, 1.0, 0.5);
    let back = c.premult().demult();
    assert!((back.r - c.r).abs() < 1e-6);
    assert!((back.g - c.g).abs() < 1e-6);
    assert!((back.b - c.b).abs() < 1e-6);
    assert_eq!(back.a, c.a);
    assert_eq!(Color::new(1.0, 1.0, 1.0, 0.0).demult(), Color::transparent());
}

#[test]
fn rgba8_conversion_saturates_out_of_range_channels() {
    let c = Color::new(1.5, -0.2, 0.5, 1.0);
    assert_eq!(c.to_rgba8(), [255, 0, 128, 255]);
    assert_eq!(Color::from_rgba8([255, 0, 0, 255]), Color::new(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn vector_int_arithmetic() {
    let a = VectorInt::new(3, -2);
    let b = VectorInt::new(1, 5);
    assert_eq!(a + b, VectorInt::new(4, 3));
    assert_eq!(a - b, VectorInt::new(2, -7));
    assert_eq!(-a, VectorInt::new(-3, 2));
}
