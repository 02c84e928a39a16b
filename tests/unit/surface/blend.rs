use super::*;

fn approx(a: Color, b: Color) -> bool {
    a.channels()
        .iter()
        .zip(b.channels())
        .all(|(x, y)| (x - y).abs() < 1e-5)
}

#[test]
fn composite_opaque_source_replaces_destination() {
    let src = Color::new(0.2, 0.4, 0.6, 1.0);
    let dst = Color::new(1.0, 1.0, 1.0, 1.0);
    assert!(approx(BlendMethod::Composite.blend(src, dst, 1.0), src));
}

#[test]
fn composite_half_alpha_over_opaque() {
    let src = Color::new(1.0, 0.0, 0.0, 0.5);
    let dst = Color::new(0.0, 0.0, 1.0, 1.0);
    let out = BlendMethod::Composite.blend(src, dst, 1.0);
    assert!(approx(out, Color::new(0.5, 0.0, 0.5, 1.0)));
}

#[test]
fn composite_of_two_transparent_pixels_is_transparent() {
    let out = BlendMethod::Composite.blend(Color::transparent(), Color::transparent(), 1.0);
    assert_eq!(out, Color::transparent());
}

#[test]
fn straight_interpolates_alpha_too() {
    let src = Color::new(1.0, 1.0, 1.0, 0.0);
    let dst = Color::new(0.5, 0.5, 0.5, 1.0);
    let full = BlendMethod::Straight.blend(src, dst, 1.0);
    assert_eq!(full, Color::transparent());
    let half = BlendMethod::Straight.blend(src, dst, 0.5);
    assert!(approx(half, Color::new(0.5, 0.5, 0.5, 0.5)));
}

#[test]
fn onto_keeps_destination_alpha() {
    let src = Color::new(1.0, 0.0, 0.0, 1.0);
    let dst = Color::new(0.0, 1.0, 0.0, 0.25);
    let out = BlendMethod::Onto.blend(src, dst, 1.0);
    assert!(approx(out, Color::new(1.0, 0.0, 0.0, 0.25)));
}

#[test]
fn behind_places_destination_on_top() {
    let src = Color::new(1.0, 0.0, 0.0, 1.0);
    let dst = Color::new(0.0, 1.0, 0.0, 1.0);
    assert!(approx(BlendMethod::Behind.blend(src, dst, 1.0), dst));
}

#[test]
fn multiply_and_screen_with_white_and_black() {
    let dst = Color::new(0.4, 0.6, 0.8, 1.0);
    assert!(approx(BlendMethod::Multiply.blend(Color::white(), dst, 1.0), dst));
    assert!(approx(
        BlendMethod::Multiply.blend(Color::black(), dst, 1.0),
        Color::new(0.0, 0.0, 0.0, 1.0)
    ));
    assert!(approx(BlendMethod::Screen.blend(Color::black(), dst, 1.0), dst));
}

#[test]
fn add_is_cropped_to_destination_alpha() {
    let src = Color::new(0.25, 0.25, 0.25, 1.0);
    let dst = Color::new(0.5, 0.5, 0.5, 0.5);
    let out = BlendMethod::Add.blend(src, dst, 1.0);
    assert!(approx(out, Color::new(0.5, 0.5, 0.5, 0.5)));
}

#[test]
fn brighten_and_darken_pick_extremes() {
    let src = Color::new(0.8, 0.1, 0.5, 1.0);
    let dst = Color::new(0.5, 0.5, 0.5, 1.0);
    assert!(approx(
        BlendMethod::Brighten.blend(src, dst, 1.0),
        Color::new(0.8, 0.5, 0.5, 1.0)
    ));
    assert!(approx(
        BlendMethod::Darken.blend(src, dst, 1.0),
        Color::new(0.5, 0.1, 0.5, 1.0)
    ));
}

#[test]
fn alpha_over_cuts_destination() {
    let src = Color::new(0.0, 0.0, 0.0, 1.0);
    let dst = Color::new(0.3, 0.3, 0.3, 1.0);
    assert_eq!(BlendMethod::AlphaOver.blend(src, dst, 1.0), Color::transparent());
}
