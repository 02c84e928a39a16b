use super::*;
use crate::foundation::core::Vec2;
use crate::task::params::BlurKind;

fn square(x: i32, y: i32, size: i32) -> RectInt {
    RectInt::new(x, y, x + size, y + size)
}

#[test]
fn constructors_derive_rects_from_sub_tasks() {
    let a = Task::solid(Color::white(), square(0, 0, 4));
    let b = Task::solid(Color::black(), square(10, 10, 2));
    assert_eq!(
        Task::blend(BlendParams::default(), a.clone(), b).target_rect,
        RectInt::new(0, 0, 12, 12)
    );
    assert_eq!(
        Task::translate(VectorInt::new(3, -1), a.clone()).target_rect,
        RectInt::new(3, -1, 7, 3)
    );
    let blur = Task::blur(BlurParams::new(BlurKind::Box, Vec2::new(4.0, 0.0)), a);
    assert_eq!(blur.target_rect, RectInt::new(-2, 0, 6, 4));
}

#[test]
fn truncation_propagates_blur_reach_into_sub_task() {
    let inner = Task::solid(Color::white(), square(0, 0, 100));
    let mut blur = Task::blur(BlurParams::new(BlurKind::Box, Vec2::new(6.0, 2.0)), inner);
    blur.trunc_target_rect(RectInt::new(10, 10, 20, 20));
    assert_eq!(blur.target_rect, RectInt::new(10, 10, 20, 20));
    assert_eq!(blur.sub_tasks[0].target_rect, RectInt::new(7, 9, 23, 21));
}

#[test]
fn truncation_follows_offsets_and_translation() {
    let inner = Task::solid(Color::white(), square(0, 0, 50));
    let mut t = Task::translate(VectorInt::new(5, 5), inner);
    // Surface pixel = frame + (-5, -5).
    t.target_offset = VectorInt::new(-5, -5);
    t.target_rect = t.target_rect.translate(t.target_offset);
    t.trunc_target_rect(RectInt::new(0, 0, 10, 10));
    assert_eq!(t.frame_rect(), RectInt::new(5, 5, 15, 15));
    assert_eq!(t.sub_tasks[0].target_rect, RectInt::new(0, 0, 10, 10));
}

#[test]
fn empty_truncation_empties_the_subtree() {
    let inner = Task::solid(Color::white(), square(0, 0, 4));
    let mut blur = Task::blur(BlurParams::new(BlurKind::Box, Vec2::new(8.0, 8.0)), inner);
    blur.trunc_target_rect(square(100, 100, 4));
    assert!(blur.is_empty());
    assert!(blur.sub_tasks[0].is_empty());
}

#[test]
fn split_clones_a_tile_and_refuses_blur() {
    let a = Task::solid(Color::white(), square(0, 0, 8));
    let clamp = Task::clamp(ClampParams::default(), a.clone());
    let tile = clamp.split(RectInt::new(0, 4, 8, 6)).unwrap();
    assert_eq!(tile.state, TaskState::Split);
    assert_eq!(tile.sub_tasks[0].target_rect, RectInt::new(0, 4, 8, 6));
    assert_eq!(clamp.target_rect, square(0, 0, 8));
    assert!(clamp.split(square(20, 20, 2)).is_none());

    let blur = Task::blur(BlurParams::new(BlurKind::Box, Vec2::new(2.0, 2.0)), a);
    assert!(!blur.is_splittable());
    assert!(Task::clamp(ClampParams::default(), blur).split(square(0, 0, 2)).is_none());
}

#[test]
fn validate_checks_arity_and_params() {
    let a = Task::solid(Color::white(), square(0, 0, 2));
    let mut bad = Task::blend(BlendParams::default(), a.clone(), a.clone());
    bad.sub_tasks.pop();
    assert!(matches!(bad.validate(), Err(StrataError::Validation(_))));

    let bad_clamp = Task::clamp(
        ClampParams {
            floor: 2.0,
            ..ClampParams::default()
        },
        a.clone(),
    );
    assert!(bad_clamp.validate().is_err());
    assert!(Task::list(vec![a.clone(), a]).validate().is_ok());
}

#[test]
fn counts_and_written_surfaces() {
    let a = Task::solid(Color::white(), square(0, 0, 2));
    let t = Task::blend(BlendParams::default(), a.clone(), Task::clamp(ClampParams::default(), a));
    assert_eq!(t.task_count(), 4);
    assert!(t.written_surfaces().is_empty());
}

#[test]
fn oversized_blur_saturates_its_rect_and_fails_validation() {
    let inner = Task::solid(Color::white(), square(0, 0, 4));
    let params = BlurParams::new(BlurKind::Box, Vec2::new(4294967294.0, 1e12));
    let mut blur = Task::blur(params, inner);
    assert!(blur.target_rect.contains(&square(0, 0, 4)));
    assert_eq!(blur.target_rect.maxx, i32::MAX);
    assert_eq!(blur.target_rect.miny, -i32::MAX);
    assert!(matches!(blur.validate(), Err(StrataError::Validation(_))));

    blur.trunc_target_rect(square(0, 0, 8));
    assert_eq!(blur.target_rect, square(0, 0, 8));
    assert_eq!(blur.sub_tasks[0].target_rect, square(0, 0, 4));
}
