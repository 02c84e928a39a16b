use super::*;
use crate::foundation::core::{Color, VectorInt};
use crate::geometry::rect::RectInt;
use crate::render::arena::{SurfaceArena, SurfaceId};
use crate::render::engine::RenderOpts;
use crate::task::clamp::ClampParams;

fn bound_clamp(sub: Task, target: SurfaceId, offset: VectorInt, rect: RectInt) -> Task {
    let mut clamp = Task::clamp(ClampParams::default(), sub);
    clamp.target_surface = Some(target);
    clamp.target_offset = offset;
    clamp.target_rect = rect;
    clamp
}

#[test]
fn temporary_sub_task_shares_the_parent_surface() {
    let mut arena = SurfaceArena::new();
    let out = arena.alloc(16, 16, false).unwrap();
    let scratch = arena.alloc(8, 8, true).unwrap();
    let mut sub = Task::solid(Color::white(), RectInt::new(0, 0, 8, 8));
    sub.target_surface = Some(scratch);
    let mut clamp = bound_clamp(sub, out, VectorInt::new(4, 4), RectInt::new(4, 4, 12, 12));

    let opts = RenderOpts::default();
    let mut cx = OptimizeContext::new(&mut arena, &opts);
    ClampSW.run(&mut clamp, &mut cx).unwrap();

    let sub = &clamp.sub_tasks[0];
    assert_eq!(sub.target_surface, clamp.target_surface);
    assert_eq!(sub.target_offset, VectorInt::new(4, 4));
    assert_eq!(sub.target_rect, RectInt::new(4, 4, 12, 12));
    assert_eq!(cx.report().aliased, 1);
    assert!(cx.report().scratch.is_empty());
}

#[test]
fn unassigned_sub_task_counts_as_temporary() {
    let mut arena = SurfaceArena::new();
    let out = arena.alloc(10, 10, false).unwrap();
    let sub = Task::solid(Color::white(), RectInt::new(2, 2, 6, 6));
    let mut clamp = bound_clamp(sub, out, VectorInt::ZERO, RectInt::new(0, 0, 10, 10));

    let opts = RenderOpts::default();
    let mut cx = OptimizeContext::new(&mut arena, &opts);
    ClampSW.run(&mut clamp, &mut cx).unwrap();
    assert_eq!(clamp.sub_tasks[0].target_surface, Some(out));
    assert_eq!(clamp.sub_tasks[0].target_rect, RectInt::new(2, 2, 6, 6));
}

#[test]
fn persistent_sub_task_gets_a_fresh_surface_of_its_size() {
    let mut arena = SurfaceArena::new();
    let out = arena.alloc(16, 16, false).unwrap();
    let image = arena.alloc(8, 8, false).unwrap();
    let mut sub = Task::solid(Color::white(), RectInt::new(2, 2, 6, 5));
    sub.target_surface = Some(image);
    let mut clamp = bound_clamp(sub, out, VectorInt::ZERO, RectInt::new(0, 0, 16, 16));

    let opts = RenderOpts::default();
    let mut cx = OptimizeContext::new(&mut arena, &opts);
    ClampSW.run(&mut clamp, &mut cx).unwrap();

    let sub = &clamp.sub_tasks[0];
    let fresh = sub.target_surface.unwrap();
    assert_ne!(fresh, out);
    assert_ne!(fresh, image);
    assert_eq!(cx.report().scratch, vec![fresh]);
    assert_eq!(cx.report().aliased, 0);
    let s = cx.arena().get(fresh).unwrap();
    assert_eq!((s.width(), s.height()), (4, 3));
    assert_eq!(sub.target_rect, RectInt::new(0, 0, 4, 3));
    assert_eq!(sub.target_offset, VectorInt::new(-2, -2));
}

#[test]
fn in_place_can_be_disabled() {
    let mut arena = SurfaceArena::new();
    let out = arena.alloc(4, 4, false).unwrap();
    let sub = Task::solid(Color::white(), RectInt::new(0, 0, 4, 4));
    let mut clamp = bound_clamp(sub, out, VectorInt::ZERO, RectInt::new(0, 0, 4, 4));

    let opts = RenderOpts {
        in_place: false,
        ..RenderOpts::default()
    };
    let mut cx = OptimizeContext::new(&mut arena, &opts);
    ClampSW.run(&mut clamp, &mut cx).unwrap();
    assert_ne!(clamp.sub_tasks[0].target_surface, Some(out));
    assert_eq!(cx.report().scratch.len(), 1);
}

#[test]
fn clamp_without_surface_is_rejected() {
    let mut arena = SurfaceArena::new();
    let mut clamp = Task::clamp(
        ClampParams::default(),
        Task::solid(Color::white(), RectInt::new(0, 0, 1, 1)),
    );
    let opts = RenderOpts::default();
    let mut cx = OptimizeContext::new(&mut arena, &opts);
    assert!(matches!(
        ClampSW.run(&mut clamp, &mut cx),
        Err(StrataError::Validation(_))
    ));
}
