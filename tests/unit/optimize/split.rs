use super::*;
use crate::foundation::core::{Color, Vec2};
use crate::optimize::lower::LowerSoftware;
use crate::render::arena::SurfaceArena;
use crate::render::engine::RenderOpts;
use crate::task::clamp::ClampParams;
use crate::task::params::{BlendParams, BlurKind, BlurParams};

fn tiled_opts() -> RenderOpts {
    RenderOpts {
        parallel: true,
        tile_rows: 4,
        min_split_rows: 4,
        ..RenderOpts::default()
    }
}

fn lowered(task: Task, arena: &mut SurfaceArena, w: usize, h: usize) -> (Task, SurfaceId) {
    let out = arena.alloc(w, h, false).unwrap();
    let mut task = task;
    task.target_surface = Some(out);
    task.trunc_target_rect(RectInt::with_size(w as i32, h as i32));
    (task, out)
}

fn clamp_over_blend() -> Task {
    let full = RectInt::new(0, 0, 8, 10);
    Task::clamp(
        ClampParams::default(),
        Task::blend(
            BlendParams::default(),
            Task::solid(Color::white(), full),
            Task::solid(Color::new(2.0, 0.0, 0.0, 1.0), full),
        ),
    )
}

#[test]
fn tall_task_becomes_a_list_of_row_tiles() {
    let mut arena = SurfaceArena::new();
    let (mut task, out) = lowered(clamp_over_blend(), &mut arena, 8, 10);
    let opts = tiled_opts();
    let mut cx = OptimizeContext::new(&mut arena, &opts);
    LowerSoftware.run(&mut task, &mut cx).unwrap();
    assert_eq!(cx.report().scratch.len(), 2);

    SplitTiles.run(&mut task, &mut cx).unwrap();
    assert!(matches!(task.kind, TaskKind::List));
    assert_eq!(task.target_surface, Some(out));
    assert_eq!(task.state, TaskState::Planned);

    let bands: Vec<RectInt> = task.sub_tasks.iter().map(|t| t.target_rect).collect();
    assert_eq!(
        bands,
        vec![
            RectInt::new(0, 0, 8, 4),
            RectInt::new(0, 4, 8, 8),
            RectInt::new(0, 8, 8, 10),
        ]
    );
    for tile in &task.sub_tasks {
        assert_eq!(tile.state, TaskState::Split);
        assert_eq!(tile.target_surface, Some(out));
    }

    let report = cx.into_report();
    assert_eq!(report.tiles, 3);
    assert_eq!(report.scratch.len(), 6);
    assert_eq!(arena.stats().released, 2);
    assert_eq!(arena.stats().live, 7);
}

#[test]
fn tiles_never_share_private_surfaces() {
    let mut arena = SurfaceArena::new();
    let (mut task, out) = lowered(clamp_over_blend(), &mut arena, 8, 10);
    let opts = tiled_opts();
    let mut cx = OptimizeContext::new(&mut arena, &opts);
    LowerSoftware.run(&mut task, &mut cx).unwrap();
    SplitTiles.run(&mut task, &mut cx).unwrap();

    let mut seen = Vec::new();
    for tile in &task.sub_tasks {
        for id in tile.written_surfaces() {
            if id == out {
                continue;
            }
            assert!(!seen.contains(&id), "surface {id} used by two tiles");
            seen.push(id);
        }
    }
    assert_eq!(seen.len(), 6);

    // The last band is two rows tall and its private surfaces are too.
    let last = &task.sub_tasks[2].sub_tasks[0].sub_tasks[0];
    assert_eq!(last.target_rect, RectInt::new(0, 0, 8, 2));
    assert_eq!(last.target_offset, VectorInt::new(0, -8));
    let s = cx.arena().get(last.target_surface.unwrap()).unwrap();
    assert_eq!((s.width(), s.height()), (8, 2));
}

#[test]
fn blur_is_not_split_but_its_input_may_be() {
    let mut arena = SurfaceArena::new();
    let blur = Task::blur(
        BlurParams::new(BlurKind::Box, Vec2::new(2.0, 2.0)),
        Task::clamp(
            ClampParams::default(),
            Task::solid(Color::white(), RectInt::new(0, 0, 8, 10)),
        ),
    );
    let (mut task, _) = lowered(blur, &mut arena, 8, 10);
    let opts = tiled_opts();
    let mut cx = OptimizeContext::new(&mut arena, &opts);
    LowerSoftware.run(&mut task, &mut cx).unwrap();
    SplitTiles.run(&mut task, &mut cx).unwrap();

    assert!(matches!(task.kind, TaskKind::Blur(_)));
    assert!(matches!(task.sub_tasks[0].kind, TaskKind::List));
    assert!(cx.report().tiles >= 3);
}

#[test]
fn short_tasks_and_sequential_runs_are_left_alone() {
    let mut arena = SurfaceArena::new();
    let (mut task, _) = lowered(clamp_over_blend(), &mut arena, 8, 10);
    let sequential = RenderOpts::default();
    let mut cx = OptimizeContext::new(&mut arena, &sequential);
    LowerSoftware.run(&mut task, &mut cx).unwrap();
    let before = task.clone();
    SplitTiles.run(&mut task, &mut cx).unwrap();
    assert_eq!(task, before);

    let short = RenderOpts {
        min_split_rows: 64,
        ..tiled_opts()
    };
    let mut cx = OptimizeContext::new(&mut arena, &short);
    SplitTiles.run(&mut task, &mut cx).unwrap();
    assert_eq!(task, before);
    assert_eq!(cx.report().tiles, 0);
}
