use super::*;
use crate::surface::pen::Pen;

#[test]
fn nine_by_nine_is_two_5x5_and_one_3_tap_per_axis() {
    assert_eq!(
        plan_gaussian_passes(9, 9),
        vec![
            GaussianPass::Blur5x5,
            GaussianPass::Blur5x5,
            GaussianPass::Blur3x1,
            GaussianPass::Blur1x3,
        ]
    );
}

#[test]
fn greedy_plan_edge_cases() {
    assert!(plan_gaussian_passes(0, 0).is_empty());
    assert_eq!(
        plan_gaussian_passes(6, 2),
        vec![GaussianPass::Blur3x3, GaussianPass::Blur3x1, GaussianPass::Blur3x1]
    );
    assert_eq!(plan_gaussian_passes(0, 3), vec![GaussianPass::Blur1x3; 2]);
    assert_eq!(passes_reach(&plan_gaussian_passes(9, 9)), (5, 5));
}

#[test]
fn counts_match_plan() {
    let mut buf = vec![0.5f32; 20 * 20];
    let mut pen = Pen::new(&mut buf[..], 20, 20).unwrap();
    let counts = gaussian_blur(&mut pen, 20, 20, 9, 9).unwrap();
    assert_eq!(
        counts,
        GaussianPassCounts {
            blur_5x5: 2,
            blur_3x3: 0,
            blur_3x1: 1,
            blur_1x3: 1,
        }
    );
    assert_eq!(counts.total(), 4);
    assert!(buf.iter().all(|v| (*v - 0.5).abs() < 1e-6));
}

#[test]
fn impulse_response_of_5x5_is_binomial() {
    let weights = [1.0, 4.0, 6.0, 4.0, 1.0];
    let mut buf = vec![0.0f64; 49];
    buf[3 * 7 + 3] = 256.0;
    let mut pen = Pen::new(&mut buf[..], 7, 7).unwrap();
    gaussian_blur_5x5(&mut pen, 7, 7).unwrap();
    for dy in 0..5 {
        for dx in 0..5 {
            let v = buf[(1 + dy) * 7 + 1 + dx];
            assert!((v - weights[dx] * weights[dy]).abs() < 1e-9);
        }
    }
    assert_eq!(buf[0], 0.0);
}

#[test]
fn five_by_five_reflects_while_three_tap_clamps() {
    let line = [8.0f32, 0.0, 0.0, 0.0, 0.0, 0.0];

    let mut reflect = line.to_vec();
    gaussian_blur_5x5(&mut Pen::new(&mut reflect[..], 6, 1).unwrap(), 6, 1).unwrap();
    // 6 * 8 / 16: the mirrored neighbours are the zeros at 1 and 2.
    assert!((reflect[0] - 3.0).abs() < 1e-6);

    let mut clamp = line.to_vec();
    gaussian_blur_3x1(&mut Pen::new(&mut clamp[..], 6, 1).unwrap(), 6, 1).unwrap();
    // (8 + 2 * 8 + 0) / 4: the edge sample is replicated.
    assert!((clamp[0] - 6.0).abs() < 1e-6);
    assert!((clamp[1] - 2.0).abs() < 1e-6);
}

#[test]
fn passes_touch_only_the_region_at_the_cursor() {
    let mut buf = vec![0u8; 25];
    buf[12] = 160;
    let mut pen = Pen::new(&mut buf[..], 5, 5).unwrap();
    pen.move_to(1, 1);
    gaussian_blur_3x3(&mut pen, 3, 3).unwrap();
    assert_eq!(buf[12], 40);
    assert_eq!(buf[6], 10);
    assert_eq!(buf[7], 20);
    assert_eq!(buf[0], 0);
    assert_eq!(buf[24], 0);
}

#[test]
fn region_outside_buffer_is_rejected() {
    let mut buf = vec![0.0f32; 16];
    let mut pen = Pen::new(&mut buf[..], 4, 4).unwrap();
    pen.move_to(2, 2);
    assert!(gaussian_blur_3x3(&mut pen, 3, 3).is_err());
    assert!(gaussian_blur(&mut pen, 2, 2, 1, 1).is_ok());
}

#[test]
fn direct_reach_agrees_with_the_planned_passes() {
    for bx in 0..24 {
        for by in 0..24 {
            assert_eq!(
                gaussian_reach(bx, by),
                passes_reach(&plan_gaussian_passes(bx, by)),
                "budget ({bx}, {by})"
            );
        }
    }
}
