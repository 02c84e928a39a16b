use super::*;
use crate::surface::pen::PenRef;

fn clamped_mean(src: &[f64], i: isize, k: isize) -> f64 {
    let n = src.len() as isize;
    let sum: f64 = (-k..=k).map(|j| src[(i + j).clamp(0, n - 1) as usize]).sum();
    sum / (2 * k + 1) as f64
}

#[test]
fn flat_field_stays_flat() {
    let src = vec![2.0f32; 100];
    let mut dst = vec![0.0f32; 100];
    let sp = PenRef::new(&src[..], 10, 10).unwrap();
    let mut dp = Pen::new(&mut dst[..], 10, 10).unwrap();
    box_blur(&sp, sp.end(), 2, 2, &mut dp).unwrap();
    assert!(dst.iter().all(|v| (*v - 2.0).abs() < 1e-6));
}

#[test]
fn each_output_is_the_clamped_window_mean() {
    let row: Vec<f64> = [0.0, 1.0, 5.0, 2.0, 8.0, 3.0, 3.0].to_vec();
    let mut out = vec![0.0f64; row.len()];
    let sp = PenRef::new(&row[..], row.len(), 1).unwrap();
    let mut dp = Pen::new(&mut out[..], row.len(), 1).unwrap();
    hbox_blur(&sp, sp.end(), 2, &mut dp).unwrap();
    for (i, v) in out.iter().enumerate() {
        let expect = clamped_mean(&row, i as isize, 2);
        assert!((v - expect).abs() < 1e-12, "sample {i}: {v} vs {expect}");
    }
}

#[test]
fn vertical_matches_horizontal_on_transpose() {
    let (w, h) = (3usize, 5usize);
    let src: Vec<f32> = (0..w * h).map(|i| (i * 7 % 11) as f32).collect();
    let transposed: Vec<f32> = (0..w * h).map(|i| src[(i % h) * w + i / h]).collect();

    let mut v_out = vec![0.0f32; w * h];
    let sp = PenRef::new(&src[..], w, h).unwrap();
    vbox_blur(&sp, sp.end(), 1, &mut Pen::new(&mut v_out[..], w, h).unwrap()).unwrap();

    let mut h_out = vec![0.0f32; w * h];
    let tp = PenRef::new(&transposed[..], h, w).unwrap();
    hbox_blur(&tp, tp.end(), 1, &mut Pen::new(&mut h_out[..], h, w).unwrap()).unwrap();

    for y in 0..h {
        for x in 0..w {
            assert!((v_out[y * w + x] - h_out[x * h + y]).abs() < 1e-5);
        }
    }
}

#[test]
fn sub_region_is_blurred_in_isolation() {
    // Samples outside the region are never read, even when the window
    // reaches past the region edge.
    let src = vec![9u8, 1, 1, 1, 9];
    let mut dst = vec![0u8; 3];
    let mut sp = PenRef::new(&src[..], 5, 1).unwrap();
    sp.move_to(1, 0);
    hbox_blur(&sp, PenPos::new(4, 1), 3, &mut Pen::new(&mut dst[..], 3, 1).unwrap()).unwrap();
    assert_eq!(dst, vec![1, 1, 1]);
}

#[test]
fn u16_window_at_accumulator_limit_does_not_overflow() {
    let src = vec![u16::MAX; 8];
    let mut dst = vec![0u16; 8];
    let sp = PenRef::new(&src[..], 8, 1).unwrap();
    hbox_blur(&sp, sp.end(), 32_768, &mut Pen::new(&mut dst[..], 8, 1).unwrap()).unwrap();
    assert!(dst.iter().all(|v| *v == u16::MAX));

    let err = hbox_blur(&sp, sp.end(), 32_769, &mut Pen::new(&mut dst[..], 8, 1).unwrap());
    assert!(matches!(err, Err(StrataError::Validation(_))));
}

#[test]
fn destination_too_small_is_rejected() {
    let src = vec![0.0f32; 16];
    let mut dst = vec![0.0f32; 9];
    let sp = PenRef::new(&src[..], 4, 4).unwrap();
    let res = hbox_blur(&sp, sp.end(), 1, &mut Pen::new(&mut dst[..], 3, 3).unwrap());
    assert!(res.is_err());
}
