use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_blends() {
    let dst = [0, 0, 255, 255];
    let src = [128, 0, 0, 128];
    assert_eq!(over(dst, src), [128, 0, 127, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
    assert!(over_in_place(&mut dst[..6], &[0u8; 6]).is_err());
}

#[test]
fn over_in_place_applies_per_pixel() {
    let mut dst = vec![1, 2, 3, 255, 9, 9, 9, 255];
    let src = [0, 0, 0, 0, 0, 255, 0, 255];
    over_in_place(&mut dst, &src).unwrap();
    assert_eq!(dst, vec![1, 2, 3, 255, 0, 255, 0, 255]);
}
