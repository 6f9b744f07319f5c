//! Interpolation kernels over flat component slices.
//!
//! Weight convention: `t` is the weight of the EARLIER keyframe `a`, so
//! `result = a*t + b*(1-t)`. `t = 1` lands on `a`, `t = 0` on `b`.
//! Quaternion sub-ranges are slerped from `b` toward `a` with the same `t`
//! and renormalized, for both linear and cubic modes.

use keytake_api_core::blend::{lerp, slerp};

use crate::kind::TypeLayout;

/// Scalar blend with `t` weighting `a`.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    lerp(b, a, t)
}

/// Hermite spline, `s` in [0,1] running from `p0` to `p1`.
#[inline]
pub fn hermite(p0: f32, p1: f32, t0: f32, t1: f32, s: f32) -> f32 {
    let s2 = s * s;
    let s3 = s2 * s;
    let h1 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h2 = -2.0 * s3 + 3.0 * s2;
    let h3 = s3 - 2.0 * s2 + s;
    let h4 = s3 - s2;
    h1 * p0 + h2 * p1 + h3 * t0 + h4 * t1
}

#[inline]
fn quat_at(c: &[f32], offset: usize) -> [f32; 4] {
    [c[offset], c[offset + 1], c[offset + 2], c[offset + 3]]
}

/// Overwrite the layout's rotation sub-range with `slerp(b, a, t)`.
#[inline]
fn slerp_rotation(layout: TypeLayout, a: &[f32], b: &[f32], t: f32, out: &mut [f32]) {
    if let Some(r) = layout.rotation_offset {
        let q = slerp(quat_at(b, r), quat_at(a, r), t);
        out[r..r + 4].copy_from_slice(&q);
    }
}

/// Linear interpolation of two keyframes into `out` (resized to fit).
pub fn linear_into(layout: TypeLayout, a: &[f32], b: &[f32], t: f32, out: &mut Vec<f32>) {
    out.clear();
    out.extend(a.iter().zip(b).map(|(&x, &y)| mix(x, y, t)));
    slerp_rotation(layout, a, b, t, out);
}

/// Cubic Hermite interpolation using the keyframes around the segment.
///
/// `pre_a` is the keyframe before `a` (or `a` itself at the start), `post_b`
/// the one after `b` (or `b` itself at the end).
pub fn cubic_into(
    layout: TypeLayout,
    pre_a: &[f32],
    a: &[f32],
    b: &[f32],
    post_b: &[f32],
    t: f32,
    out: &mut Vec<f32>,
) {
    let s = 1.0 - t;
    out.clear();
    out.extend((0..a.len()).map(|i| {
        let p0 = a[i];
        let p1 = b[i];
        let t0 = p1 - pre_a[i];
        let t1 = post_b[i] - p0;
        hermite(p0, p1, t0, t1, s)
    }));
    slerp_rotation(layout, a, b, t, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::TrackType;

    #[test]
    fn mix_weights_the_earlier_sample() {
        assert_eq!(mix(0.0, 10.0, 0.5), 5.0);
        assert_eq!(mix(0.0, 10.0, 0.0), 10.0);
        assert_eq!(mix(0.0, 10.0, 1.0), 0.0);
    }

    #[test]
    fn hermite_hits_endpoints() {
        assert_eq!(hermite(2.0, 8.0, 1.0, 1.0, 0.0), 2.0);
        assert_eq!(hermite(2.0, 8.0, 1.0, 1.0, 1.0), 8.0);
    }

    #[test]
    fn linear_trans10_mixes_lerp_and_slerp() {
        let layout = TrackType::Trans10.layout();
        let h = std::f32::consts::FRAC_1_SQRT_2;
        let a = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let b = [2.0, 4.0, 6.0, 0.0, h, 0.0, h, 3.0, 3.0, 3.0];
        let mut out = Vec::new();
        linear_into(layout, &a, &b, 0.5, &mut out);
        assert_eq!(&out[0..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&out[7..10], &[2.0, 2.0, 2.0]);
        let q = &out[3..7];
        let norm = q.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        // half of a quarter turn about Y
        let expected = (std::f32::consts::PI / 8.0).sin();
        assert!((q[1] - expected).abs() < 1e-5, "q={q:?}");
    }

    #[test]
    fn cubic_on_straight_line_stays_linear() {
        let layout = TrackType::Number.layout();
        let mut out = Vec::new();
        // evenly spaced collinear keys: tangents equal the segment span
        cubic_into(layout, &[0.0], &[1.0], &[2.0], &[3.0], 0.5, &mut out);
        assert!((out[0] - 1.5).abs() < 1e-6);
    }
}
