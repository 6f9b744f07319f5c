//! Column-major 4x4 matrix helpers (translation in elements 12..15).
//!
//! Decomposition assumes a pure translation * rotation * scale composition;
//! shear and projection terms are dropped.

use crate::blend::normalize_quat;

/// Split a column-major 4x4 matrix into translation, rotation (x,y,z,w) and scale.
pub fn decompose_trs(m: &[f32; 16]) -> ([f32; 3], [f32; 4], [f32; 3]) {
    let pos = [m[12], m[13], m[14]];
    let scale = [
        (m[0] * m[0] + m[1] * m[1] + m[2] * m[2]).sqrt(),
        (m[4] * m[4] + m[5] * m[5] + m[6] * m[6]).sqrt(),
        (m[8] * m[8] + m[9] * m[9] + m[10] * m[10]).sqrt(),
    ];

    // r(row, col) of the scale-free rotation matrix.
    let r = |row: usize, col: usize| {
        let s = scale[col];
        if s == 0.0 {
            0.0
        } else {
            m[col * 4 + row] / s
        }
    };

    let trace = r(0, 0) + r(1, 1) + r(2, 2);
    let q = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        [
            (r(2, 1) - r(1, 2)) / s,
            (r(0, 2) - r(2, 0)) / s,
            (r(1, 0) - r(0, 1)) / s,
            0.25 * s,
        ]
    } else if r(0, 0) > r(1, 1) && r(0, 0) > r(2, 2) {
        let s = (1.0 + r(0, 0) - r(1, 1) - r(2, 2)).sqrt() * 2.0;
        [
            0.25 * s,
            (r(0, 1) + r(1, 0)) / s,
            (r(0, 2) + r(2, 0)) / s,
            (r(2, 1) - r(1, 2)) / s,
        ]
    } else if r(1, 1) > r(2, 2) {
        let s = (1.0 + r(1, 1) - r(0, 0) - r(2, 2)).sqrt() * 2.0;
        [
            (r(0, 1) + r(1, 0)) / s,
            0.25 * s,
            (r(1, 2) + r(2, 1)) / s,
            (r(0, 2) - r(2, 0)) / s,
        ]
    } else {
        let s = (1.0 + r(2, 2) - r(0, 0) - r(1, 1)).sqrt() * 2.0;
        [
            (r(0, 2) + r(2, 0)) / s,
            (r(1, 2) + r(2, 1)) / s,
            0.25 * s,
            (r(1, 0) - r(0, 1)) / s,
        ]
    };

    (pos, normalize_quat(q), scale)
}

/// Build a column-major 4x4 matrix from translation, rotation (x,y,z,w) and scale.
pub fn compose_trs(pos: [f32; 3], rot: [f32; 4], scale: [f32; 3]) -> [f32; 16] {
    let [x, y, z, w] = normalize_quat(rot);
    let rows = [
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - z * w),
            2.0 * (x * z + y * w),
        ],
        [
            2.0 * (x * y + z * w),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - x * w),
        ],
        [
            2.0 * (x * z - y * w),
            2.0 * (y * z + x * w),
            1.0 - 2.0 * (x * x + y * y),
        ],
    ];

    let mut m = [0.0f32; 16];
    for col in 0..3 {
        for row in 0..3 {
            m[col * 4 + row] = rows[row][col] * scale[col];
        }
    }
    m[12] = pos[0];
    m[13] = pos[1];
    m[14] = pos[2];
    m[15] = 1.0;
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f32], b: &[f32]) {
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-5, "left={a:?} right={b:?}");
        }
    }

    #[test]
    fn identity_decomposes_to_identity() {
        let mut m = [0.0f32; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        let (p, r, s) = decompose_trs(&m);
        close(&p, &[0.0; 3]);
        close(&r, &[0.0, 0.0, 0.0, 1.0]);
        close(&s, &[1.0; 3]);
    }

    #[test]
    fn y_quarter_turn() {
        // columns: x -> (0,0,-1), y -> (0,1,0), z -> (1,0,0)
        let m = [
            0.0, 0.0, -1.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, //
            5.0, 6.0, 7.0, 1.0,
        ];
        let (p, r, s) = decompose_trs(&m);
        let h = std::f32::consts::FRAC_1_SQRT_2;
        close(&p, &[5.0, 6.0, 7.0]);
        close(&r, &[0.0, h, 0.0, h]);
        close(&s, &[1.0; 3]);
    }

    #[test]
    fn compose_then_decompose() {
        let h = std::f32::consts::FRAC_1_SQRT_2;
        let rots = [
            [0.0, 0.0, 0.0, 1.0],
            [h, 0.0, 0.0, h],
            [0.0, 0.0, h, h],
            [0.0, 1.0, 0.0, 0.0],
            [0.5, 0.5, 0.5, 0.5],
        ];
        for rot in rots {
            let m = compose_trs([1.0, -2.0, 3.0], rot, [2.0, 0.5, 1.5]);
            let (p, r, s) = decompose_trs(&m);
            close(&p, &[1.0, -2.0, 3.0]);
            close(&s, &[2.0, 0.5, 1.5]);
            // q and -q are the same rotation
            let dot: f32 = r.iter().zip(rot.iter()).map(|(a, b)| a * b).sum();
            assert!((dot.abs() - 1.0).abs() < 1e-5, "rot={rot:?} got={r:?}");
        }
    }
}
