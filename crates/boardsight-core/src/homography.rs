use crate::image::{sample_bilinear_rgb, sample_bilinear_u8, GrayImage, GrayImageView, RgbBuffer, RgbView};
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// A 3×3 projective transform between two planar coordinate spaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    /// Like [`apply`](Self::apply) but refuses non-finite output, which is
    /// what an ill-conditioned transform produces near its horizon line.
    #[inline]
    pub fn apply_checked(&self, p: Point2<f32>) -> Option<Point2<f32>> {
        let q = self.apply(p);
        (q.x.is_finite() && q.y.is_finite()).then_some(q)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };
    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn normalize_points4(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let mut cx = 0.0_f64;
    let mut cy = 0.0_f64;
    for p in pts {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= 4.0;
    cy /= 4.0;

    let mut mean_dist = 0.0_f64;
    for p in pts {
        let dx = p.x as f64 - cx;
        let dy = p.y as f64 - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= 4.0;

    let t = hartley_normalization(cx, cy, mean_dist);

    let mut out = [Point2::new(0.0_f64, 0.0_f64); 4];
    for (i, p) in pts.iter().enumerate() {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        out[i] = Point2::new(v[0], v[1]);
    }
    (out, t)
}

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return None;
    }
    Some(h / s)
}

fn denormalize_homography(
    hn: Matrix3<f64>,
    t_src: Matrix3<f64>,
    t_dst: Matrix3<f64>,
) -> Option<Matrix3<f64>> {
    let t_dst_inv = t_dst.try_inverse()?;
    Some(t_dst_inv * hn * t_src)
}

/// Compute H such that `dst ~ H * src` from 4 point correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None`
/// for degenerate (near-collinear) configurations, where the linear system
/// has no stable solution.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1.
    // For each correspondence (x,y)->(u,v):
    // h11 x + h12 y + h13 - u h31 x - u h32 y = u
    // h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let (src_n, t_src) = normalize_points4(src);
    let (dst_n, t_dst) = normalize_points4(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let x = src_n[k].x;
        let y = src_n[k].y;
        let u = dst_n[k].x;
        let v = dst_n[k].y;

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h_den = denormalize_homography(hn, t_src, t_dst)?;
    let h_den = normalize_homography(h_den)?;

    if h_den.iter().any(|v| !v.is_finite()) {
        return None;
    }

    // Re-projection sanity check: a near-collinear corner set lets the
    // linear solve "succeed" with an ill-conditioned matrix that cannot
    // actually reproduce the correspondences.
    let h = Homography::new(h_den);
    for (s, d) in src.iter().zip(dst.iter()) {
        let q = h.apply(*s);
        if !q.x.is_finite() || !q.y.is_finite() {
            return None;
        }
        if (q.x - d.x).hypot(q.y - d.y) > 1.0 {
            return None;
        }
    }

    Some(h)
}

/// Warp into a fixed-size view: for each destination pixel, map through
/// `h_src_from_dst` and sample the source bilinearly.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_src_from_dst: Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let mut out = GrayImage::new(out_w, out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let p = h_src_from_dst.apply(Point2::new(x as f32, y as f32));
            out.data[y * out_w + x] = sample_bilinear_u8(src, p.x, p.y);
        }
    }
    out
}

/// RGB variant of [`warp_perspective_gray`].
pub fn warp_perspective_rgb(
    src: &RgbView<'_>,
    h_src_from_dst: Homography,
    out_w: usize,
    out_h: usize,
) -> RgbBuffer {
    let mut out = RgbBuffer::new(out_w, out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let p = h_src_from_dst.apply(Point2::new(x as f32, y as f32));
            out.set_pixel(x, y, sample_bilinear_rgb(src, p.x, p.y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        assert!(
            dx < tol && dy < tol,
            "expected ({:.6},{:.6}) ~ ({:.6},{:.6}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    #[test]
    fn four_point_solve_recovers_known_transform() {
        let ground_truth = Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ));

        let rect = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(599.0_f32, 0.0),
            Point2::new(599.0_f32, 399.0),
            Point2::new(0.0_f32, 399.0),
        ];
        let dst = rect.map(|p| ground_truth.apply(p));

        let recovered = homography_from_4pt(&rect, &dst).expect("recoverable");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(300.0, 150.0),
            Point2::new(520.0, 380.0),
        ] {
            assert_close(recovered.apply(p), ground_truth.apply(p), 1e-3);
        }
    }

    #[test]
    fn inverse_round_trips_corners() {
        let src = [
            Point2::new(104.0_f32, 86.0),
            Point2::new(512.0_f32, 70.0),
            Point2::new(540.0_f32, 360.0),
            Point2::new(90.0_f32, 340.0),
        ];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(599.0_f32, 0.0),
            Point2::new(599.0_f32, 399.0),
            Point2::new(0.0_f32, 399.0),
        ];
        let h = homography_from_4pt(&src, &dst).expect("solve");
        let inv = h.inverse().expect("invertible");

        for (s, d) in src.iter().zip(dst.iter()) {
            assert_close(h.apply(*s), *d, 1e-2);
            assert_close(inv.apply(h.apply(*s)), *s, 1e-2);
        }
    }

    #[test]
    fn identity_gray_warp_copies_pixels() {
        let mut src = GrayImage::new(8, 8);
        src.set(3, 2, 200);
        let h = Homography::new(Matrix3::identity());
        let out = warp_perspective_gray(&src.view(), h, 8, 8);
        assert_eq!(out.get(3, 2), 200);
        assert_eq!(out.get(0, 0), 0);
    }

    #[test]
    fn collinear_corners_fail_to_solve() {
        let src = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0_f32, 10.0),
            Point2::new(20.0_f32, 20.0),
            Point2::new(30.0_f32, 30.0),
        ];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(599.0_f32, 0.0),
            Point2::new(599.0_f32, 399.0),
            Point2::new(0.0_f32, 399.0),
        ];
        assert!(homography_from_4pt(&src, &dst).is_none());
    }
}
