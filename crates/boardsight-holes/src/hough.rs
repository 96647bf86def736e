//! Gradient-voting circular Hough transform.
//!
//! Each edge pixel votes along its gradient direction (both signs) for
//! centers at every radius in the configured band. Accumulator cells over
//! the vote threshold become candidate centers, accepted greedily in
//! descending vote order with minimum-distance suppression; the radius is
//! the most common edge distance from the accepted center.

use image::GrayImage;
use nalgebra::Point2;

use crate::CircleParams;

/// A detected circle in rectified coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
    pub votes: u32,
}

struct EdgePoint {
    x: f32,
    y: f32,
    dx: f32, // unit gradient direction
    dy: f32,
}

/// 3×3 Sobel gradient; returns edge points at or above the magnitude
/// threshold.
fn edge_points(img: &GrayImage, threshold: f32) -> Vec<EdgePoint> {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let at = |x: i32, y: i32| -> i32 { img.get_pixel(x as u32, y as u32).0[0] as i32 };

    let mut out = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gx = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
            let gy = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));
            let mag = ((gx * gx + gy * gy) as f32).sqrt();
            if mag >= threshold {
                out.push(EdgePoint {
                    x: x as f32,
                    y: y as f32,
                    dx: gx as f32 / mag,
                    dy: gy as f32 / mag,
                });
            }
        }
    }
    out
}

fn vote_centers(edges: &[EdgePoint], w: usize, h: usize, params: &CircleParams) -> Vec<u32> {
    let mut acc = vec![0u32; w * h];
    for e in edges {
        for r in params.min_radius..=params.max_radius {
            let r = r as f32;
            for sign in [1.0f32, -1.0] {
                let cx = (e.x + sign * e.dx * r).round() as i64;
                let cy = (e.y + sign * e.dy * r).round() as i64;
                if cx >= 0 && cy >= 0 && (cx as usize) < w && (cy as usize) < h {
                    acc[cy as usize * w + cx as usize] += 1;
                }
            }
        }
    }
    acc
}

fn is_local_max(acc: &[u32], w: usize, h: usize, x: usize, y: usize) -> bool {
    let v = acc[y * w + x];
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                continue;
            }
            let n = acc[ny as usize * w + nx as usize];
            // Strictly greater than the trailing half of the neighborhood
            // breaks plateau ties deterministically.
            if n > v || (n == v && (dy < 0 || (dy == 0 && dx < 0))) {
                return false;
            }
        }
    }
    true
}

/// Most common rounded edge distance from `center` inside the radius band.
fn estimate_radius(edges: &[EdgePoint], center: Point2<f32>, params: &CircleParams) -> f32 {
    let band = (params.max_radius - params.min_radius + 1) as usize;
    let mut hist = vec![0u32; band];
    for e in edges {
        let d = ((e.x - center.x).powi(2) + (e.y - center.y).powi(2)).sqrt();
        let r = d.round() as i64;
        let lo = params.min_radius as i64;
        if r >= lo && r <= params.max_radius as i64 {
            hist[(r - lo) as usize] += 1;
        }
    }
    let best = hist
        .iter()
        .enumerate()
        .max_by_key(|(_, &count)| count)
        .map(|(i, _)| i)
        .unwrap_or(0);
    (params.min_radius as usize + best) as f32
}

/// Detect circles in a (pre-blurred) grayscale image.
pub fn detect_circles(blurred: &GrayImage, params: &CircleParams) -> Vec<Circle> {
    let params = params.normalized();
    let (w, h) = (blurred.width() as usize, blurred.height() as usize);
    if w < 3 || h < 3 {
        return Vec::new();
    }

    let edges = edge_points(blurred, params.edge_threshold);
    if edges.is_empty() {
        return Vec::new();
    }

    let acc = vote_centers(&edges, w, h, &params);

    let mut candidates: Vec<(u32, usize, usize)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = acc[y * w + x];
            if v >= params.accumulator_threshold && is_local_max(&acc, w, h, x, y) {
                candidates.push((v, x, y));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.2.cmp(&b.2)).then(a.1.cmp(&b.1)));

    let min_dist_sq = params.min_dist * params.min_dist;
    let mut accepted: Vec<Circle> = Vec::new();
    for (votes, x, y) in candidates {
        let center = Point2::new(x as f32, y as f32);
        let far_enough = accepted.iter().all(|c| {
            let dx = c.center.x - center.x;
            let dy = c.center.y - center.y;
            dx * dx + dy * dy >= min_dist_sq
        });
        if far_enough {
            let radius = estimate_radius(&edges, center, &params);
            accepted.push(Circle {
                center,
                radius,
                votes,
            });
        }
    }
    accepted
}
