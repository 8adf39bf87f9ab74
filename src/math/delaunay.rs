//! Delaunay triangulation adjacency for Voronoi-neighbor selection.
//!
//! ## Purpose
//!
//! This module triangulates a set of reference coordinates with the
//! Bowyer-Watson algorithm and exposes, for every input point, the set of
//! points it shares a triangle edge with (its Delaunay / Voronoi neighbors).
//!
//! ## Design notes
//!
//! * **Normalized frame**: Coordinates are shifted to their bounding-box center
//!   and scaled by the larger extent before triangulating, so the predicates
//!   work on values of order one regardless of the projection's units.
//! * **Ghost triangles**: Every convex-hull edge is closed by a triangle with a
//!   symbolic vertex at infinity. Its "circumcircle" is the open half-plane
//!   outside the edge plus the open edge itself, so hull edges are never lost
//!   to a finite enclosing triangle.
//! * **Walking location**: Points are inserted in (x, y) order and each
//!   insertion locates its cavity by walking from the triangle created last,
//!   falling back to a linear scan if the walk fails.
//! * **Coincident points**: Points with identical coordinates are triangulated
//!   once. Every member of a coincident group is adjacent to the other members
//!   and inherits the group's adjacency.
//!
//! ## Invariants
//!
//! * Adjacency is symmetric and never contains the point itself.
//! * Every convex-hull edge is an adjacency.
//!
//! ## Non-goals
//!
//! * Constrained triangulations or exact arithmetic predicates.

use core::cmp::Ordering::Equal;
use std::collections::HashMap;

use num_traits::Float;

use crate::primitives::errors::FusionError;

const NONE: usize = usize::MAX;

/// Relative tolerance below which three points are treated as collinear.
const COLLINEAR_EPS: f64 = 1.0e-12;

#[derive(Debug, Clone)]
struct Triangle {
    /// Vertex indices in counter-clockwise order; may hold the ghost vertex.
    v: [usize; 3],
    /// Neighbor across the edge opposite each vertex.
    adj: [usize; 3],
    alive: bool,
}

/// Vertex adjacency of a Delaunay triangulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    adjacency: Vec<Vec<usize>>,
    triangle_count: usize,
}

impl Triangulation {
    // ------------------------------------------------------------------------
    // Public API
    // ------------------------------------------------------------------------

    /// Triangulate flattened `(x, y)` coordinates.
    ///
    /// Fails with [`FusionError::Geometry`] when fewer than three distinct
    /// points are given or all points are collinear.
    pub fn new<T: Float>(coords: &[T]) -> Result<Self, FusionError> {
        let n = coords.len() / 2;
        let pts: Vec<[f64; 2]> = (0..n)
            .map(|i| {
                [
                    coords[2 * i].to_f64().unwrap_or(f64::NAN),
                    coords[2 * i + 1].to_f64().unwrap_or(f64::NAN),
                ]
            })
            .collect();

        if pts.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
            return Err(FusionError::InvalidNumericValue(
                "non-finite coordinate in triangulation input".into(),
            ));
        }

        // Group coincident points; the first of each group represents it.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            pts[a][0]
                .partial_cmp(&pts[b][0])
                .unwrap_or(Equal)
                .then(pts[a][1].partial_cmp(&pts[b][1]).unwrap_or(Equal))
                .then(a.cmp(&b))
        });
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for &i in &order {
            let coincident = groups.last().is_some_and(|g| pts[g[0]] == pts[i]);
            if coincident {
                if let Some(g) = groups.last_mut() {
                    g.push(i);
                }
            } else {
                groups.push(vec![i]);
            }
        }

        if groups.len() < 3 {
            return Err(FusionError::Geometry(format!(
                "need at least 3 distinct points to triangulate, got {}",
                groups.len()
            )));
        }

        let reps: Vec<[f64; 2]> = groups.iter().map(|g| pts[g[0]]).collect();
        let Some(seed) = Self::seed_triangle(&reps) else {
            return Err(FusionError::Geometry(format!(
                "all {} distinct points are collinear",
                reps.len()
            )));
        };

        let (group_adjacency, triangle_count) = BowyerWatson::new(&reps, seed).run();

        let mut adjacency = vec![Vec::new(); n];
        for (g, members) in groups.iter().enumerate() {
            for &u in members {
                let list = &mut adjacency[u];
                list.extend(members.iter().copied().filter(|&m| m != u));
                for &h in &group_adjacency[g] {
                    list.extend_from_slice(&groups[h]);
                }
                list.sort_unstable();
                list.dedup();
            }
        }

        Ok(Self {
            adjacency,
            triangle_count,
        })
    }

    /// Delaunay neighbors of point `i`, sorted ascending.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        self.adjacency.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of input points.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns true if no points were supplied.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Number of finite triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Pick three well-spread points to start from, or `None` if all are collinear.
    ///
    /// The second point is the farthest from the first, the third the one
    /// farthest from the line through both.
    fn seed_triangle(pts: &[[f64; 2]]) -> Option<[usize; 3]> {
        let p0 = pts[0];
        let dist = |c: [f64; 2]| (c[0] - p0[0]).hypot(c[1] - p0[1]);
        let i1 = (1..pts.len())
            .max_by(|&a, &b| dist(pts[a]).partial_cmp(&dist(pts[b])).unwrap_or(Equal))?;
        let p1 = pts[i1];
        let base = dist(p1);

        let i2 = (1..pts.len())
            .filter(|&i| i != i1)
            .max_by(|&a, &b| {
                orient(p0, p1, pts[a])
                    .abs()
                    .partial_cmp(&orient(p0, p1, pts[b]).abs())
                    .unwrap_or(Equal)
            })?;

        let c = pts[i2];
        if orient(p0, p1, c).abs() <= COLLINEAR_EPS * base * base {
            return None;
        }
        Some([0, i1, i2])
    }
}

// ============================================================================
// Bowyer-Watson
// ============================================================================

struct BowyerWatson {
    /// Normalized points; index `pts.len()` is the ghost vertex.
    pts: Vec<[f64; 2]>,
    ghost: usize,
    seed: [usize; 3],
    tris: Vec<Triangle>,
    /// 0 = untouched, 1 = in cavity, 2 = checked and kept.
    mark: Vec<u8>,
    last: usize,
}

impl BowyerWatson {
    fn new(points: &[[f64; 2]], seed: [usize; 3]) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p[0]);
            min_y = min_y.min(p[1]);
            max_x = max_x.max(p[0]);
            max_y = max_y.max(p[1]);
        }
        let cx = 0.5 * (min_x + max_x);
        let cy = 0.5 * (min_y + max_y);
        let scale = (max_x - min_x).max(max_y - min_y);
        let scale = if scale > 0.0 { scale } else { 1.0 };

        let pts: Vec<[f64; 2]> = points
            .iter()
            .map(|p| [(p[0] - cx) / scale, (p[1] - cy) / scale])
            .collect();
        let ghost = pts.len();

        let mut bw = Self {
            pts,
            ghost,
            seed,
            tris: Vec::new(),
            mark: Vec::new(),
            last: 0,
        };
        bw.init_seed();
        bw
    }

    /// One finite counter-clockwise triangle closed by three ghost triangles.
    fn init_seed(&mut self) {
        let [a, b, c] = self.seed;
        let v = if orient(self.pts[a], self.pts[b], self.pts[c]) > 0.0 {
            [a, b, c]
        } else {
            [a, c, b]
        };

        // Ghost k sits across the edge opposite v[k] of the finite triangle.
        let g = self.ghost;
        for k in 0..3 {
            let (s, e) = (v[(k + 1) % 3], v[(k + 2) % 3]);
            self.tris.push(Triangle {
                v: [e, s, g],
                adj: [NONE; 3],
                alive: true,
            });
        }
        self.tris.push(Triangle {
            v,
            adj: [0, 1, 2],
            alive: true,
        });
        self.mark = vec![0; 4];
        self.last = 3;

        for t in 0..3 {
            self.tris[t].adj[2] = 3;
            for k in 0..2 {
                // Edge opposite slot k of ghost t contains the ghost vertex.
                let shared = self.tris[t].v[1 - k];
                self.tris[t].adj[k] = (0..3)
                    .find(|&u| u != t && self.tris[u].v[..2].contains(&shared))
                    .unwrap_or(NONE);
            }
        }
    }

    /// Insert every remaining point and collect adjacency plus the finite triangle count.
    fn run(mut self) -> (Vec<Vec<usize>>, usize) {
        for p in 0..self.ghost {
            if !self.seed.contains(&p) {
                self.insert(p);
            }
        }

        let n = self.ghost;
        let mut adjacency = vec![Vec::new(); n];
        let mut triangle_count = 0;
        for t in self.tris.iter().filter(|t| t.alive) {
            if t.v.iter().all(|&v| v < n) {
                triangle_count += 1;
            }
            for i in 0..3 {
                let a = t.v[i];
                let b = t.v[(i + 1) % 3];
                if a < n && b < n {
                    adjacency[a].push(b);
                    adjacency[b].push(a);
                }
            }
        }
        for list in &mut adjacency {
            list.sort_unstable();
            list.dedup();
        }
        (adjacency, triangle_count)
    }

    fn insert(&mut self, p: usize) {
        let start = self.locate(p);
        let point = self.pts[p];

        // Cavity: connected triangles whose circumcircle contains the point.
        let mut bad = Vec::new();
        let mut touched = vec![start];
        let mut stack = vec![start];
        self.mark[start] = 1;
        while let Some(t) = stack.pop() {
            bad.push(t);
            for k in 0..3 {
                let nb = self.tris[t].adj[k];
                if nb == NONE || self.mark[nb] != 0 {
                    continue;
                }
                touched.push(nb);
                if self.in_circumcircle(nb, point) {
                    self.mark[nb] = 1;
                    stack.push(nb);
                } else {
                    self.mark[nb] = 2;
                }
            }
        }

        // Boundary edges of the cavity, each fanned to the new point. An edge
        // ending in the ghost vertex yields a new ghost triangle.
        let mut by_start: HashMap<usize, usize> = HashMap::new();
        let mut by_end: HashMap<usize, usize> = HashMap::new();
        let mut created = Vec::new();
        for &t in &bad {
            for k in 0..3 {
                let nb = self.tris[t].adj[k];
                if nb != NONE && self.mark[nb] == 1 {
                    continue;
                }
                let a = self.tris[t].v[(k + 1) % 3];
                let b = self.tris[t].v[(k + 2) % 3];
                let id = self.tris.len();
                self.tris.push(Triangle {
                    v: [p, a, b],
                    adj: [nb, NONE, NONE],
                    alive: true,
                });
                self.mark.push(0);
                if nb != NONE {
                    for slot in self.tris[nb].adj.iter_mut() {
                        if *slot == t {
                            *slot = id;
                        }
                    }
                }
                by_start.insert(a, id);
                by_end.insert(b, id);
                created.push(id);
            }
        }

        for &id in &created {
            let [_, a, b] = self.tris[id].v;
            // Edge (b, p) is shared with the fan triangle starting at b,
            // edge (p, a) with the one ending at a.
            self.tris[id].adj[1] = by_start.get(&b).copied().unwrap_or(NONE);
            self.tris[id].adj[2] = by_end.get(&a).copied().unwrap_or(NONE);
        }

        for &t in &bad {
            self.tris[t].alive = false;
        }
        for t in touched {
            self.mark[t] = 0;
        }
        if let Some(&id) = created.iter().find(|&&id| !self.is_ghost(id)) {
            self.last = id;
        }
    }

    /// Walk toward the triangle containing point `p`.
    ///
    /// Returns a ghost triangle when `p` lies outside the current hull.
    fn locate(&self, p: usize) -> usize {
        let point = self.pts[p];
        let mut t = self.last;
        let max_steps = self.tris.len() + 3;

        'walk: for step in 0..max_steps {
            let tri = &self.tris[t];
            if !tri.alive || self.is_ghost(t) {
                break;
            }
            for j in 0..3 {
                let k = (j + step) % 3;
                let a = self.pts[tri.v[(k + 1) % 3]];
                let b = self.pts[tri.v[(k + 2) % 3]];
                if orient(a, b, point) < 0.0 {
                    let next = tri.adj[k];
                    if next == NONE {
                        break 'walk;
                    }
                    if self.is_ghost(next) {
                        return next;
                    }
                    t = next;
                    continue 'walk;
                }
            }
            return t;
        }

        self.locate_linear(point)
    }

    fn locate_linear(&self, point: [f64; 2]) -> usize {
        self.tris
            .iter()
            .enumerate()
            .filter(|(_, t)| t.alive)
            .find(|(i, _)| self.in_circumcircle(*i, point))
            .map(|(i, _)| i)
            .unwrap_or(self.last)
    }

    #[inline]
    fn is_ghost(&self, t: usize) -> bool {
        self.tris[t].v.contains(&self.ghost)
    }

    fn in_circumcircle(&self, t: usize, d: [f64; 2]) -> bool {
        let v = self.tris[t].v;
        match v.iter().position(|&x| x == self.ghost) {
            Some(i) => {
                // Finite edge (a, b) has the outside of the hull on its left.
                let a = self.pts[v[(i + 1) % 3]];
                let b = self.pts[v[(i + 2) % 3]];
                let o = orient(a, b, d);
                o > 0.0 || (o == 0.0 && strictly_between(a, b, d))
            }
            None => {
                let [a, b, c] = v.map(|x| self.pts[x]);
                incircle(a, b, c, d) > 0.0
            }
        }
    }
}

/// True when collinear point `d` lies strictly inside segment (a, b).
#[inline]
fn strictly_between(a: [f64; 2], b: [f64; 2], d: [f64; 2]) -> bool {
    let t = (d[0] - a[0]) * (b[0] - a[0]) + (d[1] - a[1]) * (b[1] - a[1]);
    let len2 = (b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2);
    t > 0.0 && t < len2
}

/// Twice the signed area of triangle (a, b, c); positive when counter-clockwise.
#[inline]
fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Positive when `d` lies strictly inside the circumcircle of CCW triangle (a, b, c).
#[inline]
fn incircle(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> f64 {
    let (adx, ady) = (a[0] - d[0], a[1] - d[1]);
    let (bdx, bdy) = (b[0] - d[0], b[1] - d[1]);
    let (cdx, cdy) = (c[0] - d[0], c[1] - d[1]);
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;
    ad * (bdx * cdy - cdx * bdy) - bd * (adx * cdy - cdx * ady) + cd * (adx * bdy - bdx * ady)
}
