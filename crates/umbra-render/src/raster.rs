//! CPU reference rasterizer with color, depth and stencil planes.
//!
//! Fragments go through the fixed-function order of a GL pipeline: stencil
//! test, depth test, then depth write and blended color write. Pixels are
//! sampled at their centers with a top-left fill rule, so two triangles that
//! share an edge never both cover a pixel on it. Stencil counting relies on
//! that: a pixel touched twice by one closed surface would be counted twice.

use glam::{DVec2, Mat4, Vec3, Vec4};
use umbra_mesh::TriangleMesh;

use crate::backend::{ClearTargets, MeshUploader, RenderBackend};
use crate::camera::Camera;
use crate::scene::{MeshHandle, SceneObject};
use crate::state::{Face, PipelineState};

/// Depth the depth plane is cleared to.
pub const CLEAR_DEPTH: f32 = 1.0;

pub struct SoftwareRasterizer {
    width: u32,
    height: u32,
    color: Vec<[f32; 4]>,
    depth: Vec<f32>,
    stencil: Vec<u8>,
    clear_color: [f32; 4],
    clear_stencil: u8,
    meshes: Vec<TriangleMesh>,
}

#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    position: DVec2,
    depth: f64,
}

impl SoftwareRasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            color: vec![[0.0, 0.0, 0.0, 1.0]; pixels],
            depth: vec![CLEAR_DEPTH; pixels],
            stencil: vec![0; pixels],
            clear_color: [0.0, 0.0, 0.0, 1.0],
            clear_stencil: 0,
            meshes: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocates all planes. Contents are reset to their clear values.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        let pixels = (width as usize) * (height as usize);
        self.width = width;
        self.height = height;
        self.color = vec![self.clear_color; pixels];
        self.depth = vec![CLEAR_DEPTH; pixels];
        self.stencil = vec![self.clear_stencil; pixels];
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    pub fn color_at(&self, x: u32, y: u32) -> [f32; 4] {
        self.color[self.index(x, y)]
    }

    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    pub fn stencil_at(&self, x: u32, y: u32) -> u8 {
        self.stencil[self.index(x, y)]
    }

    /// Row-major stencil values, top row first.
    pub fn stencil_plane(&self) -> &[u8] {
        &self.stencil
    }

    /// Row-major RGBA values, top row first.
    pub fn color_plane(&self) -> &[[f32; 4]] {
        &self.color
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    fn to_screen(&self, clip: Vec4) -> ScreenVertex {
        let ndc = clip.truncate() / clip.w;
        ScreenVertex {
            position: DVec2::new(
                (f64::from(ndc.x) * 0.5 + 0.5) * f64::from(self.width),
                (0.5 - f64::from(ndc.y) * 0.5) * f64::from(self.height),
            ),
            depth: f64::from(ndc.z),
        }
    }

    fn draw_triangle(&mut self, mvp: &Mat4, triangle: [Vec3; 3], color: [f32; 4], state: &PipelineState) {
        let clip = triangle.map(|p| *mvp * p.extend(1.0));
        let polygon = clip_polygon(&clip, |v| v.z);
        let polygon = clip_polygon(&polygon, |v| v.w - v.z);
        if polygon.len() < 3 {
            return;
        }

        // Counter-clockwise in normalized device coordinates faces the viewer.
        let ndc: Vec<DVec2> = polygon
            .iter()
            .map(|v| DVec2::new(f64::from(v.x / v.w), f64::from(v.y / v.w)))
            .collect();
        let area: f64 = (0..ndc.len())
            .map(|i| ndc[i].perp_dot(ndc[(i + 1) % ndc.len()]))
            .sum();
        if area == 0.0 {
            return;
        }
        let face = if area > 0.0 { Face::Front } else { Face::Back };
        if state.culled_face() == Some(face) {
            return;
        }

        let screen: Vec<ScreenVertex> = polygon.iter().map(|&v| self.to_screen(v)).collect();
        for i in 1..screen.len() - 1 {
            self.fill_triangle([screen[0], screen[i], screen[i + 1]], face, color, state);
        }
    }

    fn fill_triangle(
        &mut self,
        vertices: [ScreenVertex; 3],
        face: Face,
        color: [f32; 4],
        state: &PipelineState,
    ) {
        let [v0, mut v1, mut v2] = vertices;
        let mut area = edge(v0.position, v1.position, v2.position);
        if area == 0.0 {
            return;
        }
        if area < 0.0 {
            std::mem::swap(&mut v1, &mut v2);
            area = -area;
        }

        let min = v0.position.min(v1.position).min(v2.position);
        let max = v0.position.max(v1.position).max(v2.position);
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = max.x.ceil().min(f64::from(self.width)) as u32;
        let y1 = max.y.ceil().min(f64::from(self.height)) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let p = DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let w0 = edge(v1.position, v2.position, p);
                let w1 = edge(v2.position, v0.position, p);
                let w2 = edge(v0.position, v1.position, p);
                if !covers(w0, v1.position, v2.position)
                    || !covers(w1, v2.position, v0.position)
                    || !covers(w2, v0.position, v1.position)
                {
                    continue;
                }
                let depth = (w0 * v0.depth + w1 * v1.depth + w2 * v2.depth) / area;
                let index = self.index(x, y);
                self.shade_fragment(index, depth as f32, face, color, state);
            }
        }
    }

    fn shade_fragment(
        &mut self,
        index: usize,
        depth: f32,
        face: Face,
        color: [f32; 4],
        state: &PipelineState,
    ) {
        let stencil_test = state.stencil_test();
        let func = state.stencil_func();
        let ops = state.stencil_ops(face);

        if stencil_test {
            let stored = self.stencil[index];
            if !func.passes(stored) {
                self.stencil[index] = ops.fail.apply(stored, func.reference);
                return;
            }
        }

        if !state.depth_func().passes(depth, self.depth[index]) {
            if stencil_test {
                self.stencil[index] = ops.depth_fail.apply(self.stencil[index], func.reference);
            }
            return;
        }

        if stencil_test {
            self.stencil[index] = ops.pass.apply(self.stencil[index], func.reference);
        }
        if state.depth_write() {
            self.depth[index] = depth;
        }

        let stored = self.color[index];
        let blended = if state.blend_enabled() {
            let blend = state.blend_func();
            let src = blend.src.weight(color[3]);
            let dst = blend.dst.weight(color[3]);
            std::array::from_fn(|c| color[c] * src + stored[c] * dst)
        } else {
            color
        };
        for (c, write) in state.color_mask().as_array().into_iter().enumerate() {
            if write {
                self.color[index][c] = blended[c];
            }
        }
    }
}

impl RenderBackend for SoftwareRasterizer {
    fn set_clear_stencil(&mut self, value: u8) {
        self.clear_stencil = value;
    }

    fn clear(&mut self, targets: ClearTargets) {
        if targets.color {
            self.color.fill(self.clear_color);
        }
        if targets.depth {
            self.depth.fill(CLEAR_DEPTH);
        }
        if targets.stencil {
            self.stencil.fill(self.clear_stencil);
        }
    }

    fn draw(&mut self, object: &SceneObject, camera: &Camera, state: &PipelineState) {
        let Some(mesh) = self.meshes.get(object.mesh.0 as usize) else {
            log::warn!("draw skipped: unknown mesh {:?}", object.mesh);
            return;
        };
        let mvp = camera.view_projection_matrix() * object.transform.matrix();
        let triangles: Vec<[Vec3; 3]> = mesh.triangles().collect();
        for triangle in triangles {
            self.draw_triangle(&mvp, triangle, object.color, state);
        }
    }
}

impl MeshUploader for SoftwareRasterizer {
    fn upload_mesh(&mut self, label: &str, mesh: &TriangleMesh) -> MeshHandle {
        log::debug!("software mesh '{label}': {} triangles", mesh.triangle_count());
        self.meshes.push(mesh.clone());
        MeshHandle(self.meshes.len() as u32 - 1)
    }
}

/// Sutherland-Hodgman clip against the half-space `distance >= 0`.
///
/// Intersections are always interpolated from the inside vertex, so a
/// shared edge clipped by two neighbours yields the same point in both.
fn clip_polygon(polygon: &[Vec4], distance: impl Fn(Vec4) -> f32) -> Vec<Vec4> {
    let mut out = Vec::with_capacity(polygon.len() + 2);
    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let (d_current, d_next) = (distance(current), distance(next));
        if d_current >= 0.0 {
            out.push(current);
        }
        if (d_current >= 0.0) != (d_next >= 0.0) {
            let (inside, outside, d_in, d_out) = if d_current >= 0.0 {
                (current, next, d_current, d_next)
            } else {
                (next, current, d_next, d_current)
            };
            let t = d_in / (d_in - d_out);
            out.push(inside + (outside - inside) * t);
        }
    }
    out
}

/// Signed edge function, evaluated from the lexicographically smaller
/// endpoint so that `edge(b, a, p) == -edge(a, b, p)` holds exactly.
fn edge(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    if (a.x, a.y) <= (b.x, b.y) {
        (b - a).perp_dot(p - a)
    } else {
        -(a - b).perp_dot(p - b)
    }
}

/// Inside test for one edge; pixels exactly on it belong to top and left edges only.
fn covers(weight: f64, a: DVec2, b: DVec2) -> bool {
    if weight != 0.0 {
        return weight > 0.0;
    }
    let d = b - a;
    d.y < 0.0 || (d.y == 0.0 && d.x > 0.0)
}
