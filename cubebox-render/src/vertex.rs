//! Vertex and quad data types for the batch renderer.
//!
//! [`Vertex`] derives `bytemuck::Pod` + `Zeroable` for zero-copy upload
//! to GPU buffers.

use bytemuck::{Pod, Zeroable};
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// Opaque white, the default tint.
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

// ───────────────────────────────────────────────────────────────────
// Vertex
// ───────────────────────────────────────────────────────────────────

/// A single batched vertex: clip-space position, texture coordinate,
/// and a tint multiplied with the sampled texel.
///
/// 32 bytes per vertex, six vertices per quad.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Clip-space position (already multiplied by the projection).
    pub position: [f32; 2],
    /// Texture coordinate in [0, 1].
    pub uv: [f32; 2],
    /// RGBA tint, each channel in [0.0, 1.0].
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 2], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self { position, uv, color }
    }

    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(0) = position
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x2,
            },
            // location(1) = uv
            VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: VertexFormat::Float32x2,
            },
            // location(2) = color
            VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: VertexFormat::Float32x4,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Quads
// ───────────────────────────────────────────────────────────────────

/// Normalized texture sub-rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: UvRect = UvRect { u0: 0.0, v0: 0.0, u1: 1.0, v1: 1.0 };

    /// UVs of the pixel rectangle `(x, y, w, h)` in a `tex_w × tex_h` texture.
    pub fn from_pixels(x: u32, y: u32, w: u32, h: u32, tex_w: u32, tex_h: u32) -> Self {
        let inv_w = 1.0 / tex_w.max(1) as f32;
        let inv_h = 1.0 / tex_h.max(1) as f32;
        Self {
            u0: x as f32 * inv_w,
            v0: y as f32 * inv_h,
            u1: (x + w) as f32 * inv_w,
            v1: (y + h) as f32 * inv_h,
        }
    }

    /// Texture coordinate for unit-square corner `i` (see [`Quad::corners`]).
    pub fn corner(&self, i: usize) -> [f32; 2] {
        match i {
            0 => [self.u0, self.v0],
            1 => [self.u1, self.v0],
            2 => [self.u0, self.v1],
            _ => [self.u1, self.v1],
        }
    }
}

/// A textured quad in window pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Corners in unit-square order: (0,0), (1,0), (0,1), (1,1).
    pub corners: [[f32; 2]; 4],
    pub uv: UvRect,
    pub color: [f32; 4],
}

impl Quad {
    /// Corner order of the two triangles. They share the 1–2 diagonal.
    pub const TRIANGLES: [usize; 6] = [0, 1, 2, 3, 1, 2];

    /// Axis-aligned quad from its top-left corner and size.
    pub fn axis_aligned(x: f32, y: f32, w: f32, h: f32, uv: UvRect, color: [f32; 4]) -> Self {
        Self {
            corners: [[x, y], [x + w, y], [x, y + h], [x + w, y + h]],
            uv,
            color,
        }
    }
}
