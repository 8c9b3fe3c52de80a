//! 2D transform math for quads: a small column-major 4×4 matrix plus
//! the position/rotation/scale composition used by images and sprites.

/// Column-major 4×4 matrix (`m[column][row]`), matching WGSL layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4(pub [[f32; 4]; 4]);

/// Unit-square corners in quad corner order.
pub const UNIT_CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Orthographic projection for a `width × height` pixel viewport.
    ///
    /// Maps (0,0) to the top-left of clip space (-1, 1) and
    /// (width, height) to the bottom-right (1, -1).
    pub fn orthographic(width: f32, height: f32) -> Self {
        let sx = 2.0 / width.max(1.0);
        let sy = -2.0 / height.max(1.0); // flip Y for top-left origin
        Mat4([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0, 1.0],
        ])
    }

    pub fn translation(x: f32, y: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.0[3][0] = x;
        m.0[3][1] = y;
        m
    }

    /// Rotation about the Z axis by `radians`.
    pub fn rotation_z(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        let mut m = Self::IDENTITY;
        m.0[0][0] = c;
        m.0[0][1] = s;
        m.0[1][0] = -s;
        m.0[1][1] = c;
        m
    }

    pub fn scale(x: f32, y: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.0[0][0] = x;
        m.0[1][1] = y;
        m
    }

    /// `self × rhs`: `rhs` is applied to a point first.
    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (col, out_col) in out.iter_mut().enumerate() {
            for (row, cell) in out_col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.0[k][row] * rhs.0[col][k]).sum();
            }
        }
        Mat4(out)
    }

    /// Transform the point `(x, y, 0, 1)` and return its x, y.
    pub fn transform_point(&self, p: [f32; 2]) -> [f32; 2] {
        let m = &self.0;
        [
            m[0][0] * p[0] + m[1][0] * p[1] + m[3][0],
            m[0][1] * p[0] + m[1][1] * p[1] + m[3][1],
        ]
    }
}

/// Model matrix for a `w × h` quad at `(x, y)` rotated by `rotation`
/// about the normalized origin `(ox, oy)`.
pub fn quad_transform(x: f32, y: f32, w: f32, h: f32, rotation: f32, ox: f32, oy: f32) -> Mat4 {
    Mat4::translation(x + ox * w, y + oy * h)
        .mul(&Mat4::rotation_z(rotation))
        .mul(&Mat4::translation(-ox * w, -oy * h))
        .mul(&Mat4::scale(w, h))
}

/// Pixel-space corners of a transformed quad, in unit-square order.
pub fn quad_corners(x: f32, y: f32, w: f32, h: f32, rotation: f32, ox: f32, oy: f32) -> [[f32; 2]; 4] {
    let model = quad_transform(x, y, w, h, rotation, ox, oy);
    UNIT_CORNERS.map(|c| model.transform_point(c))
}
