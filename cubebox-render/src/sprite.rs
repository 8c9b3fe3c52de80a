//! Images and animated sprites.
//!
//! An [`Image`] is a texture sub-rectangle placed on screen with a
//! position, size, rotation and rotation origin. It is a plain value and
//! can be copied into as many draws as needed.
//!
//! A [`Sprite`] slices a sprite sheet into equal frames and plays frame
//! sequences over time.

use crate::texture::Texture;
use crate::transform::quad_corners;
use crate::vertex::{Quad, UvRect, WHITE};

/// A positioned, rotatable view of (part of) a texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Image {
    pub texture: Texture,
    pub uv: UvRect,
    /// Top-left position in pixels.
    pub x: f32,
    pub y: f32,
    /// Size in pixels.
    pub w: f32,
    pub h: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Rotation origin, normalized to the image size (0.5 = centre).
    pub origin_x: f32,
    pub origin_y: f32,
    pub color: [f32; 4],
}

impl Image {
    /// The whole texture at its native size.
    pub fn new(texture: Texture) -> Self {
        Self::sub_image(texture, 0, 0, texture.width, texture.height)
    }

    /// The pixel rectangle `(x, y, w, h)` of `texture`.
    pub fn sub_image(texture: Texture, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            texture,
            uv: UvRect::from_pixels(x, y, w, h, texture.width, texture.height),
            x: 0.0,
            y: 0.0,
            w: w as f32,
            h: h as f32,
            rotation: 0.0,
            origin_x: 0.5,
            origin_y: 0.5,
            color: WHITE,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Pixel-space quad after position, rotation and scale.
    pub fn quad(&self) -> Quad {
        Quad {
            corners: quad_corners(
                self.x,
                self.y,
                self.w,
                self.h,
                self.rotation,
                self.origin_x,
                self.origin_y,
            ),
            uv: self.uv,
            color: self.color,
        }
    }
}

#[derive(Clone, Debug)]
struct Animation {
    sequence: Vec<u32>,
    frame_time: f32,
    elapsed: f32,
    index: usize,
    looped: bool,
}

/// Sprite sheet animation.
///
/// Position and transform live on [`Sprite::image_mut`]; the UVs are
/// rewritten whenever the frame changes.
#[derive(Clone, Debug)]
pub struct Sprite {
    image: Image,
    frame_width: u32,
    frame_height: u32,
    frame: u32,
    animation: Option<Animation>,
}

impl Sprite {
    /// Slice `texture` into `frame_width × frame_height` frames, showing frame 0.
    pub fn new(texture: Texture, frame_width: u32, frame_height: u32) -> Self {
        let frame_width = frame_width.max(1);
        let frame_height = frame_height.max(1);
        let mut sprite = Self {
            image: Image::sub_image(texture, 0, 0, frame_width, frame_height),
            frame_width,
            frame_height,
            frame: 0,
            animation: None,
        };
        sprite.set_frame(0);
        sprite
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut Image {
        &mut self.image
    }

    /// Current frame index into the sheet.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Frames per sheet row.
    pub fn columns(&self) -> u32 {
        (self.image.texture.width / self.frame_width).max(1)
    }

    /// Show frame `n`, counted row-major across the sheet.
    pub fn set_frame(&mut self, frame: u32) {
        let columns = self.columns();
        let col = frame % columns;
        let row = frame / columns;
        let tex = self.image.texture;
        self.image.uv = UvRect::from_pixels(
            col * self.frame_width,
            row * self.frame_height,
            self.frame_width,
            self.frame_height,
            tex.width,
            tex.height,
        );
        self.frame = frame;
    }

    pub fn is_playing(&self) -> bool {
        self.animation.is_some()
    }

    /// Play `sequence` at `fps` frames per second. Ignored while another
    /// animation is playing or when the sequence is empty.
    pub fn play(&mut self, sequence: &[u32], fps: u32, looped: bool) {
        if self.animation.is_some() || sequence.is_empty() {
            return;
        }
        self.animation = Some(Animation {
            sequence: sequence.to_vec(),
            frame_time: 1.0 / fps.max(1) as f32,
            elapsed: 0.0,
            index: 0,
            looped,
        });
    }

    /// Stop the animation, keeping the current frame on screen.
    pub fn stop(&mut self) {
        self.animation = None;
    }

    /// Advance the animation clock by `delta` seconds.
    ///
    /// At most one frame step happens per call. A non-looping animation
    /// stops once it wraps past its last frame.
    pub fn update(&mut self, delta: f32) {
        let Some(anim) = self.animation.as_mut() else {
            return;
        };
        anim.elapsed += delta;
        if anim.elapsed <= anim.frame_time {
            return;
        }
        anim.elapsed -= anim.frame_time;

        if anim.index + 1 < anim.sequence.len() {
            anim.index += 1;
        } else {
            anim.index = 0;
            if !anim.looped {
                self.animation = None;
                return;
            }
        }
        let next = anim.sequence[anim.index];
        self.set_frame(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{PixelFormat, TextureHandle};

    fn sheet() -> Texture {
        // 4 columns × 2 rows of 16×16 frames.
        Texture {
            handle: TextureHandle(7),
            width: 64,
            height: 32,
            format: PixelFormat::Rgba8,
        }
    }

    #[test]
    fn test_image_defaults() {
        let img = Image::new(sheet());
        assert_eq!(img.uv, UvRect::FULL);
        assert_eq!((img.w, img.h), (64.0, 32.0));
        assert_eq!((img.origin_x, img.origin_y), (0.5, 0.5));
        assert_eq!(img.rotation, 0.0);
    }

    #[test]
    fn test_sub_image_uv() {
        let img = Image::sub_image(sheet(), 16, 16, 16, 16);
        assert_eq!(img.uv, UvRect { u0: 0.25, v0: 0.5, u1: 0.5, v1: 1.0 });
        assert_eq!((img.w, img.h), (16.0, 16.0));
    }

    #[test]
    fn test_image_quad_position() {
        let q = Image::sub_image(sheet(), 0, 0, 16, 16).at(100.0, 50.0).quad();
        assert_eq!(q.corners[0], [100.0, 50.0]);
        assert_eq!(q.corners[3], [116.0, 66.0]);
    }

    #[test]
    fn test_set_frame_row_major() {
        let mut sprite = Sprite::new(sheet(), 16, 16);
        assert_eq!(sprite.columns(), 4);
        sprite.set_frame(5);
        assert_eq!(sprite.image().uv, UvRect { u0: 0.25, v0: 0.5, u1: 0.5, v1: 1.0 });
    }

    #[test]
    fn test_animation_steps_and_loops() {
        let mut sprite = Sprite::new(sheet(), 16, 16);
        sprite.play(&[2, 3], 10, true);
        assert!(sprite.is_playing());

        sprite.update(0.05);
        assert_eq!(sprite.frame(), 0, "not enough time elapsed");
        sprite.update(0.06);
        assert_eq!(sprite.frame(), 3);
        sprite.update(0.11);
        assert_eq!(sprite.frame(), 2, "wraps to the first frame");
        assert!(sprite.is_playing());
    }

    #[test]
    fn test_animation_once_stops() {
        let mut sprite = Sprite::new(sheet(), 16, 16);
        sprite.play(&[1, 2], 10, false);
        sprite.update(0.11);
        assert_eq!(sprite.frame(), 2);
        sprite.update(0.11);
        assert!(!sprite.is_playing());
        assert_eq!(sprite.frame(), 2, "last frame stays visible");
    }

    #[test]
    fn test_play_ignored_while_playing() {
        let mut sprite = Sprite::new(sheet(), 16, 16);
        sprite.play(&[1, 2], 10, true);
        sprite.play(&[6, 7], 10, true);
        sprite.update(0.11);
        assert_eq!(sprite.frame(), 2);

        sprite.stop();
        sprite.play(&[6, 7], 10, true);
        sprite.update(0.11);
        assert_eq!(sprite.frame(), 7);
    }
}
