// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CPU-memory implementations of the per-API resource objects.

use ardent_core::error::ResourceError;
use ardent_core::event::WindowId;
use ardent_core::graphics::{
    ArenaBackend, FramebufferBackend, GraphicInstanceBackend, TextureBackend, TextureFormat, WindowBackend,
};
use ardent_core::math::Color;

fn range_check(offset: u64, size: u64, capacity: u64) -> Result<std::ops::Range<usize>, ResourceError> {
    match offset.checked_add(size) {
        Some(end) if end <= capacity => Ok(offset as usize..end as usize),
        _ => Err(ResourceError::OutOfBounds {
            offset,
            size,
            capacity,
        }),
    }
}

/// A linear block of host memory standing in for device memory.
#[derive(Debug, Clone)]
pub struct SoftwareArena {
    data: Vec<u8>,
}

impl SoftwareArena {
    /// Allocates `size` zeroed bytes.
    pub fn new(size: u64) -> Self {
        Self {
            data: vec![0; size as usize],
        }
    }

    /// The whole contents.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl ArenaBackend for SoftwareArena {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn update(&mut self, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let range = range_check(offset, data.len() as u64, self.size())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    fn read(&self, offset: u64, size: u64) -> Result<Vec<u8>, ResourceError> {
        let range = range_check(offset, size, self.size())?;
        Ok(self.data[range].to_vec())
    }

    fn resize(&mut self, size: u64) -> Result<(), ResourceError> {
        self.data.resize(size as usize, 0);
        Ok(())
    }

    fn on_destroy(&mut self) {
        self.data = Vec::new();
    }
}

/// Encodes one pixel of `color` in `format`.
pub(crate) fn encode_color(color: Color, format: TextureFormat) -> Vec<u8> {
    match format {
        TextureFormat::Rgba8 => color.to_rgba8().to_vec(),
        TextureFormat::Bgra8 => {
            let [r, g, b, a] = color.to_rgba8();
            vec![b, g, r, a]
        }
        TextureFormat::R8 => vec![color.to_rgba8()[0]],
        TextureFormat::Rgba16F => [color.r, color.g, color.b, color.a]
            .iter()
            .flat_map(|c| f32_to_f16_bits(*c).to_le_bytes())
            .collect(),
        TextureFormat::Rgba32F => bytemuck::bytes_of(&color).to_vec(),
        TextureFormat::Depth24Stencil8 | TextureFormat::Depth32F => encode_depth(color.r, format),
    }
}

/// Encodes one depth value in `format`. Stencil is cleared to zero.
pub(crate) fn encode_depth(depth: f32, format: TextureFormat) -> Vec<u8> {
    let depth = depth.clamp(0.0, 1.0);
    match format {
        TextureFormat::Depth24Stencil8 => (((depth * 16_777_215.0) as u32) & 0x00FF_FFFF).to_le_bytes().to_vec(),
        _ => depth.to_le_bytes().to_vec(),
    }
}

// Round-toward-zero conversion; subnormals flush to zero.
fn f32_to_f16_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exponent = ((bits >> 23) & 0xFF) as i32 - 127 + 15;
    let mantissa = ((bits >> 13) & 0x03FF) as u16;
    if value.is_nan() {
        sign | 0x7E00
    } else if exponent >= 0x1F {
        sign | 0x7C00
    } else if exponent <= 0 {
        sign
    } else {
        sign | ((exponent as u16) << 10) | mantissa
    }
}

/// Pixel storage of a texture.
#[derive(Debug, Clone)]
pub struct SoftwareTexture {
    size: (u32, u32),
    format: TextureFormat,
    data: Vec<u8>,
}

impl SoftwareTexture {
    /// Allocates zeroed pixels.
    pub fn new(size: (u32, u32), format: TextureFormat) -> Self {
        Self {
            size,
            format,
            data: vec![0; Self::byte_len(size, format)],
        }
    }

    fn byte_len(size: (u32, u32), format: TextureFormat) -> usize {
        size.0 as usize * size.1 as usize * format.bytes_per_pixel() as usize
    }

    /// The pixel format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// The raw pixel bytes, row major.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// The bytes of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.size.0 || y >= self.size.1 {
            return None;
        }
        let bpp = self.format.bytes_per_pixel() as usize;
        let start = (y as usize * self.size.0 as usize + x as usize) * bpp;
        self.data.get(start..start + bpp)
    }

    /// Sets every pixel to `pixel`, which must be one encoded pixel.
    pub fn fill(&mut self, pixel: &[u8]) {
        if pixel.is_empty() {
            return;
        }
        for chunk in self.data.chunks_exact_mut(pixel.len()) {
            chunk.copy_from_slice(pixel);
        }
    }
}

impl TextureBackend for SoftwareTexture {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ResourceError> {
        if data.len() != self.data.len() {
            return Err(ResourceError::OutOfBounds {
                offset: 0,
                size: data.len() as u64,
                capacity: self.data.len() as u64,
            });
        }
        self.data.copy_from_slice(data);
        Ok(())
    }

    fn read(&self) -> Result<Vec<u8>, ResourceError> {
        Ok(self.data.clone())
    }

    fn resize(&mut self, size: (u32, u32)) -> Result<(), ResourceError> {
        self.size = size;
        self.data = vec![0; Self::byte_len(size, self.format)];
        Ok(())
    }

    fn on_destroy(&mut self) {
        self.data = Vec::new();
    }
}

/// The per-API object of a framebuffer. Attachment storage lives in the textures.
#[derive(Debug, Clone)]
pub struct SoftwareFramebuffer {
    label: String,
    size: (u32, u32),
    resizes: u32,
}

impl SoftwareFramebuffer {
    /// Creates the object.
    pub fn new(label: impl Into<String>, size: (u32, u32)) -> Self {
        Self {
            label: label.into(),
            size,
            resizes: 0,
        }
    }

    /// The label the framebuffer was created with.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Size after the last resize.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// How many times the framebuffer was resized.
    pub fn resizes(&self) -> u32 {
        self.resizes
    }
}

impl FramebufferBackend for SoftwareFramebuffer {
    fn resize(&mut self, size: (u32, u32)) -> Result<(), ResourceError> {
        self.size = size;
        self.resizes += 1;
        Ok(())
    }
}

/// An RGBA8 presentation surface with a back and a front buffer.
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    window: WindowId,
    size: (u32, u32),
    back: Vec<u8>,
    front: Vec<u8>,
    presents: u64,
}

impl SoftwareSurface {
    /// Allocates a black surface.
    pub fn new(window: WindowId, size: (u32, u32)) -> Self {
        let len = size.0 as usize * size.1 as usize * 4;
        Self {
            window,
            size,
            back: vec![0; len],
            front: vec![0; len],
            presents: 0,
        }
    }

    /// The window this surface presents to.
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// The buffer being drawn into.
    pub fn back_buffer(&self) -> &[u8] {
        &self.back
    }

    /// Replaces the back buffer with `pixels` of `size`, scaling nearest-neighbour.
    pub fn draw(&mut self, pixels: &[u8], size: (u32, u32)) {
        blit_rgba8(pixels, size, &mut self.back, self.size);
    }

    /// The last presented image.
    pub fn front_buffer(&self) -> &[u8] {
        &self.front
    }

    /// Swaps the back buffer onto the front.
    pub fn present(&mut self) {
        self.front.clone_from(&self.back);
        self.presents += 1;
    }

    /// How many times the surface was presented.
    pub fn presents(&self) -> u64 {
        self.presents
    }
}

impl WindowBackend for SoftwareSurface {
    fn resize(&mut self, size: (u32, u32)) -> Result<(), ResourceError> {
        let len = size.0 as usize * size.1 as usize * 4;
        self.size = size;
        self.back = vec![0; len];
        self.front = vec![0; len];
        Ok(())
    }

    fn on_destroy(&mut self) {
        self.back = Vec::new();
        self.front = Vec::new();
    }
}

/// Nearest-neighbour copy between two RGBA8 images.
pub(crate) fn blit_rgba8(src: &[u8], src_size: (u32, u32), dst: &mut [u8], dst_size: (u32, u32)) {
    let (sw, sh) = (src_size.0 as usize, src_size.1 as usize);
    let (dw, dh) = (dst_size.0 as usize, dst_size.1 as usize);
    if sw == 0 || sh == 0 || src.len() < sw * sh * 4 || dst.len() < dw * dh * 4 {
        return;
    }
    for y in 0..dh {
        let sy = y * sh / dh;
        for x in 0..dw {
            let sx = x * sw / dw;
            let s = (sy * sw + sx) * 4;
            let d = (y * dw + x) * 4;
            dst[d..d + 4].copy_from_slice(&src[s..s + 4]);
        }
    }
}

/// Per-instance state of the software backend. Setup completes on the first render.
#[derive(Debug, Clone, Default)]
pub struct SoftwareGraphicInstance {
    frames: u64,
    destroyed: bool,
}

impl SoftwareGraphicInstance {
    /// Number of `on_render` calls so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Whether `on_destroy` ran.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl GraphicInstanceBackend for SoftwareGraphicInstance {
    fn on_render(&mut self) {
        self.frames += 1;
    }

    fn is_setup_done(&self) -> bool {
        self.frames > 0
    }

    fn on_destroy(&mut self) {
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_rejects_out_of_range_access() {
        let mut arena = SoftwareArena::new(8);
        assert!(arena.update(4, &[1, 2, 3, 4]).is_ok());
        assert!(arena.update(5, &[1, 2, 3, 4]).is_err());
        assert_eq!(arena.read(4, 4).unwrap(), vec![1, 2, 3, 4]);
        arena.resize(4).unwrap();
        assert!(arena.read(4, 1).is_err());
    }

    #[test]
    fn texture_fill_and_pixel_lookup() {
        let mut texture = SoftwareTexture::new((2, 2), TextureFormat::Rgba8);
        texture.fill(&encode_color(Color::new(1.0, 0.0, 0.0, 1.0), TextureFormat::Rgba8));
        assert_eq!(texture.pixel(1, 1), Some(&[255, 0, 0, 255][..]));
        assert_eq!(texture.pixel(2, 0), None);
    }

    #[test]
    fn color_encodings() {
        assert_eq!(encode_color(Color::WHITE, TextureFormat::Bgra8), vec![255, 255, 255, 255]);
        assert_eq!(encode_color(Color::WHITE, TextureFormat::R8), vec![255]);
        assert_eq!(encode_color(Color::WHITE, TextureFormat::Rgba16F).len(), 8);
        assert_eq!(f32_to_f16_bits(1.0), 0x3C00);
        assert_eq!(f32_to_f16_bits(-2.0), 0xC000);
        assert_eq!(encode_depth(1.0, TextureFormat::Depth32F), 1.0f32.to_le_bytes().to_vec());
    }

    #[test]
    fn blit_scales_nearest() {
        let src = [10, 10, 10, 255, 20, 20, 20, 255];
        let mut dst = vec![0; 4 * 4];
        blit_rgba8(&src, (2, 1), &mut dst, (4, 1));
        assert_eq!(&dst[..4], &[10, 10, 10, 255]);
        assert_eq!(&dst[4..8], &[10, 10, 10, 255]);
        assert_eq!(&dst[8..12], &[20, 20, 20, 255]);
    }

    #[test]
    fn surface_presents_back_buffer() {
        let mut surface = SoftwareSurface::new(WindowId(1), (1, 1));
        surface.draw(&[1, 2, 3, 4], (1, 1));
        assert_eq!(surface.front_buffer(), &[0, 0, 0, 0]);
        surface.present();
        assert_eq!(surface.front_buffer(), &[1, 2, 3, 4]);
        assert_eq!(surface.presents(), 1);
    }
}
