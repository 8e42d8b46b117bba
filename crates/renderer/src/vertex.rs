//! Vertex types and layouts for rendering.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Mesh vertex with position, normal and UV coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Surface response of a lit instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Specular intensity, scaled by the light colour.
    pub specular: f32,
    /// Specular exponent.
    pub shininess: f32,
    /// Fraction of the base colour emitted regardless of lighting.
    pub emission: f32,
}

impl Material {
    /// Diffuse only.
    pub const MATTE: Self = Self {
        specular: 0.0,
        shininess: 1.0,
        emission: 0.0,
    };

    pub fn to_array(self) -> [f32; 4] {
        [self.specular, self.shininess, self.emission, 0.0]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::MATTE
    }
}

/// Per-instance data: model matrix, colour and material.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix, column-major
    pub model: [[f32; 4]; 4],
    /// Base colour; alpha drives blending in translucent passes
    pub color: [f32; 4],
    /// specular, shininess, emission, unused
    pub material: [f32; 4],
}

impl InstanceData {
    pub fn new(model: Mat4, color: [f32; 4], material: Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
            material: material.to_array(),
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        // Model columns at 3..6, colour at 7, material at 8.
        const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
            8 => Float32x4
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

impl Default for InstanceData {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, [1.0, 1.0, 1.0, 1.0], Material::MATTE)
    }
}

/// Vertex for the screen-space HUD.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OverlayVertex {
    /// NDC position (x, y) in -1..1
    pub position: [f32; 2],
    /// UV into font atlas (negative x = solid color quad)
    pub tex_coords: [f32; 2],
    /// RGBA color
    pub color: [f32; 4],
}

impl OverlayVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Builds HUD geometry in pixel coordinates (origin top-left).
/// Glyphs sample the font atlas; rectangles are solid colour.
pub struct OverlayTextBuilder {
    pub vertices: Vec<OverlayVertex>,
    pub indices: Vec<u32>,
    screen_w: f32,
    screen_h: f32,
}

/// Font atlas layout: 16 columns x 6 rows of 6x8 pixel glyphs, covering ASCII 32..127.
const FONT_COLS: f32 = 16.0;
const FONT_ROWS: f32 = 6.0;
pub const GLYPH_PX_W: f32 = 6.0;
pub const GLYPH_PX_H: f32 = 8.0;

/// UV sentinel for untextured quads.
const SOLID_UV: [f32; 2] = [-1.0, -1.0];

impl OverlayTextBuilder {
    pub fn new(screen_w: f32, screen_h: f32) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            screen_w: screen_w.max(1.0),
            screen_h: screen_h.max(1.0),
        }
    }

    /// Convert pixel coords to NDC.
    fn px_to_ndc(&self, px: f32, py: f32) -> [f32; 2] {
        [
            (px / self.screen_w) * 2.0 - 1.0,
            1.0 - (py / self.screen_h) * 2.0,
        ]
    }

    fn push_quad(&mut self, x: f32, y: f32, w: f32, h: f32, uv0: [f32; 2], uv1: [f32; 2], color: [f32; 4]) {
        let tl = self.px_to_ndc(x, y);
        let br = self.px_to_ndc(x + w, y + h);
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&[
            OverlayVertex { position: tl, tex_coords: uv0, color },
            OverlayVertex { position: [br[0], tl[1]], tex_coords: [uv1[0], uv0[1]], color },
            OverlayVertex { position: br, tex_coords: uv1, color },
            OverlayVertex { position: [tl[0], br[1]], tex_coords: [uv0[0], uv1[1]], color },
        ]);
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Add a solid-color rectangle. Coordinates in pixels.
    pub fn add_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        self.push_quad(x, y, w, h, SOLID_UV, SOLID_UV, color);
    }

    /// Horizontal and vertical bars of `size` pixels crossing at (cx, cy).
    pub fn add_crosshair(&mut self, cx: f32, cy: f32, size: f32, thickness: f32, color: [f32; 4]) {
        let half = size / 2.0;
        let half_t = thickness / 2.0;
        self.add_rect(cx - half, cy - half_t, size, thickness, color);
        self.add_rect(cx - half_t, cy - half, thickness, size, color);
    }

    /// Pixel width of `text` at `scale`.
    pub fn text_width(text: &str, scale: f32) -> f32 {
        text.chars().count() as f32 * GLYPH_PX_W * scale
    }

    /// Add a string at pixel position (x, y). `scale` = 1.0 draws 6x8 pixel glyphs.
    pub fn add_text(&mut self, x: f32, y: f32, text: &str, scale: f32, color: [f32; 4]) {
        let gw = GLYPH_PX_W * scale;
        let gh = GLYPH_PX_H * scale;
        let mut cx = x;
        for ch in text.chars() {
            let code = ch as u32;
            if (32..128).contains(&code) && ch != ' ' {
                let idx = code - 32;
                let col = (idx % 16) as f32;
                let row = (idx / 16) as f32;
                let uv0 = [col / FONT_COLS, row / FONT_ROWS];
                let uv1 = [(col + 1.0) / FONT_COLS, (row + 1.0) / FONT_ROWS];
                self.push_quad(cx, y, gw, gh, uv0, uv1, color);
            }
            cx += gw;
        }
    }

    /// Add text over a padded background. Returns the height used.
    pub fn add_text_with_bg(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        scale: f32,
        text_color: [f32; 4],
        bg_color: [f32; 4],
    ) -> f32 {
        let gh = GLYPH_PX_H * scale;
        let padding = 2.0 * scale;
        self.add_rect(x, y, Self::text_width(text, scale) + padding * 2.0, gh + padding * 2.0, bg_color);
        self.add_text(x + padding, y + padding, text, scale, text_color);
        gh + padding * 2.0
    }
}

const GLYPH_BITS: usize = 35;

/// Rasterize the 5x7 glyph table into an `R8Unorm` atlas of 6x8 cells.
/// Returns (pixels, width, height).
pub fn generate_font_atlas() -> (Vec<u8>, u32, u32) {
    let cell_w = GLYPH_PX_W as usize;
    let cell_h = GLYPH_PX_H as usize;
    let atlas_w = FONT_COLS as usize * cell_w;
    let atlas_h = FONT_ROWS as usize * cell_h;
    let mut pixels = vec![0u8; atlas_w * atlas_h];

    for (idx, &glyph) in FONT_5X7.iter().enumerate() {
        let cell_x = (idx % FONT_COLS as usize) * cell_w;
        let cell_y = (idx / FONT_COLS as usize) * cell_h;
        for bit in 0..GLYPH_BITS {
            if (glyph >> (GLYPH_BITS - 1 - bit)) & 1 == 1 {
                let (gx, gy) = (bit % 5, bit / 5);
                pixels[(cell_y + gy) * atlas_w + cell_x + gx] = 255;
            }
        }
    }

    (pixels, atlas_w as u32, atlas_h as u32)
}

/// Glyphs for ASCII 32..127. Each packs its 7 rows of 5 pixels row-major
/// into the low 35 bits, top-left pixel in bit 34.
#[rustfmt::skip]
const FONT_5X7: [u64; 96] = [
    0x000000000, 0x108421004, 0x294000000, 0x2BEA57D40, // 32..=35
    0x11F4717C4, 0x632222263, 0x22944564D, 0x108000000, // 36..=39
    0x088842082, 0x208210888, 0x12AEFBAA4, 0x0084F9080, // 40..=43
    0x000000088, 0x0000F8000, 0x000000004, 0x042222210, // 44..=47
    0x3A33AE62E, 0x11842108E, 0x3A213221F, 0x3A213062E, // 48..=51
    0x08CA97C42, 0x7E1E0862E, 0x1910F462E, 0x7C2222108, // 52..=55
    0x3A317462E, 0x3A317844C, 0x000400080, 0x000400088, // 56..=59
    0x088882082, 0x001F07C00, 0x208208888, 0x3A2111004, // 60..=63
    0x3A37ADE0E, 0x3A31FC631, 0x7A31F463E, 0x3A308422E, // 64..=67
    0x7A318C63E, 0x7E10F421F, 0x7E10F4210, 0x3A30BC62F, // 68..=71
    0x4631FC631, 0x38842108E, 0x1C4210A4C, 0x4654C5251, // 72..=75
    0x42108421F, 0x4775AC631, 0x47359C631, 0x3A318C62E, // 76..=79
    0x7A31F4210, 0x3A318D64D, 0x7A31F5251, 0x3A307062E, // 80..=83
    0x7C8421084, 0x46318C62E, 0x46318A944, 0x4631AD771, // 84..=87
    0x462A22A31, 0x462A21084, 0x7C222221F, 0x39084210E, // 88..=91
    0x420820821, 0x38421084E, 0x115100000, 0x00000001F, // 92..=95
    0x208000000, 0x000E0BE2F, 0x421E8C63E, 0x000E8C22E, // 96..=99
    0x042F8C62F, 0x000E8FE0E, 0x191E42108, 0x000F8BC2E, // 100..=103
    0x421E8C631, 0x100C2108E, 0x080610A4C, 0x4212A6292, // 104..=107
    0x30842108E, 0x001AAD6B1, 0x001E8C631, 0x000E8C62E, // 108..=111
    0x001E8FA10, 0x000F8BC21, 0x0016CC210, 0x000F8383E, // 112..=115
    0x211E42126, 0x00118C66D, 0x00118C544, 0x0011AD6AA, // 116..=119
    0x001151151, 0x00118BC2E, 0x001F1111F, 0x088441082, // 120..=123
    0x108421084, 0x208411088, 0x011510000, 0x7FFFFFFFF, // 124..=127
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_skips_spaces_but_advances() {
        let mut tb = OverlayTextBuilder::new(800.0, 600.0);
        tb.add_text(0.0, 0.0, "F: 1", 2.0, [1.0; 4]);
        assert_eq!(tb.vertices.len(), 3 * 4);
        assert_eq!(tb.indices.len(), 3 * 6);
        // Last glyph starts three cells in.
        let last = tb.vertices[8].position;
        assert!((last[0] - ((36.0 / 800.0) * 2.0 - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn crosshair_is_centered() {
        let mut tb = OverlayTextBuilder::new(800.0, 600.0);
        tb.add_crosshair(400.0, 300.0, 32.0, 3.0, [1.0; 4]);
        assert_eq!(tb.vertices.len(), 8);
        let horizontal = &tb.vertices[0..4];
        let min_x = horizontal.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
        let max_x = horizontal.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!((min_x + max_x).abs() < 1e-6);
        assert!(horizontal.iter().all(|v| v.tex_coords[0] < 0.0));
    }

    #[test]
    fn font_atlas_has_glyph_pixels() {
        let (pixels, w, h) = generate_font_atlas();
        assert_eq!((w, h), (96, 48));
        assert_eq!(pixels.len(), (w * h) as usize);
        // '0' occupies cell 16 (row 1, col 0) and has ink.
        let cell_has_ink = (8..15).any(|y| (0..5).any(|x| pixels[y * 96 + x] == 255));
        assert!(cell_has_ink);
        // ' ' is empty.
        assert!((0..7).all(|y| (0..5).all(|x| pixels[y * 96 + x] == 0)));
    }

    #[test]
    fn glyph_bits_unpack_row_major() {
        let (pixels, _, _) = generate_font_atlas();
        // '-' is cell 13: a single full bar on its fourth row.
        let x0 = 13 * 6;
        let ink = |y: usize| (x0..x0 + 5).filter(|&x| pixels[y * 96 + x] == 255).count();
        assert_eq!(ink(3), 5);
        assert_eq!(ink(2) + ink(4), 0);
    }
}
