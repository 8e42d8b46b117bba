//! GPU textures: depth-stencil target, floor pattern and font atlas.

use image::{Rgba, RgbaImage};
use wgpu::util::DeviceExt;

/// Side length of the floor pattern in texels.
pub const FLOOR_PATTERN_SIZE: u32 = 16;

/// Texel on the ring pattern.
const FLOOR_INK: Rgba<u8> = Rgba([0x1f, 0x1f, 0xcf, 0xff]);
/// Texel between rings.
const FLOOR_PAPER: Rgba<u8> = Rgba([0x1a, 0x1a, 0x3a, 0xff]);

#[rustfmt::skip]
const CIRCLES: [&str; FLOOR_PATTERN_SIZE as usize] = [
    "......xxxx......",
    "....xxxxxxxx....",
    "...xxx....xxx...",
    "..xxx......xxx..",
    ".xxxx......xxxx.",
    ".xxxx......xxxx.",
    ".xxxx......xxxx.",
    ".xxxx......xxxx.",
    "..xxx......xxx..",
    "...xxx....xxx...",
    "....xxxxxxxx....",
    "......xxxx......",
    "................",
    "................",
    "................",
    "................",
];

/// The 16x16 ring tile repeated across the floor.
pub fn floor_pattern() -> RgbaImage {
    RgbaImage::from_fn(FLOOR_PATTERN_SIZE, FLOOR_PATTERN_SIZE, |x, y| {
        match CIRCLES[y as usize].as_bytes().get(x as usize) {
            Some(b'x') => FLOOR_INK,
            _ => FLOOR_PAPER,
        }
    })
}

/// Render-target-only depth-stencil buffer; never sampled.
pub struct DepthStencil {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthStencil {
    /// Attachment sized to the surface.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&depth_stencil_descriptor(format, width, height, label));
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Descriptor for a depth-stencil attachment; zero sizes are bumped to 1.
pub fn depth_stencil_descriptor(
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    label: &str,
) -> wgpu::TextureDescriptor<'_> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }
}

/// Sampled texture with its default view and sampler.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {

    /// Upload an RGBA image with a repeating, linearly filtered sampler.
    pub fn from_image(device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage, label: &str) -> Self {
        let (width, height) = image.dimensions();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self { texture, view, sampler }
    }

    /// Single-channel font atlas sampled with nearest filtering.
    pub fn font_atlas(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let (pixels, width, height) = crate::vertex::generate_font_atlas();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("Font Atlas"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self { texture, view, sampler }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_pattern_rings() {
        let img = floor_pattern();
        assert_eq!(img.dimensions(), (16, 16));
        assert_eq!(*img.get_pixel(0, 0), FLOOR_PAPER);
        assert_eq!(*img.get_pixel(6, 0), FLOOR_INK);
        assert_eq!(*img.get_pixel(1, 4), FLOOR_INK);
        assert_eq!(*img.get_pixel(7, 7), FLOOR_PAPER);
        assert_eq!(*img.get_pixel(15, 15), FLOOR_PAPER);
        let ink = img.pixels().filter(|p| **p == FLOOR_INK).count();
        assert_eq!(ink, CIRCLES.iter().map(|row| row.matches('x').count()).sum::<usize>());
    }

    #[test]
    fn depth_stencil_is_attachment_only() {
        let desc = depth_stencil_descriptor(wgpu::TextureFormat::Depth24PlusStencil8, 0, 600, "Depth Stencil");
        assert_eq!(desc.usage, wgpu::TextureUsages::RENDER_ATTACHMENT);
        assert!(!desc.usage.contains(wgpu::TextureUsages::TEXTURE_BINDING));
        assert_eq!((desc.size.width, desc.size.height), (1, 600));
        assert_eq!(desc.format, wgpu::TextureFormat::Depth24PlusStencil8);
    }
}
