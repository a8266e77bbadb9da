//! Texture loading and management

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::error::{QuadError, QuadResult};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// One level of a mip chain, tightly packed RGBA8
#[derive(Debug, Clone)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Loaded texture data with its full mip chain
#[derive(Debug, Clone)]
pub struct TextureData {
    pub format: TextureFormat,
    pub levels: Vec<MipLevel>,
    pub name: String,
}

impl TextureData {
    /// Load texture from file
    ///
    /// Rows are flipped so that the first row in memory is the bottom of the
    /// image, matching texture coordinates with a bottom-left origin.
    pub fn from_file<P: AsRef<Path>>(path: P) -> QuadResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let bytes = std::fs::read(path).map_err(|source| QuadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let img = image::load_from_memory(&bytes).map_err(|source| QuadError::Image {
            path: path.to_path_buf(),
            source,
        })?;

        let texture = Self::from_image(img, &name);
        log::info!(
            "Loaded texture '{}' ({}x{}, {} mip levels)",
            texture.name,
            texture.width(),
            texture.height(),
            texture.mip_level_count()
        );
        Ok(texture)
    }

    /// Create texture from a decoded image, mirrored vertically
    pub fn from_image(img: DynamicImage, name: &str) -> Self {
        Self::from_rgba(img.flipv().to_rgba8(), name)
    }

    /// Build the mip chain from an already oriented RGBA image
    fn from_rgba(base: RgbaImage, name: &str) -> Self {
        let (mut width, mut height) = base.dimensions();
        let mut levels = Vec::with_capacity(mip_level_count(width, height) as usize);
        let mut current = base;

        loop {
            let next_width = (width / 2).max(1);
            let next_height = (height / 2).max(1);
            let last = width == 1 && height == 1;

            let next = if last {
                None
            } else {
                Some(image::imageops::resize(&current, next_width, next_height, FilterType::Triangle))
            };

            levels.push(MipLevel {
                width,
                height,
                data: current.into_raw(),
            });

            match next {
                Some(img) => {
                    current = img;
                    width = next_width;
                    height = next_height;
                }
                None => break,
            }
        }

        Self {
            format: TextureFormat::Rgba8UnormSrgb,
            levels,
            name: name.to_string(),
        }
    }

    /// Create a solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            format: TextureFormat::Rgba8UnormSrgb,
            levels: vec![MipLevel {
                width: 1,
                height: 1,
                data: color.to_vec(),
            }],
            name: name.to_string(),
        }
    }

    /// Create a checkerboard texture with 8-pixel cells
    pub fn checkerboard(size: u32, color1: [u8; 4], color2: [u8; 4]) -> Self {
        let img = RgbaImage::from_fn(size, size, |x, y| {
            let is_even = ((x / 8) + (y / 8)) % 2 == 0;
            image::Rgba(if is_even { color1 } else { color2 })
        });
        Self::from_rgba(img, "checkerboard")
    }

    pub fn width(&self) -> u32 {
        self.levels.first().map_or(0, |l| l.width)
    }

    pub fn height(&self) -> u32 {
        self.levels.first().map_or(0, |l| l.height)
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Base level pixels
    pub fn base_pixels(&self) -> &[u8] {
        self.levels.first().map(|l| l.data.as_slice()).unwrap_or(&[])
    }
}

/// Number of levels down to 1x1: floor(log2(max(w, h))) + 1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    32 - largest.leading_zeros()
}

/// GPU texture with its view
#[derive(Debug, Clone)]
pub struct GpuTexture {
    pub handle: TextureHandle,
    pub view: TextureViewHandle,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub name: String,
}

impl GpuTexture {
    /// Create and upload texture to GPU, every mip level included
    pub fn create<B: GraphicsBackend + ?Sized>(
        backend: &mut B,
        data: &TextureData,
    ) -> BackendResult<Self> {
        let handle = backend.create_texture(&TextureDescriptor {
            label: Some(data.name.clone()),
            width: data.width(),
            height: data.height(),
            mip_levels: data.mip_level_count(),
            format: data.format,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        })?;

        let view = backend.create_texture_view(handle)?;
        for (level, mip) in data.levels.iter().enumerate() {
            backend.write_texture(handle, level as u32, &mip.data, mip.width, mip.height);
        }

        Ok(Self {
            handle,
            view,
            width: data.width(),
            height: data.height(),
            format: data.format,
            name: data.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn mip_count_matches_largest_side() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(512, 512), 10);
        assert_eq!(mip_level_count(300, 17), 9);
    }

    #[test]
    fn mip_chain_halves_down_to_one() {
        let tex = TextureData::checkerboard(64, [255, 0, 0, 255], [0, 0, 255, 255]);
        assert_eq!(tex.mip_level_count(), 7);
        let sizes: Vec<(u32, u32)> = tex.levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes.first(), Some(&(64, 64)));
        assert_eq!(sizes.last(), Some(&(1, 1)));
        for level in &tex.levels {
            assert_eq!(level.data.len() as u32, level.width * level.height * 4);
        }
    }

    #[test]
    fn non_square_chain_keeps_one_pixel_minimum() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(8, 2));
        let tex = TextureData::from_image(img, "strip");
        let sizes: Vec<(u32, u32)> = tex.levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn images_are_mirrored_vertically() {
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255])); // top
        img.put_pixel(0, 1, Rgba([0, 255, 0, 255])); // bottom
        let tex = TextureData::from_image(DynamicImage::ImageRgba8(img), "pair");
        assert_eq!(&tex.base_pixels()[0..4], &[0, 255, 0, 255]);
        assert_eq!(&tex.base_pixels()[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TextureData::from_file("does/not/exist.png").unwrap_err();
        assert!(matches!(err, QuadError::Io { .. }));
    }
}
