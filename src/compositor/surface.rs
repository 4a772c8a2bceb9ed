use std::io::Cursor;

use gtk4::cairo;
use image::{ImageFormat, RgbaImage};

pub(crate) fn rgba_image_to_cairo_surface(image: &RgbaImage) -> Option<cairo::ImageSurface> {
    let width = i32::try_from(image.width()).ok()?;
    let height = i32::try_from(image.height()).ok()?;
    let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).ok()?;
    let stride = usize::try_from(surface.stride()).ok()?;

    {
        let mut data = surface.data().ok()?;
        let image_width = usize::try_from(image.width()).ok()?;
        let image_height = usize::try_from(image.height()).ok()?;
        let src_row_len = image_width.checked_mul(4)?;
        let src = image.as_raw();

        for row in 0..image_height {
            let src_row_offset = row.checked_mul(src_row_len)?;
            let src_row_end = src_row_offset.checked_add(src_row_len)?;
            let dst_row_offset = row.checked_mul(stride)?;
            let dst_row_end = dst_row_offset.checked_add(src_row_len)?;
            if src_row_end > src.len() || dst_row_end > data.len() {
                return None;
            }

            let src_row = &src[src_row_offset..src_row_end];
            let dst_row = &mut data[dst_row_offset..dst_row_end];

            for (src_pixel, dst_pixel) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                let [r, g, b, a] = [src_pixel[0], src_pixel[1], src_pixel[2], src_pixel[3]];
                let premultiply = |channel: u8| ((u16::from(channel) * u16::from(a) + 127) / 255) as u8;
                match a {
                    0 => dst_pixel.copy_from_slice(&[0, 0, 0, 0]),
                    255 => dst_pixel.copy_from_slice(&[b, g, r, 255]),
                    _ => dst_pixel.copy_from_slice(&[premultiply(b), premultiply(g), premultiply(r), a]),
                }
            }
        }
    }

    surface.flush();
    Some(surface)
}

/// Reads premultiplied BGRA rows back into straight RGBA.
pub(crate) fn cairo_surface_to_rgba_image(surface: &mut cairo::ImageSurface) -> Option<RgbaImage> {
    surface.flush();
    let width = u32::try_from(surface.width()).ok()?;
    let height = u32::try_from(surface.height()).ok()?;
    let stride = usize::try_from(surface.stride()).ok()?;
    let row_len = usize::try_from(width).ok()?.checked_mul(4)?;
    let rows = usize::try_from(height).ok()?;
    let mut rgba = vec![0_u8; row_len.checked_mul(rows)?];

    {
        let data = surface.data().ok()?;
        for row in 0..rows {
            let src_offset = row.checked_mul(stride)?;
            let src_end = src_offset.checked_add(row_len)?;
            if src_end > data.len() {
                return None;
            }
            let dst_offset = row * row_len;
            let src_row = &data[src_offset..src_end];
            let dst_row = &mut rgba[dst_offset..dst_offset + row_len];
            for (src_pixel, dst_pixel) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                let [b, g, r, a] = [src_pixel[0], src_pixel[1], src_pixel[2], src_pixel[3]];
                let unpremultiply = |channel: u8| {
                    ((u16::from(channel) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8
                };
                match a {
                    0 => dst_pixel.copy_from_slice(&[0, 0, 0, 0]),
                    255 => dst_pixel.copy_from_slice(&[r, g, b, 255]),
                    _ => dst_pixel.copy_from_slice(&[unpremultiply(r), unpremultiply(g), unpremultiply(b), a]),
                }
            }
        }
    }

    RgbaImage::from_raw(width, height, rgba)
}

pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn opaque_pixels_survive_surface_round_trip() {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(2, 1, Rgba([10, 20, 30, 255]));

        let mut surface = rgba_image_to_cairo_surface(&image).expect("surface should be created");
        let restored = cairo_surface_to_rgba_image(&mut surface).expect("image should be read back");

        assert_eq!(restored.dimensions(), (3, 2));
        assert_eq!(restored.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(restored.get_pixel(1, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(restored.get_pixel(2, 1), &Rgba([10, 20, 30, 255]));
        assert_eq!(restored.get_pixel(0, 1), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn encode_png_writes_png_signature_and_dimensions() {
        let image = RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&image).expect("png encoding should work");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).expect("png should decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(decoded.get_pixel(3, 1), &Rgba([1, 2, 3, 255]));
    }
}
