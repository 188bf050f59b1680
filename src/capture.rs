//! Frame readback helpers and PNG export.
//!
//! GPU texture copies pad each row to `COPY_BYTES_PER_ROW_ALIGNMENT`; the
//! padding is stripped before the pixels are handed to `image`.

use anyhow::{anyhow, Result};
use image::{ImageBuffer, Rgba};
use std::path::Path;

/// Copies `rows` rows of `row_bytes` out of a buffer with `padded_row_bytes`
/// stride.
pub fn unpad_rows(data: &[u8], padded_row_bytes: usize, row_bytes: usize, rows: usize) -> Vec<u8> {
    let mut frame = Vec::with_capacity(row_bytes * rows);
    for row in data.chunks(padded_row_bytes).take(rows) {
        frame.extend_from_slice(&row[..row_bytes.min(row.len())]);
    }
    frame
}

pub fn save_png(path: &Path, rgba: &[u8], width: u32, height: u32) -> Result<()> {
    let image = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| anyhow!("Frame is {} bytes, expected {}x{} RGBA", rgba.len(), width, height))?;
    image.save(path)?;
    log::info!("Saved {}x{} frame to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpad_rows_strips_stride() {
        let data = [1, 2, 0, 0, 3, 4, 0, 0];
        assert_eq!(unpad_rows(&data, 4, 2, 2), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unpad_rows_without_padding() {
        let data = [1, 2, 3, 4];
        assert_eq!(unpad_rows(&data, 2, 2, 2), data.to_vec());
    }

    #[test]
    fn test_save_png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let pixels = vec![255u8; 4 * 3 * 2];

        save_png(&path, &pixels, 3, 2).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(2, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_save_png_rejects_short_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.png");
        assert!(save_png(&path, &[0u8; 7], 2, 2).is_err());
    }
}
