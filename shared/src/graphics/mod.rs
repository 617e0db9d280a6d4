use std::path::Path;

use image::{GrayImage, ImageResult};
use log::{info, warn};

use crate::models::raster::RasterInfo;

/// Consumer of finished rows. Each row is handed over exactly once.
pub trait RowSink {
    fn render(&mut self, col_offset: u32, start_row: u32, row_count: u32, pixels: &[u8]);
}

/// Collects rows into a grayscale image.
pub struct ImageSink {
    image: GrayImage,
    rows_rendered: u64,
}

impl ImageSink {
    pub fn new(raster: RasterInfo) -> Self {
        Self {
            image: GrayImage::new(raster.total_cols, raster.total_rows),
            rows_rendered: 0,
        }
    }

    pub fn rows_rendered(&self) -> u64 {
        self.rows_rendered
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.image.save(path.as_ref())?;
        info!("Image saved to {}", path.as_ref().display());
        Ok(())
    }
}

impl RowSink for ImageSink {
    fn render(&mut self, col_offset: u32, start_row: u32, row_count: u32, pixels: &[u8]) {
        if row_count == 0 || pixels.is_empty() {
            return;
        }
        let (width, height) = self.image.dimensions();
        let row_len = pixels.len() / row_count as usize;
        if col_offset as usize + row_len > width as usize || start_row + row_count > height {
            warn!(
                "Rows {}..{} at column {} fall outside the {}x{} image",
                start_row,
                start_row + row_count,
                col_offset,
                width,
                height
            );
            return;
        }

        let stride = width as usize;
        let frame: &mut [u8] = &mut self.image;
        for (i, line) in pixels.chunks_exact(row_len).enumerate() {
            let offset = (start_row as usize + i) * stride + col_offset as usize;
            frame[offset..offset + row_len].copy_from_slice(line);
        }
        self.rows_rendered += row_count as u64;
    }
}
