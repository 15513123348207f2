use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use image::{imageops, imageops::FilterType, ImageFormat, RgbaImage};

use crate::common::{error::CollageError, format::Format};
use crate::entities::grid::Grid;
use crate::usecases::gateways::{Images, Progress};

use super::progress::progress_bar;

const PROGRESS_BAR_RESOLUTION: usize = 20;

struct ImagesImpl {}

pub fn new() -> impl Images {
    ImagesImpl {}
}

#[async_trait]
impl Images for ImagesImpl {
    async fn reencode(&self, data: &[u8], input_format: Format) -> Result<Vec<u8>> {
        let image = image::load_from_memory_with_format(data, input_format.image_format())
            .map_err(|e| anyhow!("could not load image: {}", e))?;

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| anyhow!("could not write image: {}", e))?;

        Ok(buffer.into_inner())
    }

    async fn compose(
        &self,
        image_paths: &[PathBuf],
        grid: Grid,
        avatar_size: u32,
        out_path: &Path,
        progress: &dyn Progress,
    ) -> Result<(u32, u32), CollageError> {
        let (width, height) = canvas_size(grid, avatar_size)?;
        let mut canvas = RgbaImage::new(width, height);

        let total = image_paths.len();
        let mut placed = 0u64;

        for (num, path) in image_paths.iter().enumerate() {
            let (x, y) = grid.cell(placed);
            progress.report(&format!(
                "(x: {}, y: {})\t(~{}/{})\t({}%) [{}]",
                x,
                y,
                num,
                total,
                num * 100 / total,
                progress_bar(num, total, PROGRESS_BAR_RESOLUTION)
            ));

            let avatar = match image::open(path) {
                Ok(avatar) => avatar,
                Err(e) => {
                    tracing::warn!("skipping unreadable avatar {}: {}", path.display(), e);
                    continue;
                }
            };

            let resized = avatar
                .resize_exact(avatar_size, avatar_size, FilterType::Lanczos3)
                .to_rgba8();
            imageops::replace(
                &mut canvas,
                &resized,
                x as i64 * avatar_size as i64,
                y as i64 * avatar_size as i64,
            );
            placed += 1;
        }

        progress.report("Rendering image.");
        canvas
            .save(out_path)
            .map_err(|e| CollageError::io(out_path, e))?;

        tracing::info!(width, height, placed, path = %out_path.display(), "saved collage");

        Ok((width, height))
    }
}

fn canvas_size(grid: Grid, avatar_size: u32) -> Result<(u32, u32), CollageError> {
    if avatar_size == 0 {
        return Err(CollageError::InvalidArgument(String::from(
            "avatar size must be positive",
        )));
    }

    let width = grid.columns().checked_mul(avatar_size);
    let height = grid.rows().checked_mul(avatar_size);
    match (width, height) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => Err(CollageError::InvalidArgument(format!(
            "a {}x{} grid of {}px avatars is too large",
            grid.columns(),
            grid.rows(),
            avatar_size
        ))),
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use tempfile::TempDir;

    use super::*;
    use crate::entities::aspect;
    use crate::usecases::gateways::NoProgress;

    fn write_avatar(dir: &Path, name: &str, size: u32, color: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(size, size, Rgba(color)).save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn full_grid_round_trips_dimensions() {
        let dir = TempDir::new().unwrap();
        let grid = Grid::plan(6, aspect::new(3, 2)).unwrap();
        let paths: Vec<_> = (0..grid.capacity())
            .map(|i| write_avatar(dir.path(), &format!("{}-0.png", i), 5, [10, 20, 30, 255]))
            .collect();
        let out = dir.path().join("out.png");

        let dims = new()
            .compose(&paths, grid, 16, &out, &NoProgress)
            .await
            .unwrap();

        assert_eq!(dims, (48, 32));
        assert_eq!(image::image_dimensions(&out).unwrap(), (48, 32));
    }

    #[tokio::test]
    async fn images_fill_row_major_and_rest_stays_transparent() {
        let dir = TempDir::new().unwrap();
        let grid = Grid::plan(3, aspect::new(2, 2)).unwrap();
        let paths = vec![
            write_avatar(dir.path(), "a.png", 7, [255, 0, 0, 255]),
            write_avatar(dir.path(), "b.png", 3, [0, 255, 0, 255]),
            write_avatar(dir.path(), "c.png", 9, [0, 0, 255, 255]),
        ];
        let out = dir.path().join("out.png");

        new().compose(&paths, grid, 4, &out, &NoProgress).await.unwrap();

        let canvas = image::open(&out).unwrap().to_rgba8();
        assert_eq!(canvas.dimensions(), (8, 8));
        assert_eq!(*canvas.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(5, 1), Rgba([0, 255, 0, 255]));
        assert_eq!(*canvas.get_pixel(1, 5), Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(5, 5)[3], 0);
    }

    #[tokio::test]
    async fn unreadable_file_does_not_take_a_cell() {
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"definitely not a png").unwrap();
        let paths = vec![broken, write_avatar(dir.path(), "ok.png", 4, [9, 9, 9, 255])];
        let grid = Grid::plan(2, aspect::new(2, 1)).unwrap();
        let out = dir.path().join("out.png");

        new().compose(&paths, grid, 4, &out, &NoProgress).await.unwrap();

        let canvas = image::open(&out).unwrap().to_rgba8();
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([9, 9, 9, 255]));
        assert_eq!(canvas.get_pixel(4, 0)[3], 0);
    }

    #[tokio::test]
    async fn unwritable_output_is_io_error() {
        let dir = TempDir::new().unwrap();
        let grid = Grid::plan(0, aspect::new(1, 1)).unwrap();
        let out = dir.path().join("missing").join("out.png");

        let err = new().compose(&[], grid, 4, &out, &NoProgress).await.unwrap_err();

        assert!(matches!(err, CollageError::Io { .. }));
    }

    #[tokio::test]
    async fn zero_avatar_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let grid = Grid::plan(1, aspect::new(1, 1)).unwrap();

        let err = new()
            .compose(&[], grid, 0, &dir.path().join("out.png"), &NoProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, CollageError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn reencodes_jpeg_as_png() {
        let mut jpeg = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(6, 4, image::Rgb([1, 2, 3])))
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .unwrap();

        let png = new().reencode(jpeg.get_ref(), Format::Jpeg).await.unwrap();

        assert_eq!(Format::infer(&png).unwrap(), Format::Png);
        assert_eq!(image::load_from_memory(&png).unwrap().width(), 6);
    }

    #[tokio::test]
    async fn reencode_rejects_truncated_data() {
        let err = new().reencode(&[0x89, b'P', b'N', b'G'], Format::Png).await;
        assert!(err.is_err());
    }
}
