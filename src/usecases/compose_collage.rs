use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::error::CollageError;
use crate::entities::{aspect::AspectRatio, grid::Grid};

use super::gateways::{Images, Progress, Storage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageSummary {
    pub grid: Grid,
    pub image_count: usize,
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
}

pub struct ComposeCollage {
    storage: Arc<dyn Storage>,
    images: Arc<dyn Images>,
}

pub fn new(storage: Arc<dyn Storage>, images: Arc<dyn Images>) -> ComposeCollage {
    ComposeCollage { storage, images }
}

// Works off whatever is in the avatar directory, so it can run on its own
// against avatars downloaded by an earlier run.
impl ComposeCollage {
    pub async fn execute(
        &self,
        guild_id: u64,
        aspect: AspectRatio,
        avatar_size: u32,
        out_path: &Path,
        progress: &dyn Progress,
    ) -> Result<CollageSummary, CollageError> {
        let image_paths = self.storage.list_avatars(guild_id).await?;
        let grid = Grid::plan(image_paths.len(), aspect)?;

        tracing::info!(
            guild_id,
            images = image_paths.len(),
            columns = grid.columns(),
            rows = grid.rows(),
            capacity = grid.capacity(),
            "planned collage grid"
        );

        let (width, height) = self
            .images
            .compose(&image_paths, grid, avatar_size, out_path, progress)
            .await?;

        Ok(CollageSummary {
            grid,
            image_count: image_paths.len(),
            width,
            height,
            output: out_path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::entities::{aspect, member};
    use crate::gateways::{disk, images};
    use crate::usecases::gateways::NoProgress;

    async fn seed(storage: &dyn Storage, guild_id: u64, count: u64) {
        storage.prepare(guild_id).await.unwrap();
        for id in 0..count {
            let mut png = Vec::new();
            image::RgbaImage::from_pixel(3, 3, image::Rgba([0, 0, 255, 255]))
                .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
                .unwrap();
            let record = member::new(id, String::new(), (id % 5).to_string());
            storage.save_avatar(guild_id, &record, png).await.unwrap();
        }
    }

    #[tokio::test]
    async fn composes_everything_on_disk() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(disk::new(dir.path().join("avatars")));
        seed(storage.as_ref(), 9, 37).await;
        let out = dir.path().join("output.png");

        let compose = new(storage, Arc::new(images::new()));
        let summary = compose
            .execute(9, aspect::new(1, 1), 10, &out, &NoProgress)
            .await
            .unwrap();

        assert_eq!(summary.image_count, 37);
        assert_eq!((summary.grid.columns(), summary.grid.rows()), (7, 7));
        assert_eq!((summary.width, summary.height), (70, 70));
        assert_eq!(image::image_dimensions(&out).unwrap(), (70, 70));
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let compose = new(
            Arc::new(disk::new(dir.path().join("nowhere"))),
            Arc::new(images::new()),
        );

        let result = compose
            .execute(9, aspect::new(1, 1), 10, &dir.path().join("out.png"), &NoProgress)
            .await;

        assert!(matches!(result, Err(CollageError::Io { .. })));
    }
}
