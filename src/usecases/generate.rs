use std::path::PathBuf;
use std::sync::Arc;

use crate::common::error::CollageError;
use crate::entities::aspect::AspectRatio;

use super::compose_collage::{CollageSummary, ComposeCollage};
use super::download_avatars::DownloadAvatars;
use super::fetch_members::FetchMembers;
use super::gateways::{Progress, Storage};

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub guild_id: u64,
    pub aspect: AspectRatio,
    pub avatar_size: u32,
    pub output: PathBuf,
    pub skip_download: bool,
}

pub struct GenerateCollage {
    storage: Arc<dyn Storage>,
    fetch_members: Arc<FetchMembers>,
    download_avatars: Arc<DownloadAvatars>,
    compose_collage: Arc<ComposeCollage>,
}

pub fn new(
    storage: Arc<dyn Storage>,
    fetch_members: Arc<FetchMembers>,
    download_avatars: Arc<DownloadAvatars>,
    compose_collage: Arc<ComposeCollage>,
) -> GenerateCollage {
    GenerateCollage {
        storage,
        fetch_members,
        download_avatars,
        compose_collage,
    }
}

impl GenerateCollage {
    pub async fn execute(
        &self,
        request: &GenerateRequest,
        progress: &dyn Progress,
    ) -> Result<CollageSummary, CollageError> {
        validate(request)?;

        self.storage.prepare(request.guild_id).await?;

        if !request.skip_download {
            progress.report("Fetching members.");
            let members = self.fetch_members.execute(request.guild_id, progress).await?;

            progress.report("Downloading all avatars.");
            let report = self
                .download_avatars
                .execute(&members, request.guild_id, progress)
                .await;
            if report.skipped > 0 {
                tracing::warn!(skipped = report.skipped, "some avatars could not be downloaded");
            }
        } else {
            tracing::info!("skipping member fetch and avatar download");
        }

        progress.report("Generating image.");
        let summary = self
            .compose_collage
            .execute(
                request.guild_id,
                request.aspect,
                request.avatar_size,
                &request.output,
                progress,
            )
            .await?;

        progress.report(&format!("Image saved to {}", summary.output.display()));

        Ok(summary)
    }
}

fn validate(request: &GenerateRequest) -> Result<(), CollageError> {
    if request.aspect.width() == 0 || request.aspect.height() == 0 {
        return Err(CollageError::InvalidArgument(format!(
            "aspect ratio must be positive, got {}",
            request.aspect
        )));
    }
    if request.avatar_size == 0 {
        return Err(CollageError::InvalidArgument(String::from(
            "avatar size must be positive",
        )));
    }
    Ok(())
}
