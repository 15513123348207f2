use std::sync::Arc;

use anyhow::{anyhow, Result};
use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::common::error::CollageError;
use crate::common::format::Format;
use crate::entities::member::MemberRecord;

use super::gateways::{Images, Progress, Storage, Web};

/// Outcome of a download run. Skipped members are not retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
}

pub struct DownloadAvatars {
    web: Arc<dyn Web>,
    images: Arc<dyn Images>,
    storage: Arc<dyn Storage>,
    batch_size: usize,
    max_concurrent_batches: usize,
}

pub fn new(
    web: Arc<dyn Web>,
    images: Arc<dyn Images>,
    storage: Arc<dyn Storage>,
    batch_size: usize,
    max_concurrent_batches: usize,
) -> DownloadAvatars {
    DownloadAvatars {
        web,
        images,
        storage,
        batch_size: batch_size.max(1),
        max_concurrent_batches: max_concurrent_batches.max(1),
    }
}

impl DownloadAvatars {
    pub async fn execute(
        &self,
        members: &[MemberRecord],
        guild_id: u64,
        progress: &dyn Progress,
    ) -> DownloadReport {
        let semaphore = Semaphore::new(self.max_concurrent_batches);

        let batches = members
            .chunks(self.batch_size)
            .map(|batch| self.download_batch(&semaphore, batch, guild_id, progress));

        let report = join_all(batches)
            .await
            .into_iter()
            .fold(DownloadReport::default(), |total, batch| DownloadReport {
                downloaded: total.downloaded + batch.downloaded,
                skipped: total.skipped + batch.skipped,
            });

        tracing::info!(
            guild_id,
            downloaded = report.downloaded,
            skipped = report.skipped,
            "finished downloading avatars"
        );

        report
    }

    async fn download_batch(
        &self,
        semaphore: &Semaphore,
        batch: &[MemberRecord],
        guild_id: u64,
        progress: &dyn Progress,
    ) -> DownloadReport {
        let mut report = DownloadReport::default();

        // never closed, so the permit is always granted
        let _permit = semaphore.acquire().await;

        for member in batch {
            progress.report(&format!(
                "Downloading {} - {}",
                member.member_id(),
                member.avatar_key()
            ));

            match self.download_one(member, guild_id).await {
                Ok(()) => report.downloaded += 1,
                Err(e) => {
                    let missing = CollageError::AssetMissing {
                        member_id: member.member_id(),
                        reason: e.to_string(),
                    };
                    tracing::warn!("skipping member: {}", missing);
                    report.skipped += 1;
                }
            }
        }

        report
    }

    async fn download_one(&self, member: &MemberRecord, guild_id: u64) -> Result<()> {
        let data = self.web.get_image_data(member.avatar_url()).await?;

        let format = Format::infer(&data).map_err(|e| anyhow!("could not sniff avatar: {}", e))?;
        let png = self.images.reencode(&data, format).await?;

        let path = self.storage.save_avatar(guild_id, member, png).await?;
        tracing::debug!(member_id = member.member_id(), path = %path.display(), "saved avatar");

        Ok(())
    }
}
