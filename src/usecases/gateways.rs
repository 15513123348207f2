use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use crate::common::error::CollageError;
use crate::common::format::Format;
use crate::entities::{grid::Grid, member::MemberRecord, member::RawMember, rate_limit::RateLimit};

/// Response to a single member listing request.
#[derive(Debug)]
pub enum MembersPage {
    /// Quota exhausted, the page was not consumed.
    RateLimited(RateLimit),
    Members(Vec<RawMember>),
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn members_page(
        &self,
        guild_id: u64,
        after: u64,
        limit: u32,
    ) -> Result<MembersPage, CollageError>;
}

#[async_trait]
pub trait Web: Send + Sync {
    async fn get_image_data(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait Images: Send + Sync {
    /// Decodes `data` and encodes it again as png.
    async fn reencode(&self, data: &[u8], input_format: Format) -> Result<Vec<u8>>;

    /// Pastes every image into the row-major cells of `grid` and saves the
    /// canvas to `out_path`. Returns the canvas dimensions.
    async fn compose(
        &self,
        image_paths: &[PathBuf],
        grid: Grid,
        avatar_size: u32,
        out_path: &Path,
        progress: &dyn Progress,
    ) -> Result<(u32, u32), CollageError>;
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Creates the per-guild avatar directory.
    async fn prepare(&self, guild_id: u64) -> Result<PathBuf, CollageError>;
    async fn save_avatar(&self, guild_id: u64, member: &MemberRecord, body: Vec<u8>) -> Result<PathBuf>;
    async fn list_avatars(&self, guild_id: u64) -> Result<Vec<PathBuf>, CollageError>;
}

pub trait Progress: Send + Sync {
    fn report(&self, message: &str);
}

pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&self, _message: &str) {}
}
