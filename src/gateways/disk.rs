use std::path::PathBuf;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::fs;

use crate::common::error::CollageError;
use crate::entities::member::MemberRecord;
use crate::usecases::gateways::Storage;

const AVATAR_EXTENSION: &str = "png";

/// Avatars live under `{root}/{guild_id}/{member_id}-{avatar_key}.png`.
struct Disk {
    root: PathBuf,
}

pub fn new(root: PathBuf) -> impl Storage {
    Disk { root }
}

#[async_trait]
impl Storage for Disk {
    async fn prepare(&self, guild_id: u64) -> Result<PathBuf, CollageError> {
        let dir = self.guild_dir(guild_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CollageError::io(&dir, e))?;
        Ok(dir)
    }

    async fn save_avatar(&self, guild_id: u64, member: &MemberRecord, body: Vec<u8>) -> Result<PathBuf> {
        let path = self.guild_dir(guild_id).join(member.file_name());

        fs::write(&path, body)
            .await
            .map_err(|e| anyhow!("could not write {}: {}", path.display(), e))?;

        Ok(path)
    }

    async fn list_avatars(&self, guild_id: u64) -> Result<Vec<PathBuf>, CollageError> {
        let dir = self.guild_dir(guild_id);
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| CollageError::io(&dir, format!("could not read directory: {}", e)))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CollageError::io(&dir, format!("could not read directory entry: {}", e)))?
        {
            let path = entry.path();
            let is_avatar = path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case(AVATAR_EXTENSION));
            let is_file = entry.file_type().await.map_or(false, |t| t.is_file());
            if is_avatar && is_file {
                paths.push(path);
            }
        }

        // read_dir order is platform dependent
        paths.sort();

        Ok(paths)
    }
}

impl Disk {
    fn guild_dir(&self, guild_id: u64) -> PathBuf {
        self.root.join(guild_id.to_string())
    }
}
