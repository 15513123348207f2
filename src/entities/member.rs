use serde::Deserialize;

use crate::common::error::CollageError;

const DEFAULT_AVATAR_COUNT: u64 = 5;

/// One element of the guild member listing. Fields we do not use are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMember {
    pub user: RawUser,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    member_id: u64,
    avatar_url: String,
    avatar_key: String,
}

pub fn new(member_id: u64, avatar_url: String, avatar_key: String) -> MemberRecord {
    MemberRecord {
        member_id,
        avatar_url,
        avatar_key,
    }
}

impl MemberRecord {
    pub fn member_id(&self) -> u64 {
        self.member_id
    }

    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    pub fn avatar_key(&self) -> &str {
        &self.avatar_key
    }

    /// File name the downloaded avatar is stored under.
    pub fn file_name(&self) -> String {
        format!("{}-{}.png", self.member_id, self.avatar_key)
    }
}

/// Resolves avatar download urls against the CDN.
#[derive(Debug, Clone)]
pub struct AvatarCdn {
    base_url: String,
    download_size: u32,
}

pub fn cdn(base_url: &str, download_size: u32) -> AvatarCdn {
    AvatarCdn {
        base_url: base_url.trim_end_matches('/').to_string(),
        download_size,
    }
}

impl AvatarCdn {
    // Priority: guild avatar, then global avatar, then the default avatar.
    pub fn record(&self, raw: &RawMember) -> Result<MemberRecord, CollageError> {
        let member_id = raw
            .user
            .id
            .parse::<u64>()
            .map_err(|e| CollageError::Malformed(format!("invalid member id {:?}: {}", raw.user.id, e)))?;

        let custom_hash = non_empty(&raw.avatar).or_else(|| non_empty(&raw.user.avatar));

        let record = match custom_hash {
            Some(hash) => new(member_id, self.custom_url(member_id, hash), hash.to_string()),
            None => {
                let index = member_id % DEFAULT_AVATAR_COUNT;
                new(member_id, self.default_url(index), index.to_string())
            }
        };

        Ok(record)
    }

    fn custom_url(&self, member_id: u64, hash: &str) -> String {
        format!(
            "{}/avatars/{}/{}.png?format=png&quality=lossless&width={}&height={}",
            self.base_url, member_id, hash, self.download_size, self.download_size
        )
    }

    fn default_url(&self, index: u64) -> String {
        format!("{}/embed/avatars/{}.png", self.base_url, index)
    }
}

fn non_empty(hash: &Option<String>) -> Option<&str> {
    hash.as_deref().filter(|h| !h.is_empty())
}
