use std::collections::HashSet;
use std::sync::Arc;

use crate::common::error::CollageError;
use crate::entities::member::{AvatarCdn, MemberRecord};

use super::cooldown::Cooldown;
use super::gateways::{Directory, MembersPage, Progress};

pub struct FetchMembers {
    directory: Arc<dyn Directory>,
    cooldown: Cooldown,
    cdn: AvatarCdn,
    page_size: u32,
    max_ratelimit_retries: Option<u32>,
}

pub fn new(
    directory: Arc<dyn Directory>,
    cooldown: Cooldown,
    cdn: AvatarCdn,
    page_size: u32,
    max_ratelimit_retries: Option<u32>,
) -> FetchMembers {
    FetchMembers {
        directory,
        cooldown,
        cdn,
        page_size,
        max_ratelimit_retries,
    }
}

// General idea:
// - ask for the page after the highest member id seen so far
// - when the bucket is empty, cool down and ask for the same page again
// - an empty page means the listing is exhausted
impl FetchMembers {
    pub async fn execute(
        &self,
        guild_id: u64,
        progress: &dyn Progress,
    ) -> Result<Vec<MemberRecord>, CollageError> {
        let mut members: Vec<MemberRecord> = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();
        let mut after = 0u64;
        let mut cooldowns = 0u32;

        loop {
            progress.report(&format!("Fetching members (fetched {}).", members.len()));

            let raw_members = match self
                .directory
                .members_page(guild_id, after, self.page_size)
                .await?
            {
                MembersPage::RateLimited(limit) => {
                    cooldowns += 1;
                    if let Some(max) = self.max_ratelimit_retries {
                        if cooldowns > max {
                            return Err(CollageError::RateLimitExhausted(max));
                        }
                    }
                    self.cooldown.wait(limit.reset_after(), progress).await;
                    continue;
                }
                MembersPage::Members(raw_members) => raw_members,
            };
            cooldowns = 0;

            if raw_members.is_empty() {
                break;
            }

            let previous_after = after;
            for raw in &raw_members {
                let record = self.cdn.record(raw)?;
                after = after.max(record.member_id());
                if !seen.insert(record.member_id()) {
                    tracing::debug!(member_id = record.member_id(), "dropping duplicate member");
                    continue;
                }
                members.push(record);
            }

            if after == previous_after {
                return Err(CollageError::Malformed(format!(
                    "member page after {} did not advance the cursor",
                    after
                )));
            }

            tracing::debug!(page = raw_members.len(), total = members.len(), after, "fetched member page");
        }

        tracing::info!(guild_id, count = members.len(), "fetched all members");

        Ok(members)
    }
}
