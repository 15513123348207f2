use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::entities::member;
use crate::settings::Settings;
use crate::usecases::generate::GenerateCollage;
use crate::usecases::{self};
use crate::gateways;

pub struct Container {
    pub settings: Arc<Settings>,
    pub generate: Arc<GenerateCollage>,
}

pub fn new(settings: Settings, token: &str) -> Result<Container> {
    let settings = Arc::new(settings);
    let directory = Arc::new(gateways::discord::new(settings.clone(), token)?);
    let web = Arc::new(gateways::http::new(settings.clone())?);
    let images = Arc::new(gateways::images::new());
    let storage = Arc::new(gateways::disk::new(PathBuf::from(settings.avatar_directory())));

    let fetch_members = Arc::new(usecases::fetch_members::new(
        directory,
        usecases::cooldown::new(settings.ratelimit_jitter(), settings.cooldown_ticks()),
        member::cdn(&settings.cdn_base_url(), settings.download_size()),
        settings.page_size(),
        settings.max_ratelimit_retries(),
    ));
    let download_avatars = Arc::new(usecases::download_avatars::new(
        web,
        images.clone(),
        storage.clone(),
        settings.batch_size(),
        settings.max_concurrent_batches(),
    ));
    let compose_collage = Arc::new(usecases::compose_collage::new(storage.clone(), images));
    let generate = Arc::new(usecases::generate::new(
        storage,
        fetch_members,
        download_avatars,
        compose_collage,
    ));

    Ok(Container { settings, generate })
}
