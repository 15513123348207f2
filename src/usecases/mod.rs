pub mod compose_collage;
pub mod cooldown;
pub mod download_avatars;
pub mod fetch_members;
pub mod gateways;
pub mod generate;
