//! Video generation provider clients.

mod pika;
mod runway;
mod stable_video;

pub use pika::{PikaProvider, PikaProviderBuilder};
pub use runway::{RunwayProvider, RunwayProviderBuilder};
pub use stable_video::{StableVideoProvider, StableVideoProviderBuilder};
