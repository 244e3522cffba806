pub mod ad_event;
pub mod config;
pub mod error;
pub mod types;

pub use ad_event::{AdEvent, ConfirmationType};
pub use config::EngineConfig;
pub use error::{AdsError, AdsResult};
pub use types::{
    AdType, CreativeAd, CreativeAdLike, CreativeAdNotification, CreativeDaypart,
    CreativeInlineContentAd, UserModel, UserPreferences, UNTARGETED_SEGMENT,
};
