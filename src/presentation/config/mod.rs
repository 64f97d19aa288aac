mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, JobSettings, LoggingSettings, MediaSettings, ServerSettings, Settings,
    TranscriptionProviderSetting, TranscriptionSettings,
};
