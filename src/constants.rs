use std::sync::LazyLock;

pub mod storage;
pub mod version;

pub static POISE_VERSION: &str = "0.6.1";
pub static STARTUP_TIME: LazyLock<std::time::SystemTime> =
    LazyLock::new(std::time::SystemTime::now);

pub static EMBED_COLOR: u32 = 0xF4B860;
