/// local storage key holding the JSON list of favorites.
pub static FAVORITES_KEY: &str = "favoriteQuotes";
pub static DEVICE_ID_KEY: &str = "deviceId";

pub static FAVORITES_TABLE: &str = "favorites";
pub static FAVORITES_LIMIT: usize = 100;

/// browsers give local storage about 5 MiB per origin, so do we.
pub static LOCAL_QUOTA_BYTES: usize = 5 * 1024 * 1024;
