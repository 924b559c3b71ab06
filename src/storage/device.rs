use std::fmt;

use crate::{constants::storage::DEVICE_ID_KEY, storage::local::LocalStorage};

/// random, locally persisted id that scopes remote favorites to this install.
///
/// not an identity in any auth sense.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn generate() -> Self {
        DeviceId(uuid::Uuid::new_v4().to_string())
    }

    /// the stored id, or a new one written back to storage.
    ///
    /// if storage can't be read the id only lives as long as this process,
    /// and whatever is stored is left alone.
    #[tracing::instrument(skip_all)]
    pub async fn load_or_create(storage: &LocalStorage) -> Self {
        match storage.get(DEVICE_ID_KEY).await {
            Ok(Some(id)) if !id.is_empty() => return DeviceId(id),
            Ok(_) => {}
            Err(e) => {
                let id = DeviceId::generate();
                tracing::warn!(err = ?e, device_id = %id, "couldn't read the device id, using a temporary one");

                return id;
            }
        }

        let id = DeviceId::generate();
        tracing::info!(device_id = %id, "generated a new device id");

        if let Err(e) = storage.set(DEVICE_ID_KEY, id.as_str()).await {
            tracing::warn!(err = ?e, "couldn't persist the device id, it will change on restart");
        }

        id
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        DeviceId(id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{events::EventBus, local::memory_storage};

    #[tokio::test]
    async fn device_id_is_created_once() {
        let storage = memory_storage(EventBus::default()).await;

        let first = DeviceId::load_or_create(&storage).await;
        let second = DeviceId::load_or_create(&storage).await;

        assert_eq!(first, second);
        assert!(uuid::Uuid::try_parse(first.as_str()).is_ok());
        assert_eq!(
            storage.get(DEVICE_ID_KEY).await.unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[tokio::test]
    async fn existing_id_is_kept() {
        let storage = memory_storage(EventBus::default()).await;
        storage.set(DEVICE_ID_KEY, "from-an-older-install").await.unwrap();

        assert_eq!(
            DeviceId::load_or_create(&storage).await,
            DeviceId::from("from-an-older-install")
        );
    }

    #[tokio::test]
    async fn unreadable_id_is_not_overwritten() {
        let storage = memory_storage(EventBus::default()).await;
        storage.set_blob(DEVICE_ID_KEY, b"old-id").await;
        assert!(storage.get(DEVICE_ID_KEY).await.is_err());

        let first = DeviceId::load_or_create(&storage).await;
        let second = DeviceId::load_or_create(&storage).await;

        // a temporary id each time, the stored bytes stay put
        assert_ne!(first, second);
        assert_eq!(storage.raw_value(DEVICE_ID_KEY).await.as_deref(), Some(&b"old-id"[..]));
    }
}
