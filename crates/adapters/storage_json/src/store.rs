//! JSON file implementation of [`RegistryStore`].

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use lifxctl_app::ports::RegistryStore;
use lifxctl_domain::address::{IpAddress, MacAddress};
use lifxctl_domain::device::DeviceRecord;
use lifxctl_domain::error::LifxCtlError;

use crate::error::StorageError;

/// On-disk document. `devices` is keyed by MAC address, in registry order.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    devices: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    name: String,
    ip: IpAddress,
}

/// Registry store backed by a single JSON file.
///
/// A missing file reads as an empty registry. Saves write a sibling
/// `<file>.tmp` and rename it over the target, so an interrupted save leaves
/// the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> impl Future<Output = Result<Vec<DeviceRecord>, LifxCtlError>> + Send {
        let path = self.path.clone();
        async move { read_registry(&path).await.map_err(LifxCtlError::from) }
    }

    fn save(
        &self,
        devices: &[DeviceRecord],
    ) -> impl Future<Output = Result<(), LifxCtlError>> + Send {
        let path = self.path.clone();
        let encoded = encode(devices);
        async move {
            write_registry(&path, encoded)
                .await
                .map_err(LifxCtlError::from)
        }
    }
}

async fn write_registry(
    path: &Path,
    encoded: Result<String, serde_json::Error>,
) -> Result<(), StorageError> {
    let contents = encoded.map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomically(path, contents.as_bytes()).await?;
    tracing::debug!(path = %path.display(), "registry saved");
    Ok(())
}

async fn read_registry(path: &Path) -> Result<Vec<DeviceRecord>, StorageError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no registry file, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    decode(&bytes).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses the document; distinct keys naming the same MAC, or two entries
/// sharing a name (ignoring case), make the whole file invalid.
fn decode(bytes: &[u8]) -> Result<Vec<DeviceRecord>, serde_json::Error> {
    let document: Document = serde_json::from_slice(bytes)?;
    let mut devices: Vec<DeviceRecord> = Vec::with_capacity(document.devices.len());
    for (key, value) in document.devices {
        let id: MacAddress = key.parse().map_err(serde_json::Error::custom)?;
        let entry: Entry = serde_json::from_value(value)?;
        if devices.iter().any(|device| device.id == id) {
            return Err(serde_json::Error::custom(format!(
                "device {id} is listed more than once"
            )));
        }
        if let Some(other) = devices.iter().find(|device| device.has_name(&entry.name)) {
            return Err(serde_json::Error::custom(format!(
                "name '{}' is used by both {} and {id}",
                entry.name, other.id
            )));
        }
        devices.push(DeviceRecord {
            id,
            name: entry.name,
            address: entry.ip,
        });
    }
    Ok(devices)
}

fn encode(devices: &[DeviceRecord]) -> Result<String, serde_json::Error> {
    let mut map = Map::with_capacity(devices.len());
    for device in devices {
        let entry = Entry {
            name: device.name.clone(),
            ip: device.address,
        };
        map.insert(device.id.to_string(), serde_json::to_value(entry)?);
    }
    let mut contents = serde_json::to_string_pretty(&Document { devices: map })?;
    contents.push('\n');
    Ok(contents)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let io = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io)?;
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, contents).await.map_err(io)?;
    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        if let Err(err) = tokio::fs::remove_file(&tmp).await {
            tracing::debug!(%err, tmp = %tmp.display(), "temporary file left behind");
        }
        return Err(io(source));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mac: &str, name: &str, ip: &str) -> DeviceRecord {
        DeviceRecord::parse(mac, name, ip).unwrap()
    }

    fn storage_error(err: &LifxCtlError) -> &StorageError {
        match err {
            LifxCtlError::Storage(inner) => inner.downcast_ref().unwrap(),
            other => panic!("expected a storage error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_load_empty_registry_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lifx_config.json"));

        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_reload_saved_devices_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lifx_config.json"));
        let devices = vec![
            record("d0:73:d5:00:00:09", "Porch", "10.0.0.9"),
            record("d0:73:d5:00:00:01", "Desk", "10.0.0.1"),
        ];

        store.save(&devices).await.unwrap();

        assert_eq!(store.load().await.unwrap(), devices);
    }

    #[tokio::test]
    async fn should_write_devices_keyed_by_mac() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lifx_config.json"));

        store
            .save(&[record("D0:73:D5:01:02:03", "Lamp1", "192.168.1.20")])
            .await
            .unwrap();

        let written = std::fs::read_to_string(store.path()).unwrap();
        let expected = "{\n  \"devices\": {\n    \"d0:73:d5:01:02:03\": {\n      \"name\": \"Lamp1\",\n      \"ip\": \"192.168.1.20\"\n    }\n  }\n}\n";
        assert_eq!(written, expected);
        assert!(!temp_path(store.path()).exists());
    }

    #[tokio::test]
    async fn should_accept_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifx_config.json");
        std::fs::write(
            &path,
            r#"{"devices": {"D0-73-D5-AA-BB-CC": {"ip": "10.1.2.3", "name": "Hall"}}}"#,
        )
        .unwrap();

        let devices = JsonFileStore::new(path).load().await.unwrap();

        assert_eq!(devices, [record("d0:73:d5:aa:bb:cc", "Hall", "10.1.2.3")]);
    }

    #[tokio::test]
    async fn should_create_parent_directories_when_saving() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/registry.json"));

        store.save(&[]).await.unwrap();

        assert!(store.path().is_file());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_fail_with_json_error_when_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifx_config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(path).load().await.unwrap_err();

        assert!(matches!(storage_error(&err), StorageError::Json { .. }));
    }

    #[tokio::test]
    async fn should_fail_with_json_error_when_mac_key_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifx_config.json");
        std::fs::write(
            &path,
            r#"{"devices": {"not-a-mac": {"name": "Hall", "ip": "10.1.2.3"}}}"#,
        )
        .unwrap();

        let err = JsonFileStore::new(path).load().await.unwrap_err();

        assert!(matches!(storage_error(&err), StorageError::Json { .. }));
    }

    #[tokio::test]
    async fn should_fail_with_json_error_when_ip_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifx_config.json");
        std::fs::write(
            &path,
            r#"{"devices": {"d0:73:d5:00:00:01": {"name": "Hall", "ip": "10.1.2"}}}"#,
        )
        .unwrap();

        let err = JsonFileStore::new(path).load().await.unwrap_err();

        assert!(matches!(storage_error(&err), StorageError::Json { .. }));
    }

    #[tokio::test]
    async fn should_fail_with_io_error_and_keep_snapshot_when_target_cannot_be_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.save(&[]).await.unwrap_err();

        assert!(matches!(storage_error(&err), StorageError::Io { .. }));
        assert!(path.join("keep").is_file());
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn should_fail_with_json_error_when_mac_is_listed_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifx_config.json");
        std::fs::write(
            &path,
            r#"{"devices": {
                "D0:73:D5:AA:BB:CC": {"name": "Porch", "ip": "10.1.2.3"},
                "d0-73-d5-aa-bb-cc": {"name": "Hall", "ip": "10.1.2.4"}
            }}"#,
        )
        .unwrap();

        let err = JsonFileStore::new(path).load().await.unwrap_err();

        match storage_error(&err) {
            StorageError::Json { source, .. } => {
                assert!(source.to_string().contains("d0:73:d5:aa:bb:cc"));
            }
            other => panic!("expected a json error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_fail_with_json_error_when_name_is_used_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifx_config.json");
        std::fs::write(
            &path,
            r#"{"devices": {
                "d0:73:d5:00:00:01": {"name": "Hall", "ip": "10.1.2.3"},
                "d0:73:d5:00:00:02": {"name": "HALL", "ip": "10.1.2.4"}
            }}"#,
        )
        .unwrap();

        let err = JsonFileStore::new(path).load().await.unwrap_err();

        assert!(matches!(storage_error(&err), StorageError::Json { .. }));
    }
}
