use crate::error::ScoutError;
use crate::models::{CatalogSnapshot, Gender, ShoeRecord};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the persisted catalog snapshot
pub const DATA_ARTIFACT: &str = "data";

/// Named JSON documents shared with the dashboard
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save(&self, name: &str, value: &Value) -> Result<(), ScoutError>;

    /// `None` when the artifact is missing or unreadable as JSON
    async fn load(&self, name: &str) -> Result<Option<Value>, ScoutError>;
}

/// One pretty-printed `{name}.json` per artifact in a directory
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl ArtifactStore for JsonFileStore {
    async fn save(&self, name: &str, value: &Value) -> Result<(), ScoutError> {
        let write_error = |source| ScoutError::ArtifactWrite {
            name: name.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(write_error)?;
        let json = serde_json::to_string_pretty(value)?;
        let path = self.path_for(name);
        tokio::fs::write(&path, json).await.map_err(write_error)?;

        debug!("Saved {}", path.display());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Value>, ScoutError> {
        let path = self.path_for(name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ScoutError::ArtifactRead {
                    name: name.to_string(),
                    source,
                })
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring malformed artifact {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }
}

pub async fn save_artifact<S, T>(store: &S, name: &str, artifact: &T) -> Result<(), ScoutError>
where
    S: ArtifactStore + ?Sized,
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(artifact)?;
    store.save(name, &value).await
}

/// Typed load; an artifact of the wrong shape counts as missing
pub async fn load_artifact<S, T>(store: &S, name: &str) -> Result<Option<T>, ScoutError>
where
    S: ArtifactStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(value) = store.load(name).await? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(artifact) => Ok(Some(artifact)),
        Err(e) => {
            warn!("Artifact {} has an unexpected shape: {}", name, e);
            Ok(None)
        }
    }
}

/// Load the catalog snapshot record by record, skipping what doesn't parse
pub async fn load_snapshot<S>(store: &S) -> Result<Option<CatalogSnapshot>, ScoutError>
where
    S: ArtifactStore + ?Sized,
{
    let Some(value) = store.load(DATA_ARTIFACT).await? else {
        return Ok(None);
    };
    let Value::Object(brands) = value else {
        warn!("Snapshot is not a brand map, ignoring it");
        return Ok(None);
    };

    let mut snapshot = CatalogSnapshot::new();
    for (brand, by_gender) in brands {
        let Value::Object(by_gender) = by_gender else {
            warn!("Skipping brand {}: not a gender map", brand);
            continue;
        };
        for (code, records) in by_gender {
            let Ok(gender) = code.parse::<Gender>() else {
                warn!("Skipping {} partition with unknown gender {}", brand, code);
                continue;
            };
            let Value::Array(records) = records else {
                warn!("Skipping {} ({}): records are not a list", brand, gender);
                continue;
            };

            let mut shoes = Vec::with_capacity(records.len());
            for record in records {
                match serde_json::from_value::<ShoeRecord>(record) {
                    Ok(shoe) => shoes.push(shoe),
                    Err(e) => warn!("Skipping malformed {} ({}) record: {}", brand, gender, e),
                }
            }
            snapshot.insert(&brand, gender, shoes);
        }
    }

    Ok(Some(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_artifacts_load_as_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("out"));
        assert!(store.load("avg_table").await.unwrap().is_none());
        assert!(load_snapshot(&store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saves_pretty_utf8_and_creates_dir() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("out"));
        store.save("words", &json!({"tênis": 3})).await.unwrap();

        let text = std::fs::read_to_string(store.path_for("words")).unwrap();
        assert!(text.contains("tênis"));
        assert!(text.contains('\n'));
        assert_eq!(store.load("words").await.unwrap(), Some(json!({"tênis": 3})));
    }

    #[tokio::test]
    async fn malformed_json_is_treated_as_missing() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path_for("broken"), "{ not json").unwrap();
        assert!(store.load("broken").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn snapshot_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        let mut shoe = ShoeRecord::new("On Cloud 5");
        shoe.score = Some("80".to_string());
        shoe.pros = vec!["Light".to_string()];
        let mut snapshot = CatalogSnapshot::new();
        snapshot.insert("On", Gender::Male, vec![shoe]);
        snapshot.insert("On", Gender::Female, Vec::new());

        save_artifact(&store, DATA_ARTIFACT, &snapshot).await.unwrap();
        assert_eq!(load_snapshot(&store).await.unwrap(), Some(snapshot.clone()));

        let typed: Option<CatalogSnapshot> = load_artifact(&store, DATA_ARTIFACT).await.unwrap();
        assert_eq!(typed, Some(snapshot));
    }

    #[tokio::test]
    async fn snapshot_skips_bad_records() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        let data = json!({
            "Hoka": {
                "M": [
                    {"Name": "Hoka Clifton 9", "Score": "88"},
                    {"Score": "70"},
                    "garbage"
                ],
                "X": []
            },
            "Nike": "not a map"
        });
        store.save(DATA_ARTIFACT, &data).await.unwrap();

        let snapshot = load_snapshot(&store).await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records("Hoka", Gender::Male)[0].name, "Hoka Clifton 9");
        assert_eq!(snapshot.brands().collect::<Vec<_>>(), ["Hoka"]);
    }

    #[tokio::test]
    async fn wrong_shape_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.save("counts", &json!(["a", "b"])).await.unwrap();
        let loaded: Option<std::collections::BTreeMap<String, u64>> =
            load_artifact(&store, "counts").await.unwrap();
        assert!(loaded.is_none());
    }
}
