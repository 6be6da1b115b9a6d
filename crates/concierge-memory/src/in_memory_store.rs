use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::vector_store::{
    BoxFuture, ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError,
};

#[derive(Serialize, Deserialize)]
struct StoredPoint {
    id: u64,
    vector: Vec<f32>,
    payload: HashMap<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct InMemoryCollection {
    dimension: u64,
    /// Insertion order; search ties resolve to the earlier point.
    points: Vec<StoredPoint>,
    #[serde(skip)]
    positions: HashMap<u64, usize>,
}

impl InMemoryCollection {
    fn new(dimension: u64) -> Self {
        Self {
            dimension,
            points: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn reindex(&mut self) {
        self.positions = self
            .points
            .iter()
            .enumerate()
            .map(|(pos, p)| (p.id, pos))
            .collect();
    }

    fn check_dimension(&self, len: usize) -> Result<(), VectorStoreError> {
        let actual = len as u64;
        if actual == self.dimension {
            Ok(())
        } else {
            Err(VectorStoreError::Dimension {
                expected: self.dimension,
                actual,
            })
        }
    }
}

/// Brute-force cosine index, optionally snapshotted to a directory.
///
/// With a snapshot directory every mutation rewrites `<dir>/<collection>.json`,
/// and [`InMemoryVectorStore::open`] restores all collections found there.
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, InMemoryCollection>>,
    snapshot_dir: Option<PathBuf>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            snapshot_dir: None,
        }
    }

    /// Open a store persisted under `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a snapshot is unreadable.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, VectorStoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| persistence(dir, &e))?;

        let mut collections = HashMap::new();
        for entry in std::fs::read_dir(dir).map_err(|e| persistence(dir, &e))? {
            let path = entry.map_err(|e| persistence(dir, &e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = std::fs::read(&path).map_err(|e| persistence(&path, &e))?;
            let mut col: InMemoryCollection =
                serde_json::from_slice(&bytes).map_err(|e| persistence(&path, &e))?;
            col.reindex();
            tracing::debug!(collection = name, points = col.points.len(), "loaded snapshot");
            collections.insert(name.to_owned(), col);
        }

        Ok(Self {
            collections: RwLock::new(collections),
            snapshot_dir: Some(dir.to_path_buf()),
        })
    }

    fn snapshot_path(&self, collection: &str) -> Option<PathBuf> {
        self.snapshot_dir
            .as_ref()
            .map(|dir| dir.join(format!("{collection}.json")))
    }

    async fn persist(&self, collection: &str) -> Result<(), VectorStoreError> {
        let Some(path) = self.snapshot_path(collection) else {
            return Ok(());
        };
        let bytes = {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Persistence(e.to_string()))?;
            match cols.get(collection) {
                Some(col) => Some(
                    serde_json::to_vec(col)
                        .map_err(|e| VectorStoreError::Persistence(e.to_string()))?,
                ),
                None => None,
            }
        };

        match bytes {
            Some(bytes) => {
                let tmp = path.with_extension("json.tmp");
                tokio::fs::write(&tmp, bytes)
                    .await
                    .map_err(|e| persistence(&tmp, &e))?;
                tokio::fs::rename(&tmp, &path)
                    .await
                    .map_err(|e| persistence(&path, &e))?;
            }
            None => match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(persistence(&path, &e)),
            },
        }
        Ok(())
    }
}

fn persistence(path: &Path, err: &dyn std::fmt::Display) -> VectorStoreError {
    VectorStoreError::Persistence(format!("{}: {err}", path.display()))
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore")
            .field("snapshot_dir", &self.snapshot_dir)
            .finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorStore for InMemoryVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let created = {
                let mut cols = self
                    .collections
                    .write()
                    .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
                match cols.get(&collection) {
                    Some(col) if col.dimension != vector_size => {
                        return Err(VectorStoreError::Dimension {
                            expected: col.dimension,
                            actual: vector_size,
                        });
                    }
                    Some(_) => false,
                    None => {
                        cols.insert(collection.clone(), InMemoryCollection::new(vector_size));
                        true
                    }
                }
            };
            if created {
                self.persist(&collection).await?;
            }
            Ok(())
        })
    }

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            Ok(cols.contains_key(&collection))
        })
    }

    fn delete_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.collections
                .write()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?
                .remove(&collection);
            self.persist(&collection).await
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            {
                let mut cols = self
                    .collections
                    .write()
                    .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
                let col = cols.get_mut(&collection).ok_or_else(|| {
                    VectorStoreError::Upsert(format!("collection {collection} not found"))
                })?;
                for p in &points {
                    col.check_dimension(p.vector.len())?;
                }
                for p in points {
                    let stored = StoredPoint {
                        id: p.id,
                        vector: p.vector,
                        payload: p.payload,
                    };
                    if let Some(&pos) = col.positions.get(&stored.id) {
                        col.points[pos] = stored;
                    } else {
                        col.positions.insert(stored.id, col.points.len());
                        col.points.push(stored);
                    }
                }
            }
            self.persist(&collection).await
        })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            let col = cols.get(&collection).ok_or_else(|| {
                VectorStoreError::Search(format!("collection {collection} not found"))
            })?;
            if col.points.is_empty() {
                return Ok(Vec::new());
            }
            col.check_dimension(vector.len())?;

            let mut scored: Vec<ScoredVectorPoint> = col
                .points
                .iter()
                .map(|sp| ScoredVectorPoint {
                    id: sp.id,
                    score: cosine_similarity(&vector, &sp.vector),
                    payload: sp.payload.clone(),
                })
                .collect();

            // stable: equal scores keep insertion order
            scored.sort_by(|a, b| b.score.total_cmp(&a.score));
            scored.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(scored)
        })
    }

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            let col = cols.get(&collection).ok_or_else(|| {
                VectorStoreError::Collection(format!("collection {collection} not found"))
            })?;
            Ok(col.points.len() as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: u64, vector: Vec<f32>, name: &str) -> VectorPoint {
        VectorPoint {
            id,
            vector,
            payload: HashMap::from([("name".into(), serde_json::json!(name))]),
        }
    }

    fn names(results: &[ScoredVectorPoint]) -> Vec<&str> {
        results
            .iter()
            .map(|r| r.payload["name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn ensure_collection_and_exists() {
        let store = InMemoryVectorStore::new();
        assert!(!store.collection_exists("test").await.unwrap());
        store.ensure_collection("test", 3).await.unwrap();
        assert!(store.collection_exists("test").await.unwrap());
    }

    #[tokio::test]
    async fn ensure_collection_idempotent() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        store.upsert("test", vec![point(0, vec![1.0, 0.0, 0.0], "a")]).await.unwrap();
        store.ensure_collection("test", 3).await.unwrap();
        assert_eq!(store.count("test").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ensure_collection_rejects_other_dimension() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        let err = store.ensure_collection("test", 4).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Dimension { expected: 3, actual: 4 }));
    }

    #[tokio::test]
    async fn delete_collection_removes() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        store.delete_collection("test").await.unwrap();
        assert!(!store.collection_exists("test").await.unwrap());
    }

    #[tokio::test]
    async fn upsert_and_search_ranks_by_similarity() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        store
            .upsert(
                "test",
                vec![
                    point(0, vec![0.0, 1.0, 0.0], "beta"),
                    point(1, vec![1.0, 0.0, 0.0], "alpha"),
                    point(2, vec![0.7, 0.7, 0.0], "mid"),
                ],
            )
            .await
            .unwrap();

        let results = store.search("test", vec![1.0, 0.0, 0.0], 3).await.unwrap();
        assert_eq!(names(&results), ["alpha", "mid", "beta"]);
        assert!((results[0].score - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn search_length_is_min_of_limit_and_size() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        store
            .upsert(
                "test",
                vec![point(0, vec![1.0, 0.0], "a"), point(1, vec![0.0, 1.0], "b")],
            )
            .await
            .unwrap();

        assert_eq!(store.search("test", vec![1.0, 1.0], 1).await.unwrap().len(), 1);
        assert_eq!(store.search("test", vec![1.0, 1.0], 5).await.unwrap().len(), 2);
        assert!(store.search("test", vec![1.0, 1.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ties_break_by_insertion_order() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        store
            .upsert(
                "test",
                vec![
                    point(7, vec![1.0, 0.0], "first"),
                    point(3, vec![2.0, 0.0], "second"),
                    point(5, vec![3.0, 0.0], "third"),
                ],
            )
            .await
            .unwrap();

        let results = store.search("test", vec![1.0, 0.0], 3).await.unwrap();
        assert_eq!(names(&results), ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn upsert_existing_id_replaces_in_place() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        store
            .upsert(
                "test",
                vec![point(0, vec![1.0, 0.0], "old"), point(1, vec![1.0, 0.0], "other")],
            )
            .await
            .unwrap();
        store
            .upsert("test", vec![point(0, vec![1.0, 0.0], "new")])
            .await
            .unwrap();

        assert_eq!(store.count("test").await.unwrap(), 2);
        let results = store.search("test", vec![1.0, 0.0], 2).await.unwrap();
        assert_eq!(names(&results), ["new", "other"]);
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_dimension() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        let err = store
            .upsert("test", vec![point(0, vec![1.0], "short")])
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::Dimension { .. }));
        assert_eq!(store.count("test").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn search_missing_collection_errors() {
        let store = InMemoryVectorStore::new();
        let err = store.search("nope", vec![1.0], 3).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Search(_)));
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = InMemoryVectorStore::open(dir.path()).unwrap();
            store.ensure_collection("hr_docs", 2).await.unwrap();
            store
                .upsert(
                    "hr_docs",
                    vec![point(0, vec![1.0, 0.0], "a"), point(1, vec![0.0, 1.0], "b")],
                )
                .await
                .unwrap();
        }

        let reopened = InMemoryVectorStore::open(dir.path()).unwrap();
        assert!(reopened.collection_exists("hr_docs").await.unwrap());
        assert_eq!(reopened.count("hr_docs").await.unwrap(), 2);
        let results = reopened.search("hr_docs", vec![0.0, 1.0], 1).await.unwrap();
        assert_eq!(names(&results), ["b"]);

        reopened
            .upsert("hr_docs", vec![point(1, vec![0.0, 1.0], "b2")])
            .await
            .unwrap();
        assert_eq!(reopened.count("hr_docs").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_collection_removes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryVectorStore::open(dir.path()).unwrap();
        store.ensure_collection("hr_docs", 2).await.unwrap();
        assert!(dir.path().join("hr_docs.json").exists());

        store.delete_collection("hr_docs").await.unwrap();
        assert!(!dir.path().join("hr_docs.json").exists());
        let reopened = InMemoryVectorStore::open(dir.path()).unwrap();
        assert!(!reopened.collection_exists("hr_docs").await.unwrap());
    }

    #[test]
    fn cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &b)).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_similarity_zero_vector() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryVectorStore::new();
        let dbg = format!("{store:?}");
        assert!(dbg.contains("InMemoryVectorStore"));
    }
}
