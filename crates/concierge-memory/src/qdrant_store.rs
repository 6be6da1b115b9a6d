//! Qdrant-backed [`VectorStore`] for deployments with an external index server.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, ScoredPoint,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder, point_id::PointIdOptions,
    value::Kind,
};

use crate::vector_store::{
    BoxFuture, ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError,
};

type QdrantResult<T> = Result<T, Box<qdrant_client::QdrantError>>;

/// Thin wrapper over the [`Qdrant`] client.
#[derive(Clone)]
pub struct QdrantStore {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantStore").finish_non_exhaustive()
    }
}

impl QdrantStore {
    /// Create a new `QdrantStore` connected to the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn new(url: &str) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    async fn create_if_missing(&self, collection: &str, vector_size: u64) -> QdrantResult<()> {
        if self
            .client
            .collection_exists(collection)
            .await
            .map_err(Box::new)?
        {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
            )
            .await
            .map_err(Box::new)?;
        tracing::info!(collection, vector_size, "created Qdrant collection");
        Ok(())
    }
}

fn to_point(p: VectorPoint) -> Result<PointStruct, VectorStoreError> {
    let payload: HashMap<String, qdrant_client::qdrant::Value> =
        serde_json::from_value(serde_json::Value::Object(p.payload.into_iter().collect()))
            .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
    Ok(PointStruct::new(p.id, p.vector, payload))
}

fn from_scored(point: ScoredPoint) -> ScoredVectorPoint {
    let payload: HashMap<String, serde_json::Value> = point
        .payload
        .into_iter()
        .filter_map(|(k, v)| {
            let json_val = match v.kind? {
                Kind::StringValue(s) => serde_json::Value::String(s),
                Kind::IntegerValue(i) => serde_json::Value::Number(i.into()),
                Kind::DoubleValue(d) => {
                    serde_json::Number::from_f64(d).map(serde_json::Value::Number)?
                }
                Kind::BoolValue(b) => serde_json::Value::Bool(b),
                _ => return None,
            };
            Some((k, json_val))
        })
        .collect();

    let id = match point.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Num(n)) => n,
        Some(PointIdOptions::Uuid(_)) | None => u64::MAX,
    };

    ScoredVectorPoint {
        id,
        score: point.score,
        payload,
    }
}

/// Qdrant orders by score only; sequential ids stand in for insertion order on ties.
fn order_results(points: &mut [ScoredVectorPoint]) {
    points.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
}

impl VectorStore for QdrantStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.create_if_missing(&collection, vector_size)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))
        })
    }

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.client
                .collection_exists(collection.as_str())
                .await
                .map_err(|e| VectorStoreError::Connection(e.to_string()))
        })
    }

    fn delete_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.client
                .delete_collection(collection.as_str())
                .await
                .map_err(|e| VectorStoreError::Delete(e.to_string()))?;
            Ok(())
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let points = points
                .into_iter()
                .map(to_point)
                .collect::<Result<Vec<_>, _>>()?;
            self.client
                .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
                .await
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            Ok(())
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
            if limit == 0 {
                return Ok(Vec::new());
            }
            let builder = SearchPointsBuilder::new(collection, vector, limit).with_payload(true);
            let response = self
                .client
                .search_points(builder)
                .await
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            let mut points: Vec<_> = response.result.into_iter().map(from_scored).collect();
            order_results(&mut points);
            Ok(points)
        })
    }

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let response = self
                .client
                .count(CountPointsBuilder::new(collection).exact(true))
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            Ok(response.result.map_or(0, |r| r.count))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_valid_url() {
        assert!(QdrantStore::new("http://localhost:6334").is_ok());
    }

    #[test]
    fn debug_format() {
        let store = QdrantStore::new("http://localhost:6334").unwrap();
        assert!(format!("{store:?}").contains("QdrantStore"));
    }

    #[test]
    fn to_point_keeps_numeric_id_and_payload() {
        let point = to_point(VectorPoint {
            id: 42,
            vector: vec![0.5, 0.5],
            payload: HashMap::from([("heading".into(), serde_json::json!("## Leave"))]),
        })
        .unwrap();
        let id = point.id.and_then(|p| p.point_id_options);
        assert!(matches!(id, Some(PointIdOptions::Num(42))));
        assert!(point.payload.contains_key("heading"));
    }

    #[test]
    fn ties_ordered_by_id() {
        let mk = |id, score| ScoredVectorPoint {
            id,
            score,
            payload: HashMap::new(),
        };
        let mut points = vec![mk(4, 0.5), mk(1, 0.9), mk(2, 0.5)];
        order_results(&mut points);
        let ids: Vec<u64> = points.iter().map(|p| p.id).collect();
        assert_eq!(ids, [1, 2, 4]);
    }
}
