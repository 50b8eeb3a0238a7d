use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{DateTime, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoActivityDocument, MongoRoomDocument},
};
use crate::{
    dao::{
        models::{ActivityEntity, RoomEntity},
        room_store::{ActivityLog, RoomBackend, RoomStore, UpdateSink},
        storage::StorageResult,
    },
    state::payload::UpdatePayload,
};

const ROOM_COLLECTION_NAME: &str = "rooms";
const ACTIVITY_COLLECTION_NAME: &str = "activity_logs";

/// Room backend keeping rooms and activity entries in two MongoDB collections.
#[derive(Clone)]
pub struct MongoRoomStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.state.read().await.database.clone();
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoRoomStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let store = Self {
            inner: Arc::new(MongoInner {
                state: RwLock::new(MongoState { client, database }),
                config,
            }),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let activity = self.activity_collection().await;
        let indexes = [
            (doc! { "timestamp": -1 }, "activity_timestamp_idx", "timestamp"),
            (
                doc! { "room_no": 1, "timestamp": -1 },
                "activity_room_idx",
                "room_no,timestamp",
            ),
        ];

        for (keys, name, index) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(Some(name.to_owned())).build())
                .build();
            activity
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: ACTIVITY_COLLECTION_NAME,
                    index,
                    source,
                })?;
        }
        Ok(())
    }

    async fn database(&self) -> Database {
        self.inner.state.read().await.database.clone()
    }

    async fn room_collection(&self) -> Collection<MongoRoomDocument> {
        self.database().await.collection(ROOM_COLLECTION_NAME)
    }

    async fn activity_collection(&self) -> Collection<MongoActivityDocument> {
        self.database().await.collection(ACTIVITY_COLLECTION_NAME)
    }

    async fn list_rooms(&self) -> MongoResult<Vec<RoomEntity>> {
        let documents: Vec<MongoRoomDocument> = self
            .room_collection()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::LoadRooms { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadRooms { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_room(&self, room_no: String) -> MongoResult<Option<RoomEntity>> {
        let document = self
            .room_collection()
            .await
            .find_one(doc! { "_id": room_no.as_str() })
            .await
            .map_err(|source| MongoDaoError::LoadRooms { source })?;
        Ok(document.map(Into::into))
    }

    async fn replace_rooms(&self, rooms: Vec<RoomEntity>) -> MongoResult<()> {
        let collection = self.room_collection().await;
        collection
            .delete_many(doc! {})
            .await
            .map_err(|source| MongoDaoError::ReplaceRooms { source })?;

        if rooms.is_empty() {
            return Ok(());
        }
        let documents: Vec<MongoRoomDocument> = rooms.into_iter().map(Into::into).collect();
        collection
            .insert_many(documents)
            .await
            .map_err(|source| MongoDaoError::ReplaceRooms { source })?;
        Ok(())
    }

    async fn apply_update(&self, room_no: String, payload: UpdatePayload) -> MongoResult<()> {
        let mut entity = self
            .find_room(room_no.clone())
            .await?
            .ok_or_else(|| MongoDaoError::MissingRoom {
                room_no: room_no.clone(),
            })?;
        entity.apply_update(&payload);

        let document: MongoRoomDocument = entity.into();
        let result = self
            .room_collection()
            .await
            .replace_one(doc! { "_id": room_no.as_str() }, &document)
            .await
            .map_err(|source| MongoDaoError::SaveRoom {
                room_no: room_no.clone(),
                source,
            })?;

        if result.matched_count == 0 {
            return Err(MongoDaoError::MissingRoom { room_no });
        }
        Ok(())
    }

    async fn append_activity(&self, entry: ActivityEntity) -> MongoResult<()> {
        let document: MongoActivityDocument = entry.into();
        self.activity_collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::Activity { source })?;
        Ok(())
    }

    async fn query_activity(
        &self,
        filter: mongodb::bson::Document,
        limit: Option<i64>,
    ) -> MongoResult<Vec<ActivityEntity>> {
        let collection = self.activity_collection().await;
        let mut find = collection.find(filter).sort(doc! { "timestamp": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit);
        }

        let documents: Vec<MongoActivityDocument> = find
            .await
            .map_err(|source| MongoDaoError::Activity { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Activity { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn clear_activity(&self) -> MongoResult<u64> {
        let result = self
            .activity_collection()
            .await
            .delete_many(doc! {})
            .await
            .map_err(|source| MongoDaoError::Activity { source })?;
        Ok(result.deleted_count)
    }
}

impl RoomStore for MongoRoomStore {
    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_rooms().await.map_err(Into::into) })
    }

    fn find_room(&self, room_no: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_room(room_no).await.map_err(Into::into) })
    }

    fn replace_rooms(&self, rooms: Vec<RoomEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.replace_rooms(rooms).await.map_err(Into::into) })
    }
}

impl UpdateSink for MongoRoomStore {
    fn apply_update(
        &self,
        room_no: String,
        payload: UpdatePayload,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.apply_update(room_no, payload).await.map_err(Into::into) })
    }
}

impl ActivityLog for MongoRoomStore {
    fn append_activity(&self, entry: ActivityEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_activity(entry).await.map_err(Into::into) })
    }

    fn list_activity_since(
        &self,
        since: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let filter = doc! { "timestamp": { "$gte": DateTime::from_system_time(since) } };
            store.query_activity(filter, None).await.map_err(Into::into)
        })
    }

    fn list_room_activity(
        &self,
        room_no: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            store
                .query_activity(doc! { "room_no": room_no }, Some(limit))
                .await
                .map_err(Into::into)
        })
    }

    fn clear_activity(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.clear_activity().await.map_err(Into::into) })
    }
}

impl RoomBackend for MongoRoomStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
