use std::{collections::HashSet, sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::debug;

use crate::{
    dao::{
        models::{ActivityEntity, RoomEntity},
        room_store::{ActivityLog, RoomBackend, RoomStore, UpdateSink},
        storage::StorageResult,
    },
    state::payload::UpdatePayload,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        ACTIVITY_PREFIX, AllDocsResponse, BulkDocsRequest, BulkDocsResult, CouchActivityDocument,
        CouchRoomDocument, DeletedDocument, END_SUFFIX, ROOM_PREFIX, activity_lower_bound,
        room_doc_id,
    },
};

const ALL_DOCS: &str = "_all_docs";
const BULK_DOCS: &str = "_bulk_docs";

/// Room backend storing one CouchDB document per room and per activity entry.
#[derive(Clone)]
pub struct CouchRoomStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchRoomStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let auth = config
            .username
            .zip(config.password)
            .map(|(user, pass)| (Arc::<str>::from(user), Arc::<str>::from(pass)));

        let store = Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            database: Arc::from(config.database),
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some((user, pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.database_url(), path);
        self.authorized(self.client.request(method, url))
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        path: &str,
    ) -> CouchResult<reqwest::Response> {
        builder
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.to_owned(),
                source,
            })
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .send(self.authorized(self.client.get(&url)), &database)
            .await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let created = self
                    .send(self.authorized(self.client.put(&url)), &database)
                    .await?;
                // 412 means another instance created it in the meantime.
                let status = created.status();
                if status.is_success() || status == StatusCode::PRECONDITION_FAILED {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus { database, status })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::GET, doc_id), doc_id).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_owned(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_owned(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .send(self.request(Method::PUT, doc_id).json(document), doc_id)
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path: doc_id.to_owned(),
                status: response.status(),
            })
        }
    }

    /// Rows of `_all_docs` whose ids lie in `[start, end]`.
    async fn all_docs(
        &self,
        start: &str,
        end: &str,
        include_docs: bool,
    ) -> CouchResult<AllDocsResponse> {
        let query = [
            ("include_docs", include_docs.to_string()),
            ("startkey", format!("\"{start}\"")),
            ("endkey", format!("\"{end}\"")),
        ];

        let response = self
            .send(self.request(Method::GET, ALL_DOCS).query(&query), ALL_DOCS)
            .await?;
        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_owned(),
                status: response.status(),
            });
        }

        response
            .json::<AllDocsResponse>()
            .await
            .map_err(|source| CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_owned(),
                source,
            })
    }

    async fn list_documents<T>(&self, start: &str, end: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let payload = self.all_docs(start, end, true).await?;

        let mut documents = Vec::with_capacity(payload.rows.len());
        for row in payload.rows {
            if let Some(doc) = row.doc {
                let parsed = from_value(doc).map_err(|source| CouchDaoError::DeserializeValue {
                    path: row.id,
                    source,
                })?;
                documents.push(parsed);
            }
        }
        Ok(documents)
    }

    async fn bulk_write<T: Serialize>(&self, docs: Vec<T>) -> CouchResult<()> {
        if docs.is_empty() {
            return Ok(());
        }

        let response = self
            .send(
                self.request(Method::POST, BULK_DOCS)
                    .json(&BulkDocsRequest { docs }),
                BULK_DOCS,
            )
            .await?;
        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: BULK_DOCS.to_owned(),
                status: response.status(),
            });
        }

        let results = response
            .json::<Vec<BulkDocsResult>>()
            .await
            .map_err(|source| CouchDaoError::DecodeResponse {
                path: BULK_DOCS.to_owned(),
                source,
            })?;
        let failed = results.iter().filter(|result| result.error.is_some()).count();
        if failed > 0 {
            return Err(CouchDaoError::BulkWrite { failed });
        }
        Ok(())
    }

    async fn activity_documents(
        &self,
        since: Option<SystemTime>,
    ) -> CouchResult<Vec<ActivityEntity>> {
        let start = match since {
            Some(since) => activity_lower_bound(since),
            None => ACTIVITY_PREFIX.to_owned(),
        };
        let end = format!("{ACTIVITY_PREFIX}{END_SUFFIX}");

        let mut entries: Vec<ActivityEntity> = self
            .list_documents::<CouchActivityDocument>(&start, &end)
            .await?
            .into_iter()
            .map(|doc| doc.entry)
            .collect();
        // Ids are chronological; newest first means reversed.
        entries.reverse();
        Ok(entries)
    }

    async fn replace_rooms(&self, rooms: Vec<RoomEntity>) -> CouchResult<()> {
        let end = format!("{ROOM_PREFIX}{END_SUFFIX}");
        let existing = self.all_docs(ROOM_PREFIX, &end, false).await?;

        let mut revisions: Vec<(String, String)> = existing
            .rows
            .into_iter()
            .filter_map(|row| row.value.map(|value| (row.id, value.rev)))
            .collect();

        let kept: HashSet<String> = rooms.iter().map(|room| room_doc_id(&room.room_no)).collect();
        let mut docs: Vec<serde_json::Value> = Vec::with_capacity(rooms.len() + revisions.len());
        for room in rooms {
            let id = room_doc_id(&room.room_no);
            let rev = revisions
                .iter()
                .position(|(existing, _)| *existing == id)
                .map(|index| revisions.swap_remove(index).1);
            docs.push(to_json(CouchRoomDocument::new(room, rev), &id)?);
        }
        for (id, rev) in revisions.into_iter().filter(|(id, _)| !kept.contains(id)) {
            let tombstone = DeletedDocument {
                id: id.clone(),
                rev,
                deleted: true,
            };
            docs.push(to_json(tombstone, &id)?);
        }

        debug!(count = docs.len(), "writing room snapshot to CouchDB");
        self.bulk_write(docs).await
    }

    async fn apply_update(&self, room_no: String, payload: UpdatePayload) -> CouchResult<()> {
        let doc_id = room_doc_id(&room_no);
        let mut document = self
            .get_document::<CouchRoomDocument>(&doc_id)
            .await?
            .ok_or(CouchDaoError::MissingRoom { room_no })?;

        document.room.apply_update(&payload);
        self.put_document(&doc_id, &document).await
    }

    async fn clear_activity(&self) -> CouchResult<u64> {
        let end = format!("{ACTIVITY_PREFIX}{END_SUFFIX}");
        let rows = self.all_docs(ACTIVITY_PREFIX, &end, false).await?.rows;

        let tombstones: Vec<DeletedDocument> = rows
            .into_iter()
            .filter_map(|row| {
                row.value.map(|value| DeletedDocument {
                    id: row.id,
                    rev: value.rev,
                    deleted: true,
                })
            })
            .collect();
        let removed = tombstones.len() as u64;
        self.bulk_write(tombstones).await?;
        Ok(removed)
    }
}

fn to_json(document: impl Serialize, id: &str) -> CouchResult<serde_json::Value> {
    serde_json::to_value(document).map_err(|source| CouchDaoError::EncodeDocument {
        path: id.to_owned(),
        source,
    })
}

impl RoomStore for CouchRoomStore {
    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let end = format!("{ROOM_PREFIX}{END_SUFFIX}");
            let docs = store
                .list_documents::<CouchRoomDocument>(ROOM_PREFIX, &end)
                .await?;
            Ok(docs.into_iter().map(|doc| doc.room).collect())
        })
    }

    fn find_room(&self, room_no: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = store
                .get_document::<CouchRoomDocument>(&room_doc_id(&room_no))
                .await?;
            Ok(doc.map(|doc| doc.room))
        })
    }

    fn replace_rooms(&self, rooms: Vec<RoomEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.replace_rooms(rooms).await.map_err(Into::into) })
    }
}

impl UpdateSink for CouchRoomStore {
    fn apply_update(
        &self,
        room_no: String,
        payload: UpdatePayload,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.apply_update(room_no, payload).await.map_err(Into::into) })
    }
}

impl ActivityLog for CouchRoomStore {
    fn append_activity(&self, entry: ActivityEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let document = CouchActivityDocument::from(entry);
            store
                .put_document(&document.id, &document)
                .await
                .map_err(Into::into)
        })
    }

    fn list_activity_since(
        &self,
        since: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut entries = store.activity_documents(Some(since)).await?;
            entries.retain(|entry| entry.timestamp >= since);
            Ok(entries)
        })
    }

    fn list_room_activity(
        &self,
        room_no: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let entries = store.activity_documents(None).await?;
            Ok(entries
                .into_iter()
                .filter(|entry| entry.room_no == room_no)
                .take(limit)
                .collect())
        })
    }

    fn clear_activity(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.clear_activity().await.map_err(Into::into) })
    }
}

impl RoomBackend for CouchRoomStore {
    fn backend_name(&self) -> &'static str {
        "couchdb"
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .send(store.authorized(store.client.get(&url)), &url)
                .await?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
