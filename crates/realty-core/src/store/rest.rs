//! Client for the hosted database's REST gateway (PostgREST conventions).
//!
//! Each table lives at `{url}/rest/v1/{table}`; rows are addressed with
//! `id=eq.{id}` filters and writes ask for the stored representation back.

use std::{marker::PhantomData, time::Duration};

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use super::Repository;
use crate::{
    config::RestConfig,
    error::{RealtyError, Result},
    model::{Record, RecordId},
};

const RETURN_REPRESENTATION: &str = "return=representation";

pub(super) fn build_client(config: &RestConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(RealtyError::from)
}

pub struct RestRepository<T: Record> {
    client: Client,
    table_url: Url,
    api_key: SecretString,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RestRepository<T> {
    pub fn new(client: Client, config: &RestConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| RealtyError::Config("database.rest.api_key is not set".into()))?;
        Ok(Self {
            client,
            table_url: table_url(&config.url, T::TABLE)?,
            api_key,
            _record: PhantomData,
        })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        builder
            .header("apikey", key)
            .bearer_auth(key)
            .header(header::ACCEPT, "application/json")
    }

    fn by_id(&self, builder: RequestBuilder, id: RecordId) -> RequestBuilder {
        builder.query(&[("id", format!("eq.{id}"))])
    }

    async fn rows(&self, response: Response) -> Result<Vec<T>> {
        let response = check(response).await?;
        Ok(response.json::<Vec<T>>().await?)
    }
}

fn table_url(base: &str, table: &str) -> Result<Url> {
    let base = Url::parse(base)
        .map_err(|e| RealtyError::Config(format!("invalid database.rest.url '{base}': {e}")))?;
    base.join(&format!("rest/v1/{table}"))
        .map_err(|e| RealtyError::Config(format!("invalid table url for {table}: {e}")))
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::CONFLICT => Err(RealtyError::Conflict(body)),
        _ => Err(RealtyError::Database(format!("{status}: {body}"))),
    }
}

#[async_trait]
impl<T: Record> Repository<T> for RestRepository<T> {
    async fn list(&self) -> Result<Vec<T>> {
        debug!(table = T::TABLE, "list");
        let response = self
            .request(self.client.get(self.table_url.clone()))
            .query(&[("select", "*")])
            .send()
            .await?;
        self.rows(response).await
    }

    async fn get(&self, id: RecordId) -> Result<Option<T>> {
        debug!(table = T::TABLE, %id, "get");
        let builder = self
            .request(self.client.get(self.table_url.clone()))
            .query(&[("select", "*")]);
        let response = self.by_id(builder, id).send().await?;
        Ok(self.rows(response).await?.into_iter().next())
    }

    async fn insert(&self, record: T) -> Result<T> {
        debug!(table = T::TABLE, id = %record.id(), "insert");
        let response = self
            .request(self.client.post(self.table_url.clone()))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&record)
            .send()
            .await?;
        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RealtyError::Database(format!("insert into {} returned no row", T::TABLE))
            })
    }

    async fn update(&self, record: T) -> Result<T> {
        let id = record.id();
        debug!(table = T::TABLE, %id, "update");
        let builder = self
            .request(self.client.patch(self.table_url.clone()))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&record);
        let response = self.by_id(builder, id).send().await?;
        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RealtyError::not_found(T::ENTITY, id))
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        debug!(table = T::TABLE, %id, "delete");
        let builder = self
            .request(self.client.delete(self.table_url.clone()))
            .header("Prefer", RETURN_REPRESENTATION);
        let response = self.by_id(builder, id).send().await?;
        let deleted = check(response)
            .await?
            .json::<Vec<serde_json::Value>>()
            .await?;
        if deleted.is_empty() {
            return Err(RealtyError::not_found(T::ENTITY, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use axum::{
        extract::{RawQuery, State},
        http::{HeaderMap, Method},
        routing::any,
        Router,
    };
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::model::{ContactSubmission, Destination, Listing, Localized};

    fn config(url: &str, key: Option<&str>) -> RestConfig {
        RestConfig {
            url: url.into(),
            api_key: key.map(|k| SecretString::from(k.to_string())),
            timeout_secs: 5,
        }
    }

    #[test]
    fn builds_table_urls() {
        let cfg = config("https://project.db.example.com", Some("anon"));
        let client = build_client(&cfg).unwrap();
        let listings = RestRepository::<Listing>::new(client.clone(), &cfg).unwrap();
        assert_eq!(
            listings.table_url().as_str(),
            "https://project.db.example.com/rest/v1/listings"
        );
        let contacts = RestRepository::<ContactSubmission>::new(client, &cfg).unwrap();
        assert!(contacts.table_url().path().ends_with("/contact_submissions"));
    }

    #[test]
    fn missing_key_or_bad_url_is_a_config_error() {
        let cfg = config("https://project.db.example.com", None);
        let client = build_client(&cfg).unwrap();
        assert!(matches!(
            RestRepository::<Listing>::new(client.clone(), &cfg),
            Err(RealtyError::Config(_))
        ));
        let cfg = config("not a url", Some("anon"));
        assert!(matches!(
            RestRepository::<Listing>::new(client, &cfg),
            Err(RealtyError::Config(_))
        ));
    }

    #[derive(Debug, Clone)]
    struct Seen {
        method: Method,
        query: String,
        apikey: Option<String>,
        authorization: Option<String>,
        prefer: Option<String>,
        body: String,
    }

    /// Stand-in for the REST gateway: records each request and answers with
    /// the next queued reply.
    #[derive(Clone, Default)]
    struct Gateway {
        seen: Arc<Mutex<Vec<Seen>>>,
        replies: Arc<Mutex<VecDeque<(u16, String)>>>,
    }

    impl Gateway {
        fn reply(&self, status: u16, body: impl Into<String>) {
            self.replies.lock().unwrap().push_back((status, body.into()));
        }

        fn seen(&self) -> Vec<Seen> {
            self.seen.lock().unwrap().clone()
        }
    }

    async fn handle(
        State(gateway): State<Gateway>,
        method: Method,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
        body: String,
    ) -> (axum::http::StatusCode, String) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        gateway.seen.lock().unwrap().push(Seen {
            method,
            query: query.unwrap_or_default(),
            apikey: header("apikey"),
            authorization: header("authorization"),
            prefer: header("prefer"),
            body,
        });
        let (status, body) = gateway
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((500, "no reply queued".into()));
        (axum::http::StatusCode::from_u16(status).unwrap(), body)
    }

    async fn gateway() -> (Gateway, RestRepository<Destination>) {
        let gateway = Gateway::default();
        let router = Router::new()
            .route("/rest/v1/destinations", any(handle))
            .with_state(gateway.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let cfg = config(&format!("http://{addr}"), Some("service-key"));
        let repo = RestRepository::new(build_client(&cfg).unwrap(), &cfg).unwrap();
        (gateway, repo)
    }

    fn destination() -> Destination {
        Destination {
            id: Uuid::new_v4(),
            slug: "giant-mountains".into(),
            name: Localized::new("Giant Mountains", "Krkonoše"),
            description: Localized::default(),
            country: "CZ".into(),
            image: None,
            created_at: Utc::now(),
        }
    }

    fn rows(rows: &[&Destination]) -> String {
        serde_json::to_string(rows).unwrap()
    }

    #[tokio::test]
    async fn reads_send_key_and_id_filter() {
        let (gateway, repo) = gateway().await;
        let row = destination();
        gateway.reply(200, rows(&[&row]));
        gateway.reply(200, rows(&[&row]));
        gateway.reply(200, "[]");

        let listed = repo.list().await.unwrap();
        assert_eq!(listed, vec![row.clone()]);
        assert_eq!(repo.get(row.id).await.unwrap(), Some(row.clone()));
        assert_eq!(repo.get(Uuid::nil()).await.unwrap(), None);

        let seen = gateway.seen();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|s| s.method == Method::GET));
        assert!(seen.iter().all(|s| s.apikey.as_deref() == Some("service-key")));
        assert!(seen
            .iter()
            .all(|s| s.authorization.as_deref() == Some("Bearer service-key")));
        assert_eq!(seen[0].query, "select=*");
        assert_eq!(seen[1].query, format!("select=*&id=eq.{}", row.id));
    }

    #[tokio::test]
    async fn writes_ask_for_the_stored_row() {
        let (gateway, repo) = gateway().await;
        let row = destination();
        gateway.reply(201, rows(&[&row]));
        gateway.reply(200, rows(&[&row]));
        gateway.reply(200, rows(&[&row]));

        assert_eq!(repo.insert(row.clone()).await.unwrap(), row);
        assert_eq!(repo.update(row.clone()).await.unwrap(), row);
        repo.delete(row.id).await.unwrap();

        let seen = gateway.seen();
        let methods: Vec<&Method> = seen.iter().map(|s| &s.method).collect();
        assert_eq!(methods, [&Method::POST, &Method::PATCH, &Method::DELETE]);
        assert!(seen
            .iter()
            .all(|s| s.prefer.as_deref() == Some(RETURN_REPRESENTATION)));
        assert_eq!(seen[0].query, "");
        assert!(seen[0].body.contains("\"giant-mountains\""));
        assert_eq!(seen[1].query, format!("id=eq.{}", row.id));
        assert_eq!(seen[2].query, format!("id=eq.{}", row.id));
    }

    #[tokio::test]
    async fn empty_write_results_are_not_found() {
        let (gateway, repo) = gateway().await;
        let row = destination();
        gateway.reply(200, "[]");
        gateway.reply(200, "[]");

        assert!(matches!(
            repo.update(row.clone()).await,
            Err(RealtyError::NotFound { entity: "Destination", .. })
        ));
        assert!(matches!(
            repo.delete(row.id).await,
            Err(RealtyError::NotFound { entity: "Destination", .. })
        ));
    }

    #[tokio::test]
    async fn error_statuses_map_to_realty_errors() {
        let (gateway, repo) = gateway().await;
        gateway.reply(409, "duplicate key value violates unique constraint");
        gateway.reply(503, "upstream down");

        match repo.insert(destination()).await {
            Err(RealtyError::Conflict(body)) => assert!(body.contains("duplicate key")),
            other => panic!("expected conflict, got {other:?}"),
        }
        match repo.list().await {
            Err(RealtyError::Database(message)) => {
                assert!(message.starts_with("503"));
                assert!(message.contains("upstream down"));
            }
            other => panic!("expected database error, got {other:?}"),
        }
    }
}
