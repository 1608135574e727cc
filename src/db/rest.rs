//! HTTP client for the hosted store's PostgREST-style query interface.
//!
//! Every operation is one request against `{url}/rest/v1/{table}`,
//! authenticated with the access key as both `apikey` header and bearer
//! token. Timeouts are whatever the transport defaults to; this layer
//! defines none of its own.

use reqwest::Method;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::IntakeError;

use super::store::{Embed, Row, SelectQuery, TableStore};

pub struct RestStore {
    base_url: String,
    key: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, IntakeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| IntakeError::store("building HTTP client", e.to_string()))?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            key: config.key.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }
}

/// Send a request and surface transport and HTTP-status failures as store
/// errors tagged with the operation context.
async fn execute(
    request: reqwest::RequestBuilder,
    context: &str,
) -> Result<reqwest::Response, IntakeError> {
    let response = request.send().await.map_err(|e| {
        if e.is_connect() {
            IntakeError::store(context, "could not connect to the store endpoint")
        } else if e.is_timeout() {
            IntakeError::store(context, "request timed out")
        } else {
            IntakeError::store(context, e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(IntakeError::store(context, format!("HTTP {status}: {body}")));
    }
    Ok(response)
}

async fn rows_from(response: reqwest::Response, context: &str) -> Result<Vec<Value>, IntakeError> {
    response
        .json()
        .await
        .map_err(|e| IntakeError::store(context, format!("invalid response body: {e}")))
}

/// Render the `select=` expression, including nested embeds.
fn select_expr(embeds: &[Embed]) -> String {
    if embeds.is_empty() {
        return "*".to_string();
    }
    let mut parts = vec!["*".to_string()];
    parts.extend(embeds.iter().map(embed_expr));
    parts.join(",")
}

fn embed_expr(embed: &Embed) -> String {
    let mut inner: Vec<String> = if embed.columns.is_empty() {
        vec!["*".to_string()]
    } else {
        embed.columns.clone()
    };
    inner.extend(embed.embed.iter().map(embed_expr));
    format!("{}({})", embed.table, inner.join(","))
}

/// Render the `or=` parameter for a multi-column ilike substring match.
fn search_expr(columns: &[String], term: &str) -> String {
    let clauses: Vec<String> = columns
        .iter()
        .map(|column| format!("{column}.ilike.*{term}*"))
        .collect();
    format!("({})", clauses.join(","))
}

fn query_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), select_expr(&query.embed))];
    for (column, value) in &query.eq {
        params.push((column.clone(), format!("eq.{value}")));
    }
    if let Some((columns, term)) = &query.search {
        params.push(("or".to_string(), search_expr(columns, term)));
    }
    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    params
}

impl TableStore for RestStore {
    async fn insert(&self, table: &str, row: Row) -> Result<Value, IntakeError> {
        let context = format!("insert into {table}");
        let response = execute(
            self.request(Method::POST, table)
                .header("Prefer", "return=representation")
                .json(&row),
            &context,
        )
        .await?;
        let mut rows = rows_from(response, &context).await?;
        if rows.is_empty() {
            return Err(IntakeError::store(&context, "store returned no row"));
        }
        Ok(rows.remove(0))
    }

    async fn upsert(
        &self,
        table: &str,
        row: Row,
        on_conflict: &[&str],
    ) -> Result<(), IntakeError> {
        let context = format!("upsert into {table}");
        execute(
            self.request(Method::POST, table)
                .query(&[("on_conflict", on_conflict.join(","))])
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&row),
            &context,
        )
        .await?;
        Ok(())
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, IntakeError> {
        let context = format!("select from {table}");
        let response = execute(
            self.request(Method::GET, table).query(&query_params(query)),
            &context,
        )
        .await?;
        rows_from(response, &context).await
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<Value, IntakeError> {
        let context = format!("update {table}");
        let response = execute(
            self.request(Method::PATCH, table)
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=representation")
                .json(&patch),
            &context,
        )
        .await?;
        let mut rows = rows_from(response, &context).await?;
        if rows.is_empty() {
            return Err(IntakeError::not_found(table, id));
        }
        Ok(rows.remove(0))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), IntakeError> {
        let context = format!("delete from {table}");
        execute(
            self.request(Method::DELETE, table).query(&[("id", format!("eq.{id}"))]),
            &context,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{ASSESSMENTS, DOCTORS};

    #[test]
    fn select_expr_defaults_to_star() {
        assert_eq!(select_expr(&[]), "*");
    }

    #[test]
    fn select_expr_renders_nested_embeds() {
        let embed = Embed::children(ASSESSMENTS, "patient_id")
            .nest(Embed::parent(DOCTORS, "doctor_id").columns(&["full_name", "specialization"]));
        assert_eq!(
            select_expr(&[embed]),
            "*,patient_assessments(*,doctors(full_name,specialization))"
        );
    }

    #[test]
    fn search_expr_builds_the_or_clause() {
        let columns = vec!["name".to_string(), "contact".to_string()];
        assert_eq!(
            search_expr(&columns, "jane"),
            "(name.ilike.*jane*,contact.ilike.*jane*)"
        );
    }

    #[test]
    fn query_params_cover_filters_search_and_order() {
        let query = SelectQuery::new()
            .eq("id", "abc")
            .search(&["name", "contact"], "jane")
            .order_desc("created_at");
        let params = query_params(&query);
        assert_eq!(params[0], ("select".to_string(), "*".to_string()));
        assert!(params.contains(&("id".to_string(), "eq.abc".to_string())));
        assert!(params.contains(&(
            "or".to_string(),
            "(name.ilike.*jane*,contact.ilike.*jane*)".to_string()
        )));
        assert!(params.contains(&("order".to_string(), "created_at.desc".to_string())));
    }

    #[test]
    fn table_url_joins_base_and_table() {
        let config = StoreConfig::new("https://db.example.com/", "anon-key").unwrap();
        let store = RestStore::new(&config).unwrap();
        assert_eq!(
            store.table_url("patients"),
            "https://db.example.com/rest/v1/patients"
        );
    }
}
