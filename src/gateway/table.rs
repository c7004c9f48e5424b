use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Gateway;
use crate::error::{AppError, AppResult};

/// Builder for one table operation: equality and set-membership filters,
/// descending ordering, and a row limit, applied to a select, insert,
/// update, or delete.
pub struct Query<'g> {
    gateway: &'g Gateway,
    table: &'static str,
    columns: &'static str,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<u32>,
}

impl<'g> Query<'g> {
    pub(super) fn new(gateway: &'g Gateway, table: &'static str) -> Self {
        Self {
            gateway,
            table,
            columns: "*",
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &'static str) -> Self {
        self.columns = columns;
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    pub fn is_in(mut self, column: &str, values: &[String]) -> Self {
        self.filters
            .push((column.to_string(), format!("in.({})", values.join(","))));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(format!("{column}.desc"));
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.to_string())];
        params.extend(self.filters.iter().cloned());
        if let Some(ref order) = self.order {
            params.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    fn url(&self) -> String {
        self.gateway.endpoint(&format!("rest/v1/{}", self.table))
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = AppError::from_table_response(status.as_u16(), &body);
            tracing::debug!(table = self.table, %status, "table call failed: {err}");
            return Err(err);
        }
        Ok(response)
    }

    /// Fetch all matching rows.
    pub async fn select<T: DeserializeOwned>(self) -> AppResult<Vec<T>> {
        let builder = self
            .gateway
            .request(Method::GET, &self.url())
            .query(&self.params());
        let response = self.execute(builder).await?;
        Ok(response.json().await?)
    }

    /// Fetch exactly one row; an empty result is NotFound, distinct from a
    /// transport failure.
    pub async fn select_one<T: DeserializeOwned>(self) -> AppResult<T> {
        let mut rows = self.limit(1).select().await?;
        rows.pop().ok_or(AppError::NotFound)
    }

    /// Insert a row and return the stored representation.
    pub async fn insert<T: DeserializeOwned>(self, row: &impl Serialize) -> AppResult<T> {
        let builder = self
            .gateway
            .request(Method::POST, &self.url())
            .header("Prefer", "return=representation")
            .query(&[("select", self.columns)])
            .json(row);
        let response = self.execute(builder).await?;
        let mut rows: Vec<T> = response.json().await?;
        rows.pop()
            .ok_or_else(|| AppError::Internal("insert returned no row".into()))
    }

    /// Insert a row, silently ignoring a duplicate key. Safe to race; used
    /// for the lazy profile create.
    pub async fn upsert_ignore_duplicates(self, row: &impl Serialize) -> AppResult<()> {
        let builder = self
            .gateway
            .request(Method::POST, &self.url())
            .header("Prefer", "resolution=ignore-duplicates")
            .json(row);
        self.execute(builder).await?;
        Ok(())
    }

    /// Update the matching rows and return the first stored representation.
    pub async fn update<T: DeserializeOwned>(self, patch: &impl Serialize) -> AppResult<T> {
        let builder = self
            .gateway
            .request(Method::PATCH, &self.url())
            .header("Prefer", "return=representation")
            .query(&self.params())
            .json(patch);
        let response = self.execute(builder).await?;
        let mut rows: Vec<T> = response.json().await?;
        rows.pop().ok_or(AppError::NotFound)
    }

    /// Delete the matching rows.
    pub async fn delete(self) -> AppResult<()> {
        let builder = self
            .gateway
            .request(Method::DELETE, &self.url())
            .query(&self.params());
        self.execute(builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> Gateway {
        Gateway::new("https://demo.example.co", "key").unwrap()
    }

    #[test]
    fn params_default_to_select_star() {
        let gw = gateway();
        let q = gw.from("posts");
        assert_eq!(q.params(), vec![("select".to_string(), "*".to_string())]);
    }

    #[test]
    fn eq_filter_uses_postgrest_syntax() {
        let gw = gateway();
        let q = gw.from("posts").eq("id", "abc-123");
        assert!(q
            .params()
            .contains(&("id".to_string(), "eq.abc-123".to_string())));
    }

    #[test]
    fn in_filter_joins_values_once() {
        let gw = gateway();
        let ids = vec!["a".to_string(), "b".to_string()];
        let q = gw.from("users").is_in("id", &ids);
        assert!(q
            .params()
            .contains(&("id".to_string(), "in.(a,b)".to_string())));
    }

    #[test]
    fn order_and_limit_are_appended() {
        let gw = gateway();
        let q = gw.from("comments").order_desc("created_at").limit(5);
        let params = q.params();
        assert!(params.contains(&("order".to_string(), "created_at.desc".to_string())));
        assert!(params.contains(&("limit".to_string(), "5".to_string())));
    }

    #[test]
    fn url_targets_rest_namespace() {
        let gw = gateway();
        let q = gw.from("posts");
        assert_eq!(q.url(), "https://demo.example.co/rest/v1/posts");
    }
}
