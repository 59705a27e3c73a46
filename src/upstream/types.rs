use serde::{Deserialize, Deserializer, Serialize};

/// Decode an absent or `null` field as the type's empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A dashboard as listed by the upstream and as persisted to disk.
///
/// Decoded from the list endpoint with `cells` populated. Once its cells have
/// been resolved the pipeline clears `cells` and fills `query_texts`, so the
/// written artifact carries only `id`, `name` and `queries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Upstream dashboard identifier, also the artifact file stem
    pub id: String,
    /// Human readable dashboard name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Cells referenced by the dashboard, cleared after processing
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cells: Vec<Cell>,
    /// Query texts gathered from all successfully fetched cells
    #[serde(default, deserialize_with = "null_as_default", rename = "queries")]
    pub query_texts: Vec<String>,
}

impl Dashboard {
    /// Replace the dashboard's cells with the queries extracted from them.
    pub fn resolve_queries(&mut self, queries: Vec<String>) {
        self.cells.clear();
        self.query_texts = queries;
    }
}

/// A dashboard cell, known only by the link to its detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: CellLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellLinks {
    /// Path of the cell view, relative to the upstream base URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub view: String,
}

impl Cell {
    pub fn view_link(&self) -> &str {
        &self.links.view
    }
}

/// Response body of `GET /api/v2/dashboards`.
#[derive(Debug, Deserialize)]
pub(super) struct DashboardsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dashboards: Vec<Dashboard>,
}

/// Response body of a cell view.
#[derive(Debug, Deserialize)]
pub(super) struct CellViewResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: CellProperties,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct CellProperties {
    #[serde(default, deserialize_with = "null_as_default")]
    pub queries: Vec<CellQuery>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CellQuery {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl CellViewResponse {
    pub fn into_query_texts(self) -> Vec<String> {
        self.properties
            .queries
            .into_iter()
            .map(|query| query.text)
            .collect()
    }
}
