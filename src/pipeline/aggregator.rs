use futures::future::join_all;
use log::{debug, warn};

use crate::upstream::{ApiClient, Dashboard};

/// Queries collected from the cells of one dashboard.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CellQueries {
    pub queries: Vec<String>,
    pub failed_cells: usize,
}

/// Fetch every cell of `dashboard` concurrently and merge their query texts.
///
/// All cell requests are issued at once and joined before collecting, so the
/// result follows cell order. A cell that fails to fetch is logged and left
/// out; it never aborts the dashboard.
pub async fn aggregate_queries(client: &ApiClient, dashboard: &Dashboard) -> CellQueries {
    let fetches = dashboard.cells.iter().map(|cell| async move {
        let result = client.fetch_cell_queries(cell).await;
        (cell, result)
    });

    let results = join_all(fetches).await;

    let mut collected = CellQueries::default();
    for (cell, result) in results {
        match result {
            Ok(queries) => collected.queries.extend(queries),
            Err(e) => {
                warn!(
                    "Failed to get cell queries for {:?} on dashboard {:?}: {e}",
                    cell.view_link(),
                    dashboard.id
                );
                collected.failed_cells += 1;
            }
        }
    }

    debug!(
        "Dashboard {:?}: {} queries from {} cells",
        dashboard.id,
        collected.queries.len(),
        dashboard.cells.len()
    );

    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Settings};
    use crate::upstream::types::CellLinks;
    use crate::upstream::Cell;

    fn client_for(url: &str) -> ApiClient {
        let config = Config::resolve(Settings {
            upstream: Some(url.to_string()),
            cookie: Some("session=abc".to_string()),
            ..Settings::default()
        })
        .unwrap();
        ApiClient::new(&config).unwrap()
    }

    fn dashboard_with_cells(views: &[&str]) -> Dashboard {
        Dashboard {
            id: "d1".to_string(),
            name: "A".to_string(),
            cells: views
                .iter()
                .map(|view| Cell {
                    links: CellLinks {
                        view: (*view).to_string(),
                    },
                })
                .collect(),
            query_texts: vec![],
        }
    }

    #[tokio::test]
    async fn test_aggregate_merges_all_cells() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/c1")
            .with_body(r#"{"properties":{"queries":[{"text":"SELECT 1"}]}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/c2")
            .with_body(r#"{"properties":{"queries":[{"text":"SELECT 2"},{"text":"SELECT 3"}]}}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let collected = aggregate_queries(&client, &dashboard_with_cells(&["/c1", "/c2"])).await;

        assert_eq!(collected.queries, vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
        assert_eq!(collected.failed_cells, 0);
    }

    #[tokio::test]
    async fn test_aggregate_skips_failed_cells() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ok")
            .with_body(r#"{"properties":{"queries":[{"text":"SELECT ok"}]}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/broken")
            .with_body("not json")
            .create_async()
            .await;
        server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let collected =
            aggregate_queries(&client, &dashboard_with_cells(&["/broken", "/ok", "/gone"])).await;

        assert_eq!(collected.queries, vec!["SELECT ok"]);
        assert_eq!(collected.failed_cells, 2);
    }

    #[tokio::test]
    async fn test_aggregate_null_queries_is_not_a_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/markdown")
            .with_body(r#"{"properties":{"queries":null}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/graph")
            .with_body(r#"{"properties":{"queries":[{"text":"SELECT 1"}]}}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let collected =
            aggregate_queries(&client, &dashboard_with_cells(&["/markdown", "/graph"])).await;

        assert_eq!(collected.queries, vec!["SELECT 1"]);
        assert_eq!(collected.failed_cells, 0);
    }

    #[tokio::test]
    async fn test_aggregate_without_cells() {
        let client = client_for("http://127.0.0.1:1");
        let collected = aggregate_queries(&client, &dashboard_with_cells(&[])).await;

        assert_eq!(collected, CellQueries::default());
    }
}
