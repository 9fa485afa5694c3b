//! Unit tests for scan orchestration

#[cfg(test)]
mod tests {
    use crate::config::InventoryMode;
    use crate::error::ScannerError;
    use crate::poller::ClusterSource;
    use crate::scanner::Scanner;
    use async_trait::async_trait;
    use discovery::{NamespaceEntity, Scope, WorkloadEntity, WorkloadKind};
    use extractor::ExtractContext;
    use inventory_client::{ChangeType, EventAction, MockInventoryClient, ScanState};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    const CONFIGURATION: &str = "cfg-1";

    /// Fixed cluster contents, or a listing failure.
    struct FakeCluster {
        workloads: Vec<(&'static str, &'static str)>,
        namespaces: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl ClusterSource for FakeCluster {
        async fn workloads(&self, ctx: &ExtractContext) -> Result<Vec<WorkloadEntity>, ScannerError> {
            if self.fail {
                return Err(ScannerError::InvalidConfig("cluster unreachable".to_string()));
            }
            Ok(self
                .workloads
                .iter()
                .map(|(name, image)| WorkloadEntity {
                    name: (*name).to_string(),
                    kind: WorkloadKind::Deployment,
                    namespace: "default".to_string(),
                    cluster: ctx.cluster.clone(),
                    containers: vec![discovery::ContainerInfo {
                        name: "main".to_string(),
                        image: (*image).to_string(),
                        requests: BTreeMap::new(),
                        limits: BTreeMap::new(),
                    }],
                    replicas: Some(1),
                    ready_replicas: Some(1),
                    service_name: None,
                    schedule: None,
                    labels: BTreeMap::new(),
                    update_strategy: None,
                    observed_at: Some(ctx.observed_at.clone()),
                })
                .collect())
        }

        async fn namespaces(&self, ctx: &ExtractContext) -> Result<Vec<NamespaceEntity>, ScannerError> {
            if self.fail {
                return Err(ScannerError::InvalidConfig("cluster unreachable".to_string()));
            }
            Ok(self
                .namespaces
                .iter()
                .map(|name| NamespaceEntity {
                    name: (*name).to_string(),
                    cluster: ctx.cluster.clone(),
                    labels: BTreeMap::new(),
                    phase: Some("Active".to_string()),
                    observed_at: Some(ctx.observed_at.clone()),
                })
                .collect())
        }
    }

    fn cluster(workloads: Vec<(&'static str, &'static str)>) -> FakeCluster {
        FakeCluster {
            workloads,
            namespaces: vec!["default", "kube-system"],
            fail: false,
        }
    }

    fn scanner(source: FakeCluster, mock: &MockInventoryClient, mode: InventoryMode) -> Scanner {
        Scanner::new(
            Arc::new(source),
            Arc::new(mock.clone()),
            Scope::new("ws-1", CONFIGURATION),
            "prod".to_string(),
            mode,
        )
    }

    fn states(mock: &MockInventoryClient) -> Vec<ScanState> {
        mock.posted_statuses()
            .unwrap()
            .into_iter()
            .map(|s| s.state)
            .collect()
    }

    #[tokio::test]
    async fn test_first_scan_reports_everything_created() {
        let mock = MockInventoryClient::new("http://inventory.test");
        let scanner = scanner(cluster(vec![("api", "nginx:1.25"), ("worker", "app:2")]), &mock, InventoryMode::Workloads);

        let summary = scanner.run_once().await.unwrap();

        assert_eq!(summary.created, 2);
        assert!(summary.sent);
        let batches = mock.posted_batches().unwrap();
        assert_eq!(batches.len(), 1);
        assert!(batches[0]
            .iter()
            .all(|e| e.properties.action == Some(EventAction::Created)));
        assert_eq!(states(&mock), vec![ScanState::Running, ScanState::Succeeded]);
    }

    #[tokio::test]
    async fn test_rescan_against_own_output_sends_nothing() {
        let mock = MockInventoryClient::new("http://inventory.test");
        let scanner = scanner(cluster(vec![("api", "nginx:1.25")]), &mock, InventoryMode::Workloads);

        scanner.run_once().await.unwrap();
        let first = mock.posted_batches().unwrap().remove(0);
        mock.set_previous_events(CONFIGURATION, first);

        // observedAt differs between the scans and must not count as a change
        let summary = scanner.run_once().await.unwrap();

        assert_eq!(summary.unchanged, 1);
        assert!(!summary.sent);
        assert_eq!(mock.batch_post_count(), 1);
    }

    #[tokio::test]
    async fn test_source_failure_reports_failed_status() {
        let mock = MockInventoryClient::new("http://inventory.test");
        let source = FakeCluster {
            workloads: Vec::new(),
            namespaces: Vec::new(),
            fail: true,
        };
        let scanner = scanner(source, &mock, InventoryMode::Workloads);

        let result = scanner.run_once().await;

        assert!(matches!(result, Err(ScannerError::InvalidConfig(_))));
        assert_eq!(mock.batch_post_count(), 0);
        let statuses = mock.posted_statuses().unwrap();
        assert_eq!(statuses.last().map(|s| s.state), Some(ScanState::Failed));
        assert!(statuses
            .last()
            .and_then(|s| s.message.as_deref())
            .is_some_and(|m| m.contains("cluster unreachable")));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_before_posting() {
        let mock = MockInventoryClient::new("http://inventory.test");
        mock.fail_fetches("inventory down");
        let scanner = scanner(cluster(vec![("api", "nginx:1.25")]), &mock, InventoryMode::Workloads);

        let result = scanner.run_once().await;

        assert!(matches!(result, Err(ScannerError::Discovery(_))));
        assert_eq!(mock.batch_post_count(), 0);
        assert_eq!(states(&mock), vec![ScanState::Running, ScanState::Failed]);
    }

    #[tokio::test]
    async fn test_status_failure_does_not_fail_scan() {
        let mock = MockInventoryClient::new("http://inventory.test");
        mock.fail_status_posts("status endpoint down");
        let scanner = scanner(cluster(vec![("api", "nginx:1.25")]), &mock, InventoryMode::Workloads);

        let summary = scanner.run_once().await.unwrap();

        assert_eq!(summary.created, 1);
        assert_eq!(mock.batch_post_count(), 1);
    }

    #[tokio::test]
    async fn test_namespace_mode_sends_snapshot() {
        let mock = MockInventoryClient::new("http://inventory.test");
        let scanner = scanner(cluster(Vec::new()), &mock, InventoryMode::Namespaces);

        let summary = scanner.run_once().await.unwrap();

        assert_eq!(summary.reported, 2);
        let batch = mock.posted_batches().unwrap().remove(0);
        assert_eq!(batch.len(), 2);
        for event in &batch {
            assert_eq!(event.properties.change_type, ChangeType::State);
            assert_eq!(event.properties.class, "namespace");
            assert_eq!(event.properties.action, None);
        }
    }

    #[tokio::test]
    async fn test_single_run_mode() {
        let mock = MockInventoryClient::new("http://inventory.test");
        let scanner = scanner(cluster(vec![("api", "nginx:1.25")]), &mock, InventoryMode::Workloads);

        scanner.run(None).await.unwrap();

        assert_eq!(mock.batch_post_count(), 1);
    }
}
