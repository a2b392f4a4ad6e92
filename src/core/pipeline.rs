use crate::core::layout::layout;
use crate::core::{AssessmentRecord, ConfigProvider, Pipeline, Scene, SceneFile, Storage};
use crate::utils::error::{Result, StackError};
use chrono::Utc;
use reqwest::Client;

pub struct StackPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> StackPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for StackPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<AssessmentRecord>> {
        tracing::debug!(
            "Requesting assessment records from: {}",
            self.config.api_endpoint()
        );
        let response = self.client.get(self.config.api_endpoint()).send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(StackError::ProcessingError {
                message: format!("API request failed with status {}", response.status()),
            });
        }

        let records: Vec<AssessmentRecord> = response.json().await?;

        // The fetch happens once per run; an empty result set means there is
        // nothing to build and the run should stop here.
        if records.is_empty() {
            return Err(StackError::ProcessingError {
                message: "API call returned no records".to_string(),
            });
        }

        Ok(records)
    }

    async fn transform(&self, records: Vec<AssessmentRecord>) -> Result<Scene> {
        let config = self.config.layout();
        let scene = layout(&records, &config);

        for placement in &scene.placements {
            tracing::debug!(
                "{} - {}, {}, {}, {}",
                placement.record.id,
                placement.record.grade,
                placement.record.domain,
                placement.record.cluster,
                placement.record.standard_id
            );
        }

        let skipped = records.len() as i64 - scene.placements.len() as i64;
        if skipped > 0 {
            tracing::warn!("{} records were skipped or collapsed during layout", skipped);
        }

        Ok(scene)
    }

    async fn load(&self, scene: Scene) -> Result<String> {
        let scene_file = SceneFile {
            generated_at: Utc::now(),
            source: self.config.api_endpoint().to_string(),
            scene,
        };

        let json = serde_json::to_string_pretty(&scene_file)?;
        self.storage.write_file("scene.json", json.as_bytes()).await?;

        let csv_data = placements_csv(&scene_file.scene)?;
        self.storage.write_file("placements.csv", &csv_data).await?;

        tracing::debug!(
            "Wrote scene.json ({} bytes) and placements.csv ({} bytes)",
            json.len(),
            csv_data.len()
        );
        Ok(self.config.output_path().to_string())
    }
}

/// Flat per-block report for spreadsheet inspection of a generated scene.
fn placements_csv(scene: &Scene) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "grade",
        "subject",
        "kind",
        "mastery",
        "x",
        "y",
        "z",
        "domain",
        "cluster",
        "standard_id",
    ])?;

    for placement in &scene.placements {
        writer.write_record([
            placement.record.id.to_string(),
            placement.record.grade.clone(),
            placement.record.subject.clone(),
            placement.kind.to_string(),
            placement.record.mastery.to_string(),
            placement.position.x.to_string(),
            placement.position.y.to_string(),
            placement.position.z.to_string(),
            placement.record.domain.clone(),
            placement.record.cluster.clone(),
            placement.record.standard_id.clone(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| StackError::ProcessingError {
            message: format!("CSV buffer error: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::LayoutConfig;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        api_endpoint: String,
        output_path: String,
    }

    impl MockConfig {
        fn new(api_endpoint: String) -> Self {
            Self {
                api_endpoint,
                output_path: "test_output".to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn layout(&self) -> LayoutConfig {
            LayoutConfig::default()
        }
    }

    fn record_json(id: i64, grade: &str, mastery: i64, domain: &str) -> serde_json::Value {
        serde_json::json!({
            "Id": id,
            "Subject": "Math",
            "Grade": grade,
            "Mastery": mastery,
            "DomainId": format!("{}-ID", domain),
            "Domain": domain,
            "Cluster": "Cluster A",
            "StandardId": format!("{}.{}.1", grade, domain),
            "StandardDescription": "A standard"
        })
    }

    fn record(id: i64, grade: &str, mastery: i64, domain: &str) -> AssessmentRecord {
        serde_json::from_value(record_json(id, grade, mastery, domain)).unwrap()
    }

    #[tokio::test]
    async fn test_extract_successful_api_response() {
        let server = MockServer::start();
        let mock_data = serde_json::json!([
            record_json(1, "1", 0, "A"),
            record_json(2, "1", 1, "B"),
        ]);

        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/stack");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_data);
        });

        let pipeline = StackPipeline::new(MockStorage::new(), MockConfig::new(server.url("/stack")));
        let records = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].domain, "B");
    }

    #[tokio::test]
    async fn test_extract_server_error_fails() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/stack");
            then.status(500);
        });

        let pipeline = StackPipeline::new(MockStorage::new(), MockConfig::new(server.url("/stack")));
        let result = pipeline.extract().await;

        api_mock.assert();
        assert!(matches!(result, Err(StackError::ProcessingError { .. })));
    }

    #[tokio::test]
    async fn test_extract_empty_response_fails() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/stack");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([]));
        });

        let pipeline = StackPipeline::new(MockStorage::new(), MockConfig::new(server.url("/stack")));
        let result = pipeline.extract().await;

        api_mock.assert();
        assert!(matches!(result, Err(StackError::ProcessingError { .. })));
    }

    #[tokio::test]
    async fn test_transform_builds_scene() {
        let pipeline = StackPipeline::new(
            MockStorage::new(),
            MockConfig::new("http://test.invalid".to_string()),
        );
        let records = vec![
            record(1, "1", 1, "A"),
            record(2, "1", 2, "B"),
            record(3, "2", 0, "A"),
        ];

        let scene = pipeline.transform(records).await.unwrap();

        assert_eq!(scene.placements.len(), 3);
        assert_eq!(scene.labels.len(), 2);
        assert_eq!(scene.centers.len(), 2);
    }

    #[tokio::test]
    async fn test_load_writes_scene_and_csv() {
        let storage = MockStorage::new();
        let pipeline = StackPipeline::new(
            storage.clone(),
            MockConfig::new("http://test.invalid".to_string()),
        );

        let scene = layout(
            &[record(1, "1", 1, "A"), record(2, "1", 2, "B")],
            &LayoutConfig::default(),
        );
        let output_path = pipeline.load(scene.clone()).await.unwrap();
        assert_eq!(output_path, "test_output");

        let json_bytes = storage.get_file("scene.json").await.unwrap();
        let scene_file: SceneFile = serde_json::from_slice(&json_bytes).unwrap();
        assert_eq!(scene_file.scene, scene);
        assert_eq!(scene_file.source, "http://test.invalid");

        let csv_bytes = storage.get_file("placements.csv").await.unwrap();
        let csv_text = String::from_utf8(csv_bytes).unwrap();
        let lines: Vec<&str> = csv_text.trim_end().split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,grade,subject,kind,mastery,x,y,z"));
        assert!(lines[1].contains("wood"));
        assert!(lines[2].contains("stone"));
    }

    #[tokio::test]
    async fn test_load_empty_scene_still_writes_artifacts() {
        let storage = MockStorage::new();
        let pipeline = StackPipeline::new(
            storage.clone(),
            MockConfig::new("http://test.invalid".to_string()),
        );

        pipeline.load(Scene::default()).await.unwrap();

        assert!(storage.get_file("scene.json").await.is_some());
        let csv_bytes = storage.get_file("placements.csv").await.unwrap();
        let csv_text = String::from_utf8(csv_bytes).unwrap();
        assert_eq!(csv_text.trim_end().split('\n').count(), 1);
    }
}
