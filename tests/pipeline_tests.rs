use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use threatmodel::ai::{CompletionParams, PromptTemplate};
use threatmodel::clients::{CompletionProvider, RepositoryContents, TextRecognizer};
use threatmodel::core::config::{BaselineMode, PollConfig, RecommendationSource, RepoLocation};
use threatmodel::core::models::{
    BaselineOutcome, OperationId, OperationStatus, ReadOperation, RepoEntry,
};
use threatmodel::errors::PipelineError;
use threatmodel::features::{Pipeline, PipelineSettings};

const OPERATION_LOCATION: &str =
    "https://vision.example.com/vision/v3.2/read/analyzeResults/0b6f2f7e-7c39-4d3e-a1b4-2f1e8c5d9a10";

struct StubVision {
    polls: AtomicUsize,
}

#[async_trait]
impl TextRecognizer for StubVision {
    async fn submit(&self, image: Vec<u8>) -> Result<OperationId, PipelineError> {
        assert!(!image.is_empty());
        OperationId::from_operation_location(OPERATION_LOCATION)
    }

    async fn poll(&self, _id: &OperationId) -> Result<ReadOperation, PipelineError> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            Ok(ReadOperation::pending(OperationStatus::Running))
        } else {
            Ok(ReadOperation::succeeded(vec![vec!["VM", "Storage"]]))
        }
    }
}

/// Answers the service prompt with a fixed list and anything else with advice.
#[derive(Default)]
struct StubCompletions {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl CompletionProvider for StubCompletions {
    async fn complete(&self, prompt: &str, _params: &CompletionParams) -> Result<String, PipelineError> {
        if self.fail {
            return Err(PipelineError::CompletionError("status 500".to_string()));
        }
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.contains("comma-separated") {
            Ok(" Virtual Machines, Storage".to_string())
        } else if prompt.contains("relevant keywords") {
            Ok("\nfirewall, encryption".to_string())
        } else {
            Ok("\nEnable encryption at rest.".to_string())
        }
    }
}

struct StubRepo;

#[async_trait]
impl RepositoryContents for StubRepo {
    async fn list_directory(&self, location: &RepoLocation) -> Result<Vec<RepoEntry>, PipelineError> {
        Ok([
            "readme.md",
            "virtual-machines-security-baseline.md",
            "azure-storage-security-baseline.md",
        ]
        .iter()
        .map(|name| RepoEntry {
            name: (*name).to_string(),
            path: format!("{}/{name}", location.path),
            kind: Some("file".to_string()),
        })
        .collect())
    }

    async fn get_raw_content(&self, _location: &RepoLocation, path: &str) -> Result<String, PipelineError> {
        Ok(format!("baseline body for {path}"))
    }
}

fn write_image(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("threatmodel-{}-{name}.png", std::process::id()));
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
    path
}

fn settings(image_path: PathBuf, recommend_from: RecommendationSource) -> PipelineSettings {
    PipelineSettings {
        image_path,
        poll: PollConfig {
            interval: Duration::from_millis(10),
            max_attempts: Some(10),
            timeout: None,
        },
        baseline_repo: RepoLocation {
            owner: "o".into(),
            repo: "r".into(),
            path: "baselines".into(),
            git_ref: "main".into(),
        },
        baseline_mode: BaselineMode::Link,
        extra_lookups: Vec::new(),
        recommend_from,
        recommend_templates: vec![PromptTemplate::recommendations()],
    }
}

#[tokio::test]
async fn test_end_to_end_prints_lines_and_baselines_in_order() {
    let image = write_image("e2e");
    let pipeline = Pipeline::new(
        StubVision {
            polls: AtomicUsize::new(0),
        },
        StubCompletions::default(),
        StubRepo,
        settings(image.clone(), RecommendationSource::Services),
    );

    let mut out = Vec::new();
    let report = pipeline.run(&mut out).await.unwrap();
    let printed = String::from_utf8(out).unwrap();
    let _ = std::fs::remove_file(image);

    assert_eq!(report.document.text(), "VM\nStorage\n");
    assert_eq!(report.services, vec!["Virtual Machines", "Storage"]);
    assert!(printed.contains("Extracted Text from Image:\nVM\nStorage\n"));

    let vm_line = "Virtual Machines: https://github.com/o/r/blob/main/baselines/virtual-machines-security-baseline.md";
    let storage_line = "Storage: https://github.com/o/r/blob/main/baselines/azure-storage-security-baseline.md";
    let vm_at = printed.find(vm_line).expect("VM baseline printed");
    let storage_at = printed.find(storage_line).expect("Storage baseline printed");
    assert!(vm_at < storage_at);

    assert_eq!(report.baselines.entries.len(), 2);
    assert!(
        report
            .baselines
            .entries
            .iter()
            .all(|(_, outcome)| matches!(outcome, BaselineOutcome::Found { body, .. } if !body.is_empty()))
    );
    assert!(printed.contains("Recommended Actions:\nEnable encryption at rest."));
}

#[tokio::test]
async fn test_recommendations_follow_configured_source() {
    for (source, expected) in [
        (RecommendationSource::Services, "Given the following:\nVirtual Machines, Storage\n"),
        (RecommendationSource::Text, "Given the following:\nVM\nStorage\n\n"),
    ] {
        let image = write_image(&format!("{source:?}"));
        let pipeline = Pipeline::new(
            StubVision {
                polls: AtomicUsize::new(0),
            },
            StubCompletions::default(),
            StubRepo,
            settings(image.clone(), source),
        );

        let report = pipeline.run(&mut Vec::<u8>::new()).await.unwrap();
        let _ = std::fs::remove_file(image);

        assert_eq!(report.recommendations, vec!["\nEnable encryption at rest."]);
        let prompts = pipeline.completions().prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains(expected), "{source:?}: {}", prompts[1]);
    }
}

#[tokio::test]
async fn test_completion_failure_ends_the_run() {
    let image = write_image("fail");
    let pipeline = Pipeline::new(
        StubVision {
            polls: AtomicUsize::new(0),
        },
        StubCompletions {
            fail: true,
            ..StubCompletions::default()
        },
        StubRepo,
        settings(image.clone(), RecommendationSource::Services),
    );

    let mut out = Vec::new();
    let result = pipeline.run(&mut out).await;
    let printed = String::from_utf8(out).unwrap();
    let _ = std::fs::remove_file(image);

    assert!(matches!(result, Err(PipelineError::CompletionError(_))));
    assert!(printed.contains("VM\nStorage\n"));
    assert!(!printed.contains("Security Baselines:"));
}

#[tokio::test]
async fn test_keyword_template_runs_before_recommendations() {
    let image = write_image("keywords");
    let pipeline = Pipeline::new(
        StubVision {
            polls: AtomicUsize::new(0),
        },
        StubCompletions::default(),
        StubRepo,
        PipelineSettings {
            recommend_templates: vec![PromptTemplate::keywords(), PromptTemplate::recommendations()],
            ..settings(image.clone(), RecommendationSource::Text)
        },
    );

    let mut out = Vec::new();
    let report = pipeline.run(&mut out).await.unwrap();
    let printed = String::from_utf8(out).unwrap();
    let _ = std::fs::remove_file(image);

    assert_eq!(
        report.recommendations,
        vec!["\nfirewall, encryption", "\nEnable encryption at rest."]
    );
    assert!(printed.contains("Recommended Actions:\nfirewall, encryption\nEnable encryption at rest.\n"));

    let prompts = pipeline.completions().prompts.lock().unwrap();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[1].contains("Given the following text:\nVM\nStorage\n"));
    assert!(prompts[1].ends_with("Please provide the relevant keywords from the image:"));
    assert!(prompts[2].contains("Provide security recommendations:"));
}
