/*!
 * End-to-end translation runs over a temporary project with the mock provider
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use docs_i18n::app_config::ChangeDetectionMode;
use docs_i18n::app_controller::Controller;
use docs_i18n::change_detection::content_hash;
use docs_i18n::file_utils::FileManager;
use docs_i18n::providers::mock::{MockBehavior, MockProvider};
use crate::common;

fn controller(root: &std::path::Path, provider: &MockProvider) -> Controller {
    Controller::with_provider(common::test_config(&["gemini-2.5-flash"]), root, Arc::new(provider.clone()))
}

#[tokio::test]
async fn test_run_withFreshProject_shouldTranslateEveryDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    let provider = MockProvider::working();

    let summary = controller(root, &provider).run().await?;

    assert_eq!(summary.translated, 3);
    assert_eq!(summary.unchanged, 0);
    assert!(summary.is_clean());
    assert_eq!(summary.final_model.as_deref(), Some("gemini-2.5-flash"));
    assert_eq!(provider.call_count(), 3);

    let readme = fs::read_to_string(root.join("out/ru/README.md"))?;
    assert_eq!(readme, "[RU] # Project\n\nA desktop client built with Electron.\n");
    assert!(root.join("out/ru/docs/setup.md").exists());
    assert!(root.join("out/ru/docs/guide/ipc.md").exists());
    assert!(!root.join("out/ru/docs/logo.png").exists());

    let sidecar = fs::read_to_string(FileManager::sidecar_path(root.join("out/ru/docs/setup.md")))?;
    assert_eq!(sidecar, content_hash(b"## Setup\n\nRun `npm install` first.\n"));

    Ok(())
}

#[tokio::test]
async fn test_run_twice_shouldSkipUnchangedDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    let provider = MockProvider::working();

    controller(root, &provider).run().await?;
    let summary = controller(root, &provider).run().await?;

    assert_eq!(summary.translated, 0);
    assert_eq!(summary.unchanged, 3);
    assert_eq!(provider.call_count(), 3);
    assert!(provider.probes().len() == 1, "second run should not probe models");

    Ok(())
}

#[tokio::test]
async fn test_run_afterSourceEdit_shouldRetranslateOnlyThatDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    let provider = MockProvider::working();

    controller(root, &provider).run().await?;
    fs::write(root.join("docs/setup.md"), "## Setup\n\nRun `pnpm install` first.\n")?;
    let summary = controller(root, &provider).run().await?;

    assert_eq!(summary.translated, 1);
    assert_eq!(summary.unchanged, 2);
    let calls = provider.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[3].prompt.ends_with("Run `pnpm install` first.\n"));
    assert_eq!(
        fs::read_to_string(root.join("out/ru/docs/setup.md"))?,
        "[RU] ## Setup\n\nRun `pnpm install` first.\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_run_withForce_shouldRetranslateEverything() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    let provider = MockProvider::working();

    controller(root, &provider).run().await?;
    let summary = controller(root, &provider).force(true).run().await?;

    assert_eq!(summary.translated, 3);
    assert_eq!(provider.call_count(), 6);

    Ok(())
}

#[tokio::test]
async fn test_run_withHeader_shouldPrependHeader() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    let provider = MockProvider::working();
    let mut config = common::test_config(&["gemini-2.5-flash"]);
    config.header = "<!-- generated -->\n".to_string();

    Controller::with_provider(config, root, Arc::new(provider.clone())).run().await?;

    let readme = fs::read_to_string(root.join("out/ru/README.md"))?;
    assert!(readme.starts_with("<!-- generated -->\n[RU] # Project"));

    Ok(())
}

#[tokio::test]
async fn test_run_withEmptySource_shouldSkipWithoutCallingApi() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    common::create_test_file(root, "docs/empty.md", "  \n\n")?;
    let provider = MockProvider::working();

    let summary = controller(root, &provider).run().await?;

    assert_eq!(summary.translated, 3);
    assert_eq!(summary.empty, 1);
    assert_eq!(provider.call_count(), 3);
    assert!(!root.join("out/ru/docs/empty.md").exists());

    Ok(())
}

#[tokio::test]
async fn test_run_withFailingProvider_shouldContinueAndLeaveNoMarkers() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    let provider = MockProvider::new(MockBehavior::Failing);

    let summary = controller(root, &provider).run().await?;

    assert_eq!(summary.failed, 3);
    assert_eq!(summary.translated, 0);
    assert!(!summary.is_clean());
    assert!(!summary.models_exhausted);
    assert_eq!(provider.call_count(), 3);
    assert!(!root.join("out/ru/README.md").exists());
    assert!(!FileManager::sidecar_path(root.join("out/ru/README.md")).exists());

    Ok(())
}

#[tokio::test]
async fn test_run_withTooShortReply_shouldFailDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "README.md", "# Project\n")?;
    let provider = MockProvider::working().with_custom_response(|_| "ok".to_string());

    let summary = controller(root, &provider).run().await?;

    assert_eq!(summary.failed, 1);
    assert_eq!(provider.call_count(), 1);
    assert!(!root.join("out/ru/README.md").exists());

    Ok(())
}

#[tokio::test]
async fn test_run_withFencedReply_shouldWriteUnwrappedMarkdown() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "README.md", "# Project\n")?;
    let provider = MockProvider::working()
        .with_custom_response(|_| "```markdown\n# Проект\n\nОписание проекта.\n```".to_string());

    controller(root, &provider).run().await?;

    assert_eq!(fs::read_to_string(root.join("out/ru/README.md"))?, "# Проект\n\nОписание проекта.");

    Ok(())
}

#[tokio::test]
async fn test_run_withTransientRateLimit_shouldRetryAndSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "README.md", "# Project\n\nSome text.\n")?;
    let provider = MockProvider::working()
        .with_model("gemini-2.5-flash", MockBehavior::RateLimited { times: 2 });

    let summary = controller(root, &provider).run().await?;

    assert_eq!(summary.translated, 1);
    assert_eq!(provider.call_count(), 3);

    Ok(())
}

#[tokio::test]
async fn test_run_withMtimeDetection_shouldNotWriteSidecars() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    let provider = MockProvider::working();
    let mut config = common::test_config(&["gemini-2.5-flash"]);
    config.change_detection = ChangeDetectionMode::Mtime;

    let summary = Controller::with_provider(config.clone(), root, Arc::new(provider.clone())).run().await?;
    assert_eq!(summary.translated, 3);
    assert!(!FileManager::sidecar_path(root.join("out/ru/README.md")).exists());

    let summary = Controller::with_provider(config, root, Arc::new(provider.clone())).run().await?;
    assert_eq!(summary.unchanged, 3);

    Ok(())
}

#[tokio::test]
async fn test_status_shouldReportStaleDocumentsWithoutCallingApi() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    let provider = MockProvider::working();

    let before = controller(root, &provider).status()?;
    assert_eq!(before.len(), 3);
    assert!(before.iter().all(|s| s.stale));

    controller(root, &provider).run().await?;
    fs::write(root.join("README.md"), "# Project v2\n")?;

    let after = controller(root, &provider).status()?;
    let stale: Vec<_> = after.iter().filter(|s| s.stale).map(|s| s.job.source.clone()).collect();
    assert_eq!(stale, vec![root.join("README.md")]);
    assert_eq!(provider.call_count(), 3);

    Ok(())
}

#[tokio::test]
async fn test_run_withRequestDelay_shouldPauseBetweenApiCalls() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    let provider = MockProvider::working();
    let mut config = common::test_config(&["gemini-2.5-flash"]);
    config.retry.request_delay_ms = 40;

    let start = std::time::Instant::now();
    let summary = Controller::with_provider(config, root, Arc::new(provider.clone())).run().await?;

    assert_eq!(summary.translated, 3);
    assert!(start.elapsed() >= std::time::Duration::from_millis(80));

    Ok(())
}

#[tokio::test]
async fn test_run_withRequestDelayBeforeEmptyFile_shouldNotPause() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "README.md", "# Project\n\nSome text here.\n")?;
    common::create_test_file(root, "docs/empty.md", "\n")?;
    let provider = MockProvider::working();
    let mut config = common::test_config(&["gemini-2.5-flash"]);
    config.retry.request_delay_ms = 2000;

    let start = std::time::Instant::now();
    let summary = Controller::with_provider(config, root, Arc::new(provider.clone())).run().await?;

    assert_eq!(summary.translated, 1);
    assert_eq!(summary.empty, 1);
    assert!(start.elapsed() < std::time::Duration::from_millis(2000));

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_withDanglingSymlinkInDocs_shouldTranslateTheRest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_project(root)?;
    common::create_test_file(root, "docs/.drafts/wip.md", "## Draft\n\nNot ready yet.\n")?;
    std::os::unix::fs::symlink(root.join("docs/missing.md"), root.join("docs/link.md"))?;
    let provider = MockProvider::working();

    let summary = controller(root, &provider).run().await?;

    assert_eq!(summary.translated, 3);
    assert!(summary.is_clean());
    assert!(!root.join("out/ru/docs/.drafts/wip.md").exists());

    Ok(())
}
