/*!
 * End-to-end document translation through the controller
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use crate::common;
use crate::common::mock_backends::{FailingForLanguage, PrefixBackend, RecordingBackend, ShortReplyBackend};
use yamtwai::app_controller::Controller;
use yamtwai::errors::{DocumentError, TranslationError};

/// Front matter title, disclaimer after the closing delimiter, heading and prose
#[tokio::test]
async fn test_translate_document_frontMatterScenario_shouldTranslateEveryPart() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "README.md", "---\ntitle: Hi\n---\n# Hello\nWorld\n")?;

    let config = common::config_for(&["fr"]);
    let warning = config.markdown.warning_for("fr").unwrap_or_default().to_string();
    let controller = Controller::with_backend(config, Arc::new(PrefixBackend))?;

    let report = controller.translate_document(&source).await?;
    assert_eq!(report.succeeded(), 1);

    let output = fs::read_to_string(temp_dir.path().join("README.fr.md"))?;
    let expected = format!("---\ntitle: [fr] Hi\n---\n\n> {}\n\n# [fr] Hello\n[fr] World", warning);
    assert_eq!(output, expected);
    Ok(())
}

/// One failing language must not affect the others
#[tokio::test]
async fn test_translate_document_withOneFailingLanguage_shouldCompleteOthers() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "index.md", common::SAMPLE_POST)?;

    let controller = Controller::with_backend(
        common::config_for(&["fr", "de", "es"]),
        Arc::new(FailingForLanguage::new("de")),
    )?;

    let report = controller.translate_document(&source).await?;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);

    let failed = report.outcomes.iter().find(|o| o.result.is_err()).unwrap();
    assert_eq!(failed.target_language, "de");
    assert!(matches!(
        failed.result,
        Err(DocumentError::Translation {
            source: TranslationError::Provider(_),
            ..
        })
    ));

    assert!(!temp_dir.path().join("index.de.md").exists());
    for lang in ["fr", "es"] {
        let output = fs::read_to_string(temp_dir.path().join(format!("index.{}.md", lang)))?;
        assert!(output.contains(&format!("# [{}] Writing a translator", lang)));
        assert!(output.contains("```rust\nfn main() {}\n```"));
    }
    Ok(())
}

/// Existing translations are never touched and cost no backend call
#[tokio::test]
async fn test_translate_document_withExistingOutput_shouldSkipLanguage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "README.md", "# Hello\n")?;
    let existing = common::create_test_file(temp_dir.path(), "README.fr.md", "# Bonjour (edited by hand)")?;

    let backend = Arc::new(RecordingBackend::default());
    let controller = Controller::with_backend(common::config_for(&["fr", "ja"]), backend.clone())?;

    let report = controller.translate_document(&source).await?;

    assert_eq!(report.skipped, vec!["fr"]);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].target_language, "ja");
    assert_eq!(fs::read_to_string(&existing)?, "# Bonjour (edited by hand)");

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target_language, "ja");
    Ok(())
}

/// Running twice does no work the second time
#[tokio::test]
async fn test_translate_document_rerun_shouldBeIdempotent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "README.md", common::SAMPLE_POST)?;

    let backend = Arc::new(RecordingBackend::default());
    let controller = Controller::with_backend(common::config_for(&["fr", "ko"]), backend.clone())?;

    controller.translate_document(&source).await?;
    let first = fs::read_to_string(temp_dir.path().join("README.ko.md"))?;

    let report = controller.translate_document(&source).await?;

    assert!(report.outcomes.is_empty());
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(fs::read_to_string(temp_dir.path().join("README.ko.md"))?, first);
    Ok(())
}

#[tokio::test]
async fn test_translate_document_withShortReply_shouldReportMismatchAndWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "README.md", common::SAMPLE_POST)?;

    let controller = Controller::with_backend(common::config_for(&["fr"]), Arc::new(ShortReplyBackend))?;
    let report = controller.translate_document(&source).await?;

    assert_eq!(report.failed(), 1);
    assert!(matches!(
        &report.outcomes[0].result,
        Err(DocumentError::Translation {
            source: TranslationError::LineCountMismatch { .. },
            ..
        })
    ));
    assert!(!temp_dir.path().join("README.fr.md").exists());
    Ok(())
}

/// Folder mode picks up every configured source name present
#[tokio::test]
async fn test_run_folder_shouldTranslateConfiguredSources() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "README.md", "# Readme\n")?;
    common::create_test_file(temp_dir.path(), "index.md", "# Index\n")?;
    common::create_test_file(temp_dir.path(), "draft.md", "# Draft\n")?;

    let mut config = common::config_for(&["it"]);
    config.markdown.insert_warnings = false;
    let controller = Controller::with_backend(config, Arc::new(PrefixBackend))?;

    let reports = controller.run(temp_dir.path()).await?;

    assert_eq!(reports.len(), 2);
    assert_eq!(fs::read_to_string(temp_dir.path().join("README.it.md"))?, "# [it] Readme");
    assert_eq!(fs::read_to_string(temp_dir.path().join("index.it.md"))?, "# [it] Index");
    assert!(!temp_dir.path().join("draft.it.md").exists());
    Ok(())
}

/// Several documents share the controller's language pool
#[tokio::test]
async fn test_controller_withSingleWorker_shouldStillTranslateAllLanguages() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let first = common::create_test_file(temp_dir.path(), "a.md", "Alpha\n")?;
    let second = common::create_test_file(temp_dir.path(), "b.md", "Beta\n")?;

    let mut config = common::config_for(&["fr", "de", "nl"]);
    config.max_concurrent_languages = Some(1);
    let controller = Controller::with_backend(config, Arc::new(PrefixBackend))?;

    for document in [&first, &second] {
        let report = controller.translate_document(document).await?;
        assert_eq!(report.succeeded(), 3);
    }
    assert_eq!(fs::read_to_string(temp_dir.path().join("b.nl.md"))?, "[nl] Beta");
    Ok(())
}
