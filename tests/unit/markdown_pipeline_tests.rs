/*!
 * Tests for Markdown segmentation, batch realignment and expansion
 */

use yamtwai::app_config::MarkdownConfig;
use yamtwai::errors::TranslationError;
use yamtwai::markdown::{MarkdownPipeline, Segment, SegmentKind, build_batch, translate_segments};

use crate::common::SAMPLE_POST;
use crate::common::mock_backends::{EchoBackend, PrefixBackend, RecordingBackend, ShortReplyBackend};

fn pipeline() -> MarkdownPipeline {
    MarkdownPipeline::new(MarkdownConfig::default()).unwrap()
}

fn pipeline_without_warnings() -> MarkdownPipeline {
    let config = MarkdownConfig {
        insert_warnings: false,
        ..MarkdownConfig::default()
    };
    MarkdownPipeline::new(config).unwrap()
}

#[test]
fn test_segment_samplePost_shouldBatchOnlyTranslatableText() {
    let segments = pipeline().segment(SAMPLE_POST, "fr");
    let batch = build_batch(&segments);

    assert_eq!(
        batch,
        vec![
            "Writing a translator",
            "rust",
            "markdown",
            "Writing a translator",
            "Translating Markdown one line at a time.",
            "![diagram]()",
            "Why lines",
            "See [the guide]() for details.",
        ]
    );
}

/// Sum of expected counts equals the batch length
#[test]
fn test_segment_expectedCounts_shouldMatchBatchLength() {
    for target in ["fr", "ja", "zh-TW"] {
        let segments = pipeline().segment(SAMPLE_POST, target);
        let expected: usize = segments.iter().map(Segment::expected_line_count).sum();
        assert_eq!(expected, build_batch(&segments).len(), "target {}", target);
    }
}

#[test]
fn test_segment_codeBlock_shouldStayTransparent() {
    let segments = pipeline().segment(SAMPLE_POST, "fr");
    let code_line = segments
        .iter()
        .find(|s| matches!(s.kind(), SegmentKind::Transparent { line } if line == "fn main() {}"));
    assert!(code_line.is_some());
}

#[test]
fn test_segment_disclaimer_shouldFollowFrontMatterOnce() {
    let segments = pipeline().segment(SAMPLE_POST, "fr");
    let disclaimers: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| matches!(s.kind(), SegmentKind::Transparent { line } if line.starts_with("\n> ")))
        .map(|(i, _)| i)
        .collect();

    assert_eq!(disclaimers.len(), 1);
    let before = &segments[disclaimers[0] - 1];
    assert!(matches!(before.kind(), SegmentKind::Transparent { line } if line == "---"));
}

#[test]
fn test_segment_doNotTranslateRegion_shouldDropMarkersAndKeepBody() {
    let source = "Intro\n__do_not_translate__\nKeep me\n__do_not_translate__\nOutro\n";
    let segments = pipeline_without_warnings().segment(source, "fr");
    assert_eq!(build_batch(&segments), vec!["Intro", "Outro"]);
    assert!(
        segments
            .iter()
            .all(|s| !matches!(s.kind(), SegmentKind::Transparent { line } if line.starts_with("__do_not")))
    );
}

#[tokio::test]
async fn test_translate_withEchoBackend_shouldReproduceSource() {
    let output = pipeline_without_warnings()
        .translate(SAMPLE_POST, &EchoBackend, "en", "fr", "index.md")
        .await
        .unwrap();
    assert_eq!(output, SAMPLE_POST.trim_end_matches('\n'));
}

#[tokio::test]
async fn test_translate_withPrefixBackend_shouldKeepStructure() {
    let output = pipeline_without_warnings()
        .translate(SAMPLE_POST, &PrefixBackend, "en", "de", "index.md")
        .await
        .unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines[0], "---");
    assert_eq!(lines[1], "title: \"[de] Writing a translator\"");
    assert_eq!(lines[2], "date: 2024-05-01");
    assert_eq!(lines[3], "tags: [[de] rust, [de] markdown]");
    assert_eq!(lines[5], "# [de] Writing a translator");
    assert!(output.contains("[de] ![diagram](img/pipeline.png)"));
    assert!(output.contains("```rust\nfn main() {}\n```"));
    assert!(output.contains("## [de] Why lines"));
    assert!(output.ends_with("[de] See [the guide](https://example.com/guide) for details."));
}

#[tokio::test]
async fn test_translate_shouldCallBackendOnceWithSourceAndTarget() {
    let backend = RecordingBackend::default();
    pipeline()
        .translate(SAMPLE_POST, &backend, "en", "ko", "index.md")
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].source_language, "en");
    assert_eq!(calls[0].target_language, "ko");
    assert_eq!(calls[0].lines.len(), 8);
}

#[tokio::test]
async fn test_translate_withOnlyTransparentLines_shouldSkipBackend() {
    let backend = RecordingBackend::default();
    let source = "```\nlet x = 1;\n```\n\n<img src=\"a.png\">\n";
    let output = pipeline_without_warnings()
        .translate(source, &backend, "en", "fr", "code.md")
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 0);
    assert_eq!(output, "```\nlet x = 1;\n```\n\n<img src=\"a.png\">");
}

#[tokio::test]
async fn test_translate_withShortReply_shouldFailWithMismatch() {
    let result = pipeline()
        .translate(SAMPLE_POST, &ShortReplyBackend, "en", "fr", "index.md")
        .await;

    match result {
        Err(TranslationError::LineCountMismatch {
            document,
            target_language,
            expected,
            actual,
        }) => {
            assert_eq!(document, "index.md");
            assert_eq!(target_language, "fr");
            assert_eq!(expected, 8);
            assert_eq!(actual, 7);
        }
        other => panic!("expected a line count mismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_segments_withNoSegments_shouldBeEmpty() {
    let output = translate_segments(Vec::new(), &EchoBackend, "en", "fr", "empty.md")
        .await
        .unwrap();
    assert_eq!(output, "");
}

/// Full-width punctuation is folded except for targets that keep it
#[tokio::test]
async fn test_translate_fullWidthSource_shouldFoldPerTarget() {
    let source = "你好，世界！\n";
    let pipeline = pipeline_without_warnings();

    let folded = pipeline.translate(source, &EchoBackend, "zh-CN", "en", "a.md").await.unwrap();
    assert_eq!(folded, "你好,世界!");

    let kept = pipeline.translate(source, &EchoBackend, "zh-CN", "zh-TW", "a.md").await.unwrap();
    assert_eq!(kept, "你好，世界！");
}

#[tokio::test]
async fn test_translate_mixedScripts_shouldSpaceUnlessCompact() {
    let source = "用Rust写翻译器\n";
    let pipeline = pipeline_without_warnings();

    let spaced = pipeline.translate(source, &EchoBackend, "en", "zh-CN", "a.md").await.unwrap();
    assert_eq!(spaced, "用 Rust 写翻译器");

    let compact = pipeline.translate(source, &EchoBackend, "en", "ja", "a.md").await.unwrap();
    assert_eq!(compact, "用Rust写翻译器");
}

/// A block-style array keeps its layout and translates each element
#[tokio::test]
async fn test_translate_blockArray_shouldKeepLayout() {
    let source = "---\ntags:\n  - rust\n  - \"cli tools\"\ndate: 2024-01-01\n---\n";
    let output = pipeline_without_warnings()
        .translate(source, &PrefixBackend, "en", "fr", "a.md")
        .await
        .unwrap();
    assert_eq!(
        output,
        "---\ntags:\n  - [fr] rust\n  - \"[fr] cli tools\"\ndate: 2024-01-01\n---"
    );
}

/// Code inside a fence is never respaced, even for targets that get spacing
#[tokio::test]
async fn test_translate_fencedCode_shouldStayByteIdenticalForSpacedTarget() {
    let source = "Hello\n```python\nprint(\"中文abc\")\n```\n";
    let output = pipeline_without_warnings()
        .translate(source, &EchoBackend, "en", "zh-CN", "code.md")
        .await
        .unwrap();
    assert_eq!(output, "Hello\n```python\nprint(\"中文abc\")\n```");
}

/// A quoted flow element holding a comma is one batch line
#[tokio::test]
async fn test_translate_flowArrayWithQuotedComma_shouldKeepElementCount() {
    let source = "---\ntags: [\"rust, cli\", web]\n---\n";
    let pipeline = pipeline_without_warnings();

    let segments = pipeline.segment(source, "fr");
    assert_eq!(build_batch(&segments), vec!["rust, cli", "web"]);

    let output = pipeline
        .translate(source, &PrefixBackend, "en", "fr", "a.md")
        .await
        .unwrap();
    assert_eq!(output, "---\ntags: [\"[fr] rust, cli\", [fr] web]\n---");
}
