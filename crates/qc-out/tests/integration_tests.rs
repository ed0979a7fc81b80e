//! Integration tests for qc-out publishing into real directories.

use std::fs;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use qc_core::{
    DocumentFormat, FixedClock, NarrativeSection, QualityCounters, Report, SectionKind, Status,
    WindowSpec,
};
use qc_out::templates::TemplatesFile;
use qc_out::DocumentRenderer;

fn report() -> Report {
    let start = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap();
    let window = WindowSpec::explicit(start, end)
        .unwrap()
        .resolve(end, None)
        .unwrap();
    Report::new(
        window,
        QualityCounters::new(100, 0),
        Status::Ok,
        vec![
            NarrativeSection::new(
                SectionKind::KeyMetrics,
                "| Metric | Value | Status |\n|---|---|---|\n| Accepted (Fresh) | 100/100 (100%) | ✓ |",
            ),
            NarrativeSection::new(SectionKind::StatusAssessment, "Status: **OK**\n\nNormal Operations."),
            NarrativeSection::new(SectionKind::TopActions, "1. Keep going\n2. Spot-check\n3. Log it"),
            NarrativeSection::new(SectionKind::RootCauses, "- None observed"),
        ],
        end,
    )
    .unwrap()
}

#[test]
fn test_publish_html_into_new_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("reports");
    let renderer = DocumentRenderer::new(&out).unwrap();

    let artifact = renderer.render(&report(), DocumentFormat::Html).unwrap();

    assert!(artifact.path.starts_with(&out));
    assert_eq!(artifact.format, DocumentFormat::Html);
    let html = fs::read_to_string(&artifact.path).unwrap();
    assert!(html.contains(&artifact.source_report_hash));
    assert!(html.contains("badge badge-ok"));
    assert!(html.contains("<td>100/100 (100%)</td>"));
    assert!(html.contains("<li>Keep going</li>"));
}

#[test]
fn test_no_temp_files_left_behind() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = DocumentRenderer::new(dir.path()).unwrap();
    renderer.render(&report(), DocumentFormat::Html).unwrap();
    renderer.render(&report(), DocumentFormat::Markdown).unwrap();

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.starts_with("qc-report_range_")));
}

#[test]
fn test_rerender_overwrites_and_is_detectable() {
    let dir = tempfile::tempdir().unwrap();
    let t0 = Utc.with_ymd_and_hms(2026, 10, 2, 9, 0, 0).unwrap();

    let first = DocumentRenderer::new(dir.path())
        .unwrap()
        .with_clock(Arc::new(FixedClock(t0)))
        .render(&report(), DocumentFormat::Markdown)
        .unwrap();
    let first_bytes = fs::read(&first.path).unwrap();

    let second = DocumentRenderer::new(dir.path())
        .unwrap()
        .with_clock(Arc::new(FixedClock(t0 + Duration::minutes(5))))
        .render(&report(), DocumentFormat::Markdown)
        .unwrap();

    assert_eq!(first.path, second.path);
    assert_ne!(first.created_at, second.created_at);
    assert!(second.is_duplicate_of(&first));
    assert_eq!(first_bytes, fs::read(&second.path).unwrap());
}

#[test]
fn test_unwritable_target_is_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"file").unwrap();

    let renderer = DocumentRenderer::new(&blocker).unwrap();
    let err = renderer.render(&report(), DocumentFormat::Html).unwrap_err();
    assert_eq!(err.kind(), "render_error");
}

#[test]
fn test_custom_templates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("templates.yaml");
    fs::write(
        &path,
        r##"
version: "1.0"
templates:
  html:
    description: Minimal
    template: "<h1>{{status}}</h1>"
  markdown:
    description: Minimal
    template: "# {{status}} ({{counters.loss_pct}})"
"##,
    )
    .unwrap();

    let templates = TemplatesFile::load(path.to_str().unwrap()).unwrap();
    let renderer = DocumentRenderer::with_templates(dir.path().join("out"), &templates).unwrap();
    let md = renderer.render_to_string(&report(), DocumentFormat::Markdown).unwrap();
    assert_eq!(md, "# OK (0%)");
}
