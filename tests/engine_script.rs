//! Drives the real child-process renderers against shell-script stand-ins.
//!
//! Everything lives in one test function: a script written and executed from
//! parallel test threads can fail with ETXTBSY.

#![cfg(unix)]

use markpdf::{convert_merged, convert_single, ConversionConfig, MarkPdfError, PdfEngine};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_WEASYPRINT: &str = r#"#!/bin/sh
here="$(dirname "$0")"
printf '%s\n' "$@" > "$here/weasyprint-args.txt"
cp "$5" "$here/weasyprint-seen.html"
echo "WARNING: Failed to load image at 'missing.png'" >&2
printf '%%PDF-1.4 weasyprint'
"#;

const FAKE_CHROMIUM: &str = r#"#!/bin/sh
here="$(dirname "$0")"
printf '%s\n' "$@" > "$here/chromium-args.txt"
for a in "$@"; do
  case "$a" in
    --print-to-pdf=*) out="${a#--print-to-pdf=}" ;;
  esac
  last="$a"
done
cp "${last#file://}" "$here/chromium-seen.html"
printf '%%PDF-1.4 chromium' > "$out"
"#;

const FAILING_ENGINE: &str = r#"#!/bin/sh
echo "fatal: could not lay out document" >&2
exit 3
"#;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config(engine: PdfEngine, program: &Path) -> ConversionConfig {
    ConversionConfig::builder()
        .engine(engine)
        .engine_path(program)
        .build()
        .unwrap()
}

#[test]
fn external_engines_receive_document_and_base_dir() {
    let bin = TempDir::new().unwrap();
    let weasyprint = script(bin.path(), "weasyprint", FAKE_WEASYPRINT);
    let chromium = script(bin.path(), "chromium", FAKE_CHROMIUM);
    let failing = script(bin.path(), "failing", FAILING_ENGINE);

    let docs = TempDir::new().unwrap();
    std::fs::create_dir_all(docs.path().join("book")).unwrap();
    let a = docs.path().join("book/a.md");
    let b = docs.path().join("b.md");
    std::fs::write(&a, "# Alpha\n\n![pic](img/pic.png)\n").unwrap();
    std::fs::write(&b, "# Beta\n").unwrap();

    // WeasyPrint: PDF on stdout, base URL is the first file's directory.
    let out = docs.path().join("merged.pdf");
    let report = convert_merged(
        &[&a, &b],
        Some(out.as_path()),
        &config(PdfEngine::WeasyPrint, &weasyprint),
    )
    .unwrap();
    assert_eq!(report.engine, "weasyprint");
    assert_eq!(std::fs::read(&out).unwrap(), b"%PDF-1.4 weasyprint");

    let args = std::fs::read_to_string(bin.path().join("weasyprint-args.txt")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args[0], "--base-url");
    assert_eq!(args[1], format!("{}/", docs.path().join("book").display()));
    assert_eq!(args[4].rsplit('/').next(), Some("document.html"));
    assert_eq!(args[5], "-");

    let seen = std::fs::read_to_string(bin.path().join("weasyprint-seen.html")).unwrap();
    assert!(seen.starts_with("<!DOCTYPE html>"));
    assert!(seen.contains("@page"));
    assert_eq!(seen.matches("page-break-after: always").count(), 1);

    // Chromium: PDF written to --print-to-pdf, base directory injected.
    let out = docs.path().join("single.pdf");
    let report =
        convert_single(&b, Some(out.as_path()), &config(PdfEngine::Chromium, &chromium)).unwrap();
    assert_eq!(report.engine, "chromium");
    assert_eq!(std::fs::read(&out).unwrap(), b"%PDF-1.4 chromium");

    let args = std::fs::read_to_string(bin.path().join("chromium-args.txt")).unwrap();
    assert!(args.lines().any(|l| l == "--headless"));
    let seen = std::fs::read_to_string(bin.path().join("chromium-seen.html")).unwrap();
    assert!(seen.contains("<base href=\"file://"), "got: {seen}");

    // A failing engine surfaces its stderr and writes nothing.
    let out = docs.path().join("never.pdf");
    let err = convert_single(&b, Some(out.as_path()), &config(PdfEngine::WeasyPrint, &failing))
        .unwrap_err();
    match err {
        MarkPdfError::RenderFailed { engine, detail } => {
            assert_eq!(engine, "weasyprint");
            assert!(detail.contains("could not lay out document"), "got: {detail}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!out.exists());
}
