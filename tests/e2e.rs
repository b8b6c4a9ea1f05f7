//! End-to-end tests against a real WeasyPrint installation.
//!
//! Gated behind the `E2E_ENABLED` environment variable so they do not run in
//! CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! Set `MARKPDF_ENGINE_PATH` to use a WeasyPrint that is not on `PATH`.

use markpdf::{convert_merged, convert_single, ConversionConfig, PdfEngine};
use std::path::PathBuf;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

fn config() -> ConversionConfig {
    let mut builder = ConversionConfig::builder().engine(PdfEngine::WeasyPrint);
    if let Ok(path) = std::env::var("MARKPDF_ENGINE_PATH") {
        builder = builder.engine_path(PathBuf::from(path));
    }
    builder.build().unwrap()
}

const CHAPTER: &str = r#"# Chapter

Some **bold** text, a [link](https://example.com), and a table:

| Name | Value |
|------|-------|
| a    | 1     |

```python
def hello():
    return "world"
```
"#;

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_convert_single_produces_pdf() {
    e2e_skip_unless_enabled!();

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("chapter.md");
    std::fs::write(&input, CHAPTER).unwrap();

    let report = convert_single(&input, None, &config()).expect("conversion failed");

    let pdf = std::fs::read(&report.output).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(report.output, dir.path().join("chapter.pdf"));
    println!("single: {} bytes in {}ms", report.pdf_bytes, report.duration_ms);
}

#[test]
fn test_merge_starts_each_file_on_new_page() {
    e2e_skip_unless_enabled!();

    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.md");
    let b = dir.path().join("b.md");
    std::fs::write(&a, "# A\n\nshort\n").unwrap();
    std::fs::write(&b, "# B\n\nshort\n").unwrap();
    let out = dir.path().join("merged.pdf");

    let report = convert_merged(&[&a, &b], Some(out.as_path()), &config()).expect("merge failed");

    let pdf = std::fs::read(&out).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(report.page_breaks, 1);
}

#[test]
fn test_relative_image_resolves_against_first_file() {
    e2e_skip_unless_enabled!();

    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("img")).unwrap();
    std::fs::create_dir_all(dir.path().join("other")).unwrap();
    // 1×1 transparent PNG.
    let png: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];
    std::fs::write(dir.path().join("img/dot.png"), png).unwrap();

    let first = dir.path().join("first.md");
    let second = dir.path().join("other/second.md");
    std::fs::write(&first, "# First\n\n![dot](img/dot.png)\n").unwrap();
    // Resolves only because the base is the first file's directory.
    std::fs::write(&second, "# Second\n\n![dot](img/dot.png)\n").unwrap();

    let out = dir.path().join("out.pdf");
    let report = convert_merged(&[&first, &second], Some(out.as_path()), &config())
        .expect("merge failed");

    assert_eq!(report.base_dir, dir.path());
    assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF"));
}
