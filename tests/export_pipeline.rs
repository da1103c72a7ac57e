mod common;

use std::fs;
use std::path::Path;

use common::{FakePdfRenderer, FixtureSource, MissingPdfRenderer, pct};
use edgardump::{
    EdgarError, ExportConfig, Exporter, Format, MissingFormPolicy, SelectionPolicy, Stage,
};
use tempfile::tempdir;

fn config(root: &Path) -> ExportConfig {
    ExportConfig::new().with_output_root(root)
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(all(feature = "markdown", feature = "text", feature = "epub"))]
#[tokio::test]
async fn exports_quarterlies_annual_and_prospectus() {
    let root = tempdir().unwrap();
    let exporter = Exporter::new(FixtureSource::pct(), config(root.path()))
        .with_pdf_renderer(FakePdfRenderer);

    let report = exporter.run("pct").await.unwrap();

    assert_eq!(report.ticker, "PCT");
    assert_eq!(report.company.cik, 1830033);
    assert_eq!(report.output_dir, root.path().join("PCT"));
    let selected: Vec<(&str, &str)> = report
        .selected
        .iter()
        .map(|f| (f.form.as_str(), f.filing_date.as_str()))
        .collect();
    assert_eq!(
        selected,
        vec![
            ("10-Q", "2024-05-09"),
            ("10-Q", "2023-11-08"),
            ("10-Q", "2023-08-09"),
            ("10-Q", "2023-05-10"),
            ("10-K", "2024-03-01"),
            ("S-1", "2021-05-01"),
        ]
    );
    assert!(report.is_complete(), "unexpected failures: {:?}", report.failures);
    assert_eq!(report.pdfs.len(), 6);
}

#[cfg(all(feature = "markdown", feature = "text", feature = "epub"))]
#[tokio::test]
async fn writes_deterministic_filenames() {
    let root = tempdir().unwrap();
    let exporter = Exporter::new(FixtureSource::pct(), config(root.path()))
        .with_pdf_renderer(FakePdfRenderer);

    let report = exporter.run("PCT").await.unwrap();
    assert_eq!(report.written.len(), 18);

    let names = files_in(&report.output_dir);
    assert_eq!(names.len(), 18 + 6 + 1);
    for stem in [
        "PCT_10-Q_2024-05-09",
        "PCT_10-Q_2023-11-08",
        "PCT_10-Q_2023-08-09",
        "PCT_10-Q_2023-05-10",
        "PCT_10-K_2024-03-01",
        "PCT_S-1_2021-05-01",
    ] {
        for ext in ["html", "md", "txt", "pdf"] {
            let name = format!("{}.{}", stem, ext);
            assert!(names.contains(&name), "missing {}", name);
        }
    }
    assert!(names.contains(&"PCT_filings.epub".to_string()));
    assert_eq!(
        report.epub.as_deref(),
        Some(report.output_dir.join("PCT_filings.epub").as_path())
    );
}

#[tokio::test]
async fn html_is_written_as_downloaded() {
    let root = tempdir().unwrap();
    let source = FixtureSource::pct().with_document(pct::Q1_2024, "<p>First quarter</p>");
    let exporter = Exporter::new(source, config(root.path()).with_pdf(false));

    exporter.run("PCT").await.unwrap();

    let html = fs::read_to_string(root.path().join("PCT/PCT_10-Q_2024-05-09.html")).unwrap();
    assert_eq!(html, "<p>First quarter</p>");
}

#[cfg(feature = "text")]
#[tokio::test]
async fn text_output_drops_markup() {
    let root = tempdir().unwrap();
    let exporter = Exporter::new(
        FixtureSource::pct(),
        config(root.path())
            .with_formats(vec![Format::Text])
            .with_epub(false)
            .with_pdf(false),
    );

    exporter.run("PCT").await.unwrap();

    let text = fs::read_to_string(root.path().join("PCT/PCT_10-K_2024-03-01.txt")).unwrap();
    assert!(text.contains("Management's Discussion and Analysis"));
    assert!(text.contains("85.6"));
    assert!(!text.contains("<table>"));
}

#[cfg(all(feature = "markdown", feature = "text", feature = "epub"))]
#[tokio::test]
async fn failing_format_does_not_block_others() {
    let root = tempdir().unwrap();
    let source = FixtureSource::pct().with_failing_format(pct::ANNUAL_2023, Format::Markdown);
    let exporter = Exporter::new(source, config(root.path()).with_pdf(false));

    let report = exporter.run("PCT").await.unwrap();
    let dir = root.path().join("PCT");

    assert!(!dir.join("PCT_10-K_2024-03-01.md").exists());
    assert!(dir.join("PCT_10-K_2024-03-01.html").exists());
    assert!(dir.join("PCT_10-K_2024-03-01.txt").exists());
    assert!(dir.join("PCT_10-Q_2024-05-09.md").exists());
    assert!(dir.join("PCT_S-1_2021-05-01.md").exists());

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.stage, Stage::Render(Format::Markdown));
    assert_eq!(failure.filing.as_deref(), Some("10-K 2024-03-01"));
    assert!(matches!(failure.error, EdgarError::RenderError { .. }));
}

#[cfg(all(feature = "markdown", feature = "text", feature = "epub"))]
#[tokio::test]
async fn failed_download_skips_only_that_filing() {
    let root = tempdir().unwrap();
    let source = FixtureSource::pct().with_broken_download(pct::PROSPECTUS);
    let exporter = Exporter::new(source, config(root.path())).with_pdf_renderer(FakePdfRenderer);

    let report = exporter.run("PCT").await.unwrap();

    let names = files_in(&report.output_dir);
    assert!(!names.iter().any(|n| n.starts_with("PCT_S-1_")));
    assert!(names.contains(&"PCT_10-K_2024-03-01.html".to_string()));
    assert_eq!(report.pdfs.len(), 5);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, Stage::Download);
}

#[cfg(all(feature = "markdown", feature = "text", feature = "epub"))]
#[tokio::test]
async fn no_html_means_no_epub() {
    let root = tempdir().unwrap();
    let source = FixtureSource::pct().with_failing_format_everywhere(Format::Html);
    let exporter = Exporter::new(source, config(root.path())).with_pdf_renderer(FakePdfRenderer);

    let report = exporter.run("PCT").await.unwrap();

    assert!(report.epub.is_none());
    assert!(report.pdfs.is_empty());
    assert!(!root.path().join("PCT/PCT_filings.epub").exists());
    assert!(report
        .failures
        .iter()
        .all(|f| f.stage == Stage::Render(Format::Html)));
    assert_eq!(report.failures.len(), 6);
}

#[tokio::test]
async fn blank_documents_produce_no_bundles() {
    let root = tempdir().unwrap();
    let source = FixtureSource::pct().with_default_document("   ");
    let exporter = Exporter::new(
        source,
        config(root.path()).with_formats(vec![Format::Html]),
    )
    .with_pdf_renderer(FakePdfRenderer);

    let report = exporter.run("PCT").await.unwrap();

    assert_eq!(report.written.len(), 6);
    assert!(report.epub.is_none());
    assert!(report.pdfs.is_empty());
    assert!(report.is_complete());
}

#[cfg(feature = "epub")]
#[tokio::test]
async fn epub_has_one_chapter_per_filing() {
    use std::io::Read;

    let root = tempdir().unwrap();
    let exporter = Exporter::new(
        FixtureSource::pct(),
        config(root.path())
            .with_formats(vec![Format::Markdown])
            .with_pdf(false),
    );

    let report = exporter.run("PCT").await.unwrap();

    // HTML is rendered for the bundle even though only Markdown is persisted.
    assert!(!root.path().join("PCT/PCT_10-K_2024-03-01.html").exists());

    let epub = report.epub.expect("EPUB should be written");
    let mut archive = zip::ZipArchive::new(fs::File::open(epub).unwrap()).unwrap();
    assert_eq!(archive.by_index(0).unwrap().name(), "mimetype");

    let chapters = archive
        .file_names()
        .filter(|name| name.starts_with("OEBPS/chapter_"))
        .count();
    assert_eq!(chapters, 6);

    let mut opf = String::new();
    archive
        .by_name("OEBPS/content.opf")
        .unwrap()
        .read_to_string(&mut opf)
        .unwrap();
    assert!(opf.contains("PCT_1830033"));
    assert!(opf.contains("PureCycle Technologies, Inc. SEC Filings"));

    let mut chapter = String::new();
    archive
        .by_name("OEBPS/chapter_5.xhtml")
        .unwrap()
        .read_to_string(&mut chapter)
        .unwrap();
    assert!(chapter.contains("<title>10-K - 2024-03-01</title>"));
    assert!(chapter.contains("85.6"));
    assert!(!chapter.contains("<script"));
    assert!(!chapter.contains("ix:"));
}

#[cfg(all(feature = "markdown", feature = "text", feature = "epub"))]
#[tokio::test]
async fn rerun_overwrites_previous_output() {
    let root = tempdir().unwrap();
    let path = root.path().join("PCT/PCT_10-Q_2024-05-09.html");

    let first = FixtureSource::pct().with_document(pct::Q1_2024, "<p>first run with more text</p>");
    Exporter::new(first, config(root.path()).with_pdf(false))
        .run("PCT")
        .await
        .unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "<p>first run with more text</p>");

    let second = FixtureSource::pct().with_document(pct::Q1_2024, "<p>second</p>");
    let report = Exporter::new(second, config(root.path()).with_pdf(false))
        .run("PCT")
        .await
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(fs::read_to_string(&path).unwrap(), "<p>second</p>");
}

#[cfg(all(feature = "markdown", feature = "text", feature = "epub"))]
#[tokio::test]
async fn missing_pdf_backend_is_reported_once() {
    let root = tempdir().unwrap();
    let exporter = Exporter::new(
        FixtureSource::pct(),
        config(root.path()).with_formats(vec![Format::Html]),
    )
    .with_pdf_renderer(MissingPdfRenderer);

    let report = exporter.run("PCT").await.unwrap();

    assert_eq!(report.written.len(), 6);
    assert!(report.pdfs.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, Stage::Pdf);
    assert!(matches!(
        report.failures[0].error,
        EdgarError::BackendUnavailable(_)
    ));
}

#[tokio::test]
async fn unknown_ticker_is_fatal() {
    let root = tempdir().unwrap();
    let exporter = Exporter::new(FixtureSource::pct(), config(root.path()));

    let result = exporter.run("zzzz").await;

    assert!(matches!(result, Err(EdgarError::TickerNotFound(ticker)) if ticker == "ZZZZ"));
    assert!(!root.path().join("ZZZZ").exists());
}

#[tokio::test]
async fn missing_prospectus_follows_policy() {
    let root = tempdir().unwrap();

    let failing = Exporter::new(
        FixtureSource::pct().without_form("S-1"),
        config(root.path()).with_pdf(false),
    );
    let result = failing.run("PCT").await;
    assert!(matches!(result, Err(EdgarError::MissingForm(form)) if form == "S-1"));
    assert!(!root.path().join("PCT").exists());

    let skipping = Exporter::new(
        FixtureSource::pct().without_form("S-1"),
        config(root.path())
            .with_pdf(false)
            .with_policy(SelectionPolicy::new().with_missing(MissingFormPolicy::Skip)),
    );
    let report = skipping.run("PCT").await.unwrap();
    assert_eq!(report.selected.len(), 5);
    assert_eq!(report.selected[4].form, "10-K");
}

#[tokio::test]
async fn output_root_must_exist() {
    let root = tempdir().unwrap();
    let missing_root = root.path().join("does-not-exist");
    let exporter = Exporter::new(FixtureSource::pct(), config(&missing_root));

    let result = exporter.run("PCT").await;

    assert!(matches!(result, Err(EdgarError::FileError(_))));
    assert!(!missing_root.exists());
}
