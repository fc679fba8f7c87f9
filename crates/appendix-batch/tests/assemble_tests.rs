mod common;

use appendix_batch::*;
use common::*;
use lopdf::Document;

fn options(target_pages: usize) -> BatchOptions {
    BatchOptions {
        target_pages,
        ..Default::default()
    }
}

async fn run(files: &[InputFile], options: &BatchOptions) -> RunReport {
    BatchAssembler::default()
        .run(files, options, |_| {})
        .await
        .unwrap()
}

#[tokio::test]
async fn test_appendix_not_split_across_batches() {
    let files = vec![
        jpeg("Appendix 2 (2 of 2).jpg", 40, 60),
        pdf("Appendix 1.pdf", 3),
        jpeg("Appendix 2 (1 of 2).jpg", 40, 60),
    ];
    let report = run(&files, &options(4)).await;

    assert_eq!(report.appendices, 2);
    assert_eq!(report.total_planned_pages, 5);
    assert_eq!(report.pages_rendered, 5);
    assert!(report.issues.is_empty());

    let names: Vec<&str> = report.artifacts.iter().map(|a| a.file_name.as_str()).collect();
    assert_eq!(names, vec!["batch_001.pdf", "batch_002.pdf"]);
    assert_eq!(report.artifacts[0].pages, 3);
    assert_eq!(report.artifacts[1].pages, 2);
    assert_eq!(report.artifacts[1].start_label, "2");

    let rows: Vec<(&str, usize, usize, usize)> = report
        .manifest
        .rows()
        .iter()
        .map(|r| {
            (
                r.input_name.as_str(),
                r.batch,
                r.batch_page_start,
                r.batch_page_end,
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Appendix 1.pdf", 1, 1, 3),
            ("Appendix 2 (1 of 2).jpg", 2, 1, 1),
            ("Appendix 2 (2 of 2).jpg", 2, 2, 2),
        ]
    );

    for artifact in &report.artifacts {
        let doc = Document::load_mem(&artifact.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), artifact.pages);
    }
}

#[tokio::test]
async fn test_bad_names_are_reported_and_skipped() {
    let files = vec![
        InputFile::from_bytes("notes.txt", b"hello".to_vec()),
        pdf("Appendix A.pdf", 1),
    ];
    let report = run(&files, &options(50)).await;

    assert_eq!(
        report.issues,
        vec![RunIssue::Parse {
            name: "notes.txt".into()
        }]
    );
    assert_eq!(report.manifest.len(), 1);
    assert!(report
        .manifest
        .rows()
        .iter()
        .all(|r| r.input_name != "notes.txt"));
}

#[tokio::test]
async fn test_no_renderable_pages_fails_before_output() {
    let files = vec![
        InputFile::from_bytes("Appendix A.pdf", b"%PDF-broken".to_vec()),
        InputFile::from_bytes("readme.md", b"#".to_vec()),
    ];
    let mut events = Vec::new();
    let failure = BatchAssembler::default()
        .run(&files, &options(50), |e| events.push(e))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, BatchError::NoPages));
    assert!(failure.partial.artifacts.is_empty());
    assert!(events.is_empty());
    assert!(matches!(failure.partial.issues[0], RunIssue::Parse { .. }));
    assert!(matches!(failure.partial.issues[1], RunIssue::Probe { .. }));
}

#[tokio::test]
async fn test_empty_input_is_a_config_error() {
    let failure = BatchAssembler::default()
        .run(&[], &options(50), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(failure.error, BatchError::Config(_)));
}

#[tokio::test]
async fn test_undecodable_image_is_skipped_at_render_time() {
    let files = vec![
        pdf("Appendix A.pdf", 2),
        InputFile::from_bytes("Appendix A 3.png", b"not really a png".to_vec()),
        png("Appendix B.png", 30, 30),
    ];
    let report = run(&files, &options(50)).await;

    // The broken image planned one page but rendered none
    assert_eq!(report.total_planned_pages, 4);
    assert_eq!(report.pages_rendered, 3);
    assert_eq!(report.artifacts.len(), 1);
    assert!(matches!(
        &report.issues[..],
        [RunIssue::Decode { name, .. }] if name == "Appendix A 3.png"
    ));

    let ranges: Vec<(usize, usize)> = report
        .manifest
        .rows()
        .iter()
        .map(|r| (r.batch_page_start, r.batch_page_end))
        .collect();
    assert_eq!(ranges, vec![(1, 2), (3, 3)]);
}

#[tokio::test]
async fn test_canvas_orientation_follows_source() {
    let files = vec![
        pdf("Appendix A.pdf", 1),
        jpeg("Appendix B.jpg", 300, 200),
        jpeg("Appendix C.jpg", 100, 100),
        png("Appendix D.png", 100, 300),
    ];
    let report = run(&files, &options(50)).await;

    let sizes = page_sizes(&report.artifacts[0].bytes);
    assert_eq!(
        sizes,
        vec![
            (612.0, 792.0),
            (792.0, 612.0),
            (792.0, 612.0),
            (612.0, 792.0),
        ]
    );
}

#[tokio::test]
async fn test_header_text_is_stamped() {
    let files = vec![pdf("Appendix A.pdf", 1)];
    let report = run(
        &files,
        &BatchOptions {
            header_text: "Exhibit 7".into(),
            ..Default::default()
        },
    )
    .await;

    let doc = Document::load_mem(&report.artifacts[0].bytes).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let content = doc.get_page_content(page_id).unwrap();
    let text = String::from_utf8_lossy(&content);
    assert!(text.contains("Appendix A"));
    assert!(text.contains("Exhibit 7"));
    assert!(text.contains("/F1"));
}

#[tokio::test]
async fn test_manifest_ranges_cover_each_batch() {
    let mut files = Vec::new();
    for (i, letter) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
        files.push(pdf(&format!("Appendix {letter}.pdf"), i % 3 + 1));
        files.push(jpeg(&format!("Appendix {letter} 9.jpg"), 20, 10));
    }
    let report = run(&files, &options(5)).await;

    for artifact in &report.artifacts {
        let mut expected_start = 1;
        for row in report
            .manifest
            .rows()
            .iter()
            .filter(|r| r.batch == artifact.number)
        {
            assert_eq!(row.batch_page_start, expected_start);
            assert_eq!(
                row.batch_page_end - row.batch_page_start + 1,
                row.pages_in_item
            );
            expected_start = row.batch_page_end + 1;
        }
        assert_eq!(expected_start - 1, artifact.pages);
    }
}

#[tokio::test]
async fn test_progress_reaches_total() {
    let files = vec![pdf("Appendix A.pdf", 2), pdf("Appendix B.pdf", 2)];
    let mut events = Vec::new();
    BatchAssembler::new(ExecutionHost::Inline)
        .run(&files, &options(2), |e| events.push(e))
        .await
        .unwrap();

    let progress: Vec<Progress> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 3);
    assert_eq!(progress[0].pages_rendered, 0);
    assert_eq!(progress.last().unwrap().pages_rendered, 4);
    assert_eq!(progress.last().unwrap().percent(), 100.0);

    let saved = events
        .iter()
        .filter(|e| matches!(e, RunEvent::Saved { .. }))
        .count();
    assert_eq!(saved, 2);
}

#[tokio::test]
async fn test_save_outputs_and_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let files = vec![pdf("Appendix A.pdf", 1), pdf("Appendix B.pdf", 1)];
    let report = run(&files, &options(1)).await;

    let written = save_outputs(&report, &out).await.unwrap();
    assert_eq!(written.len(), 3);
    assert!(out.join("batch_001.pdf").exists());
    assert!(out.join("batch_002.pdf").exists());

    let manifest = std::fs::read_to_string(out.join("manifest.csv")).unwrap();
    assert_eq!(manifest.lines().count(), 3);
    assert!(manifest.starts_with("\"input_name\""));

    let bundle = save_bundle(&report, &out).await.unwrap();
    let archive = zip::ZipArchive::new(std::fs::File::open(bundle).unwrap()).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort();
    assert_eq!(names, vec!["batch_001.pdf", "batch_002.pdf", "manifest.csv"]);
}

#[tokio::test]
async fn test_inputs_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Appendix_3 (1 of 1).pdf");
    std::fs::write(&path, create_test_pdf(2, 842, 595)).unwrap();
    let missing = dir.path().join("Appendix 4.pdf");

    let files = vec![InputFile::from_path(&path), InputFile::from_path(&missing)];
    let report = run(&files, &options(50)).await;

    assert_eq!(report.pages_rendered, 2);
    assert_eq!(report.manifest.rows()[0].appendix_num, 3);
    assert_eq!(report.manifest.rows()[0].part_y, Some(1));
    // Documents always land on portrait canvases
    assert_eq!(
        page_sizes(&report.artifacts[0].bytes),
        vec![(612.0, 792.0), (612.0, 792.0)]
    );
    assert!(matches!(
        &report.issues[..],
        [RunIssue::Probe { name, .. }] if name == "Appendix 4.pdf"
    ));
}

#[tokio::test]
async fn test_page_that_fails_to_embed_is_skipped() {
    let files = vec![
        InputFile::from_bytes("Appendix A.pdf", create_pdf_with_missing_contents(3, 1)),
        pdf("Appendix B.pdf", 1),
    ];
    let report = run(&files, &options(50)).await;

    assert_eq!(report.total_planned_pages, 4);
    assert_eq!(report.pages_rendered, 3);
    assert!(matches!(
        &report.issues[..],
        [RunIssue::Embed { name, page_index: 1, .. }] if name == "Appendix A.pdf"
    ));

    let rows: Vec<(&str, usize, usize, usize)> = report
        .manifest
        .rows()
        .iter()
        .map(|r| {
            (
                r.input_name.as_str(),
                r.pages_in_item,
                r.batch_page_start,
                r.batch_page_end,
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![("Appendix A.pdf", 2, 1, 2), ("Appendix B.pdf", 1, 3, 3)]
    );

    let doc = Document::load_mem(&report.artifacts[0].bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[tokio::test]
async fn test_shared_missing_resource_fails_every_page() {
    let files = vec![
        InputFile::from_bytes("Appendix A.pdf", create_pdf_with_missing_font(3)),
        pdf("Appendix B.pdf", 1),
    ];
    let report = run(&files, &options(50)).await;

    assert_eq!(report.pages_rendered, 1);
    let failed_pages: Vec<usize> = report
        .issues
        .iter()
        .map(|issue| match issue {
            RunIssue::Embed { page_index, .. } => *page_index,
            other => panic!("unexpected issue: {other:?}"),
        })
        .collect();
    assert_eq!(failed_pages, vec![0, 1, 2]);

    assert_eq!(report.manifest.len(), 1);
    assert_eq!(report.manifest.rows()[0].input_name, "Appendix B.pdf");
    assert_eq!(report.manifest.rows()[0].batch_page_start, 1);
}
