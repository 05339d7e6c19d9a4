//! Integration tests for token extraction from real PDF bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use docrank::error::Error;
use docrank::source::{PageSource, PdfSource};
use docrank::{extract_outline, extract_sections_from_file, HeadingLevel, OutlineOptions};

fn text(font: &str, size: i64, x: i64, y: i64, body: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(body)]),
        Operation::new("ET", vec![]),
    ]
}

/// An A4 document with one page per operation list. `F1` is Helvetica-Bold,
/// `F2` is Helvetica.
fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => bold_id,
            "F2" => regular_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Two pages, each with a bold heading and two body lines.
fn sample_pdf() -> Vec<u8> {
    let pages = [
        ("Overview", "quiet beaches here", "and warm water"),
        ("Details", "hotels near the coast", "open all year"),
    ];
    let pages = pages
        .into_iter()
        .map(|(heading, first, second)| {
            let mut operations = text("F1", 18, 50, 720, heading);
            operations.push(Operation::new("rg", vec![1.into(), 0.into(), 0.into()]));
            operations.extend(text("F2", 12, 72, 690, first));
            operations.extend(text("F2", 12, 72, 674, second));
            operations
        })
        .collect();
    build_pdf(pages)
}

/// A TJ show operator over string pieces and adjustments.
fn kerned(font: &str, size: i64, x: i64, y: i64, items: Vec<Object>) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("TJ", vec![Object::Array(items)]),
        Operation::new("ET", vec![]),
    ]
}

#[test]
fn test_pdf_tokens_positions_and_style() {
    let source = PdfSource::from_bytes(&sample_pdf()).unwrap();
    assert_eq!(source.page_count(), 2);

    let tokens = source.page_tokens(0).unwrap();
    let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(
        words,
        vec!["Overview", "quiet", "beaches", "here", "and", "warm", "water"]
    );

    let heading = &tokens[0];
    assert_eq!(heading.font_name, "Helvetica-Bold");
    assert!(heading.is_bold());
    assert!((heading.font_size - 18.0).abs() < 0.01);
    assert!((heading.x0 - 50.0).abs() < 0.01);
    // Top-down: 842 - (720 + 0.8 * 18)
    assert!((heading.top - 107.6).abs() < 0.01);
    assert!(heading.color.is_none());

    let body = &tokens[1];
    assert_eq!(body.font_name, "Helvetica");
    assert!(!body.is_bold());
    assert!(body.top > heading.top);
    assert_eq!(body.color.as_ref().map(|c| c.components().len()), Some(3));

    // Words of one line share a top edge and advance left to right.
    assert_eq!(tokens[1].top, tokens[2].top);
    assert!(tokens[2].x0 > tokens[1].x0);
}

#[test]
fn test_pdf_outline() {
    let source = PdfSource::from_bytes(&sample_pdf()).unwrap();
    let outline = extract_outline(&source, &OutlineOptions::default()).unwrap();

    assert_eq!(outline.title, "Overview");
    let headings: Vec<(HeadingLevel, &str, u32)> = outline
        .iter()
        .map(|h| (h.level, h.text.as_str(), h.page))
        .collect();
    assert_eq!(
        headings,
        vec![
            (HeadingLevel::H1, "Overview", 1),
            (HeadingLevel::H1, "Details", 2),
        ]
    );
}

#[test]
fn test_pdf_sections_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.pdf");
    std::fs::write(&path, sample_pdf()).unwrap();

    let sections = extract_sections_from_file(&path).unwrap();

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].document, "guide.pdf");
    assert_eq!(sections[0].section_title, "Overview");
    assert_eq!(
        sections[0].full_text,
        "Overview\nquiet beaches here\nand warm water"
    );
    assert_eq!(sections[1].page_number, 2);
    assert_eq!(
        sections[1].full_text,
        "Details\nhotels near the coast\nopen all year"
    );
}

#[test]
fn test_invalid_pdf_bytes() {
    let result = PdfSource::from_bytes(b"definitely not a pdf");
    assert!(matches!(result, Err(Error::PdfParse(_))));
}

#[test]
fn test_kerned_tj_keeps_words_whole() {
    let mut operations = kerned(
        "F1",
        18,
        50,
        720,
        vec![
            Object::string_literal("Intro"),
            (-15).into(),
            Object::string_literal("duction"),
        ],
    );
    operations.extend(kerned(
        "F2",
        12,
        72,
        690,
        vec![
            Object::string_literal("wide"),
            (-250).into(),
            Object::string_literal("gap"),
            20.into(),
            Object::string_literal("s"),
        ],
    ));
    let source = PdfSource::from_bytes(&build_pdf(vec![operations])).unwrap();

    let tokens = source.page_tokens(0).unwrap();
    let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(words, vec!["Introduction", "wide", "gaps"]);
    assert!((tokens[0].x0 - 50.0).abs() < 0.01);
    assert!(tokens[2].x0 > tokens[1].x0);
}

#[test]
fn test_kerned_heading_in_outline() {
    let mut operations = kerned(
        "F1",
        18,
        50,
        720,
        vec![
            Object::string_literal("1. Intro"),
            (-15).into(),
            Object::string_literal("duction"),
        ],
    );
    for row in 0..6 {
        operations.extend(text("F2", 12, 72, 690 - row * 16, "plain body text here"));
    }
    let source = PdfSource::from_bytes(&build_pdf(vec![operations])).unwrap();

    let outline = extract_outline(&source, &OutlineOptions::default()).unwrap();
    assert_eq!(outline.title, "1. Introduction");
    assert_eq!(outline.headings.len(), 1);
    assert_eq!(outline.headings[0].level, HeadingLevel::H1);
    assert_eq!(outline.headings[0].text, "1. Introduction");
}
