//! Integration tests for generate_datasheet() end-to-end pipeline.
//!
//! Uses a MockExtractor and a MockSummarizer so these tests run without
//! poppler-utils or network access.

use std::cell::RefCell;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use expsheet_core::error::ExpsheetError;
use expsheet_core::export::{self, xlsx::write_xlsx, DEFAULT_FILE_NAME, DEFAULT_SHEET_NAME};
use expsheet_core::extraction::{DocumentSource, PageContent, PdfExtractor};
use expsheet_core::generate_datasheet;
use expsheet_core::summarize::Summarizer;

struct MockExtractor {
    pages: Vec<PageContent>,
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ExpsheetError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

/// Replies with a canned response and remembers the text it was given.
struct MockSummarizer {
    reply: Result<String, String>,
    received: RefCell<Option<String>>,
}

impl MockSummarizer {
    fn replying(reply: &str) -> Self {
        MockSummarizer {
            reply: Ok(reply.to_string()),
            received: RefCell::new(None),
        }
    }

    fn failing(message: &str) -> Self {
        MockSummarizer {
            reply: Err(message.to_string()),
            received: RefCell::new(None),
        }
    }
}

impl Summarizer for MockSummarizer {
    fn summarize(&self, document_text: &str) -> Result<String, ExpsheetError> {
        *self.received.borrow_mut() = Some(document_text.to_string());
        self.reply.clone().map_err(ExpsheetError::Transport)
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn page(number: usize, lines: &[&str]) -> PageContent {
    PageContent {
        page_number: number,
        lines: lines.iter().map(|s| s.to_string()).collect(),
    }
}

fn no_pdf() -> MockExtractor {
    MockExtractor { pages: vec![] }
}

fn text_doc(name: &str, text: &str) -> DocumentSource {
    DocumentSource::from_bytes(name, text.as_bytes().to_vec()).unwrap()
}

const MODEL_REPLY: &str = "\
다음은 요청하신 데이터시트입니다.

| 사용자 | 사용일시 | 사용 장소 | 집행목적 | 인원 | 금액 | 방법 | 비목 |
|--------|----------|-----------|----------|------|------|------|------|
| 과장 | 2024-03-04 12:10 | 한우마을 | 업무협의 간담회 | 4 | 120,000 | 카드 | 시책추진업무추진비 |
| 국장 | 2024-03-05 18:30 | 청사식당 | 유관기관 협력 | 3 | 45,000 | 현금 | 기관운영업무추진비 |

추가로 필요한 내용이 있으면 말씀해 주세요.
";

// ---------------------------------------------------------------------------
// Test 1: Plain-text document through to a parsed datasheet
// ---------------------------------------------------------------------------
#[test]
fn text_document_to_datasheet() {
    let summarizer = MockSummarizer::replying(MODEL_REPLY);
    let sources = vec![text_doc("march.txt", "시책추진업무추진비 집행내역")];

    let sheet = generate_datasheet(&sources, &no_pdf(), &summarizer).unwrap();

    assert_eq!(sheet.document_count, 1);
    assert_eq!(
        sheet.records.columns(),
        &["사용자", "사용일시", "사용 장소", "집행목적", "인원", "금액", "방법", "비목"]
    );
    assert_eq!(sheet.records.len(), 2);
    assert_eq!(sheet.records.value(0, "사용 장소"), Some("한우마을"));
    assert_eq!(sheet.records.value(1, "방법"), Some("현금"));
    assert_eq!(sheet.raw_response, MODEL_REPLY);
}

// ---------------------------------------------------------------------------
// Test 2: PDF pages and text files are concatenated in order
// ---------------------------------------------------------------------------
#[test]
fn documents_concatenated_in_order() {
    let extractor = MockExtractor {
        pages: vec![
            page(1, &["기관운영업무추진비", "2024-03-05 청사식당 45,000"]),
            page(2, &["합계 45,000"]),
        ],
    };
    let summarizer = MockSummarizer::replying(MODEL_REPLY);
    let sources = vec![
        text_doc("a.txt", "첫 문서"),
        DocumentSource::from_bytes("b.pdf", vec![0x25, 0x50, 0x44, 0x46]).unwrap(),
    ];

    let sheet = generate_datasheet(&sources, &extractor, &summarizer).unwrap();

    let received = summarizer.received.borrow().clone().unwrap();
    assert_eq!(
        received,
        "첫 문서\n기관운영업무추진비\n2024-03-05 청사식당 45,000\n합계 45,000\n"
    );
    assert_eq!(sheet.document_count, 2);
    assert_eq!(sheet.document_chars, received.chars().count());
}

// ---------------------------------------------------------------------------
// Test 3: Model reply without a table is a user-visible error
// ---------------------------------------------------------------------------
#[test]
fn reply_without_table_fails() {
    let summarizer = MockSummarizer::replying("죄송합니다. 표를 만들 수 있는 데이터가 없습니다.");
    let err = generate_datasheet(&[text_doc("a.txt", "x")], &no_pdf(), &summarizer).unwrap_err();
    assert!(matches!(err, ExpsheetError::TableNotFound));
}

// ---------------------------------------------------------------------------
// Test 4: Transport failures propagate unchanged
// ---------------------------------------------------------------------------
#[test]
fn transport_error_propagates() {
    let summarizer = MockSummarizer::failing("connection refused");
    let err = generate_datasheet(&[text_doc("a.txt", "x")], &no_pdf(), &summarizer).unwrap_err();
    assert!(matches!(err, ExpsheetError::Transport(ref m) if m == "connection refused"));
}

// ---------------------------------------------------------------------------
// Test 5: Read errors stop the run before the summarizer is called
// ---------------------------------------------------------------------------
#[test]
fn read_error_skips_summarizer() {
    let summarizer = MockSummarizer::replying(MODEL_REPLY);
    let bad = DocumentSource::from_bytes("bad.txt", vec![0xc3, 0x28]).unwrap();

    let err = generate_datasheet(&[bad], &no_pdf(), &summarizer).unwrap_err();

    assert!(matches!(err, ExpsheetError::Read { .. }));
    assert!(summarizer.received.borrow().is_none());
}

#[test]
fn no_documents_is_an_error() {
    let summarizer = MockSummarizer::replying(MODEL_REPLY);
    assert!(generate_datasheet(&[], &no_pdf(), &summarizer).is_err());
}

// ---------------------------------------------------------------------------
// Test 6: Header-only table is a valid, empty datasheet
// ---------------------------------------------------------------------------
#[test]
fn header_only_reply_gives_empty_datasheet() {
    let summarizer = MockSummarizer::replying("| 사용자 | 금액 |\n|---|---|\n");
    let sheet = generate_datasheet(&[text_doc("a.txt", "x")], &no_pdf(), &summarizer).unwrap();
    assert_eq!(sheet.records.columns().len(), 2);
    assert!(sheet.records.is_empty());
}

// ---------------------------------------------------------------------------
// Test 7: Datasheet exported to xlsx reads back with the same cells
// ---------------------------------------------------------------------------
#[test]
fn exported_workbook_matches_records() {
    let summarizer = MockSummarizer::replying(MODEL_REPLY);
    let sheet = generate_datasheet(&[text_doc("a.txt", "x")], &no_pdf(), &summarizer).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_FILE_NAME);
    export::write_file(&sheet.records, &path, DEFAULT_SHEET_NAME).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes, write_xlsx(&sheet.records, DEFAULT_SHEET_NAME).unwrap());

    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    let range = workbook.worksheet_range(DEFAULT_SHEET_NAME).unwrap();
    assert_eq!(range.get_size(), (3, 8));
    for (col, name) in sheet.records.columns().iter().enumerate() {
        assert_eq!(
            range.get_value((0, col as u32)),
            Some(&Data::String(name.clone()))
        );
    }
    assert_eq!(range.get_value((1, 5)), Some(&Data::String("120,000".into())));
    assert_eq!(range.get_value((2, 0)), Some(&Data::String("국장".into())));
}
