#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Info dictionary entries for a generated PDF.
#[derive(Default)]
pub struct PdfInfoFixture<'a> {
    pub title: Option<&'a str>,
    pub created: Option<&'a str>,
    pub modified: Option<&'a str>,
}

/// A small PDF with one page per entry of `pages`, each showing that text.
pub fn pdf_bytes(pages: &[&str], info: PdfInfoFixture<'_>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info_dict = lopdf::Dictionary::new();
    if let Some(title) = info.title {
        info_dict.set("Title", Object::string_literal(title));
    }
    if let Some(created) = info.created {
        info_dict.set("CreationDate", Object::string_literal(created));
    }
    if let Some(modified) = info.modified {
        info_dict.set("ModDate", Object::string_literal(modified));
    }
    let info_id = doc.add_object(info_dict);
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

pub fn simple_pdf(text: &str) -> Vec<u8> {
    pdf_bytes(&[text], PdfInfoFixture::default())
}
