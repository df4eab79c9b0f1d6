//! In-memory template builders for unit tests

use crate::page::compressed_stream;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Text block produced by the template generator for the login/password pair.
pub const PLACEHOLDER_BLOCK: &str = "/C2_0 19.2 Tf\n\
0.6375 0 0 0.6375 157.2973 535.605 Tm\n\
[(L)4(OGIN)-2(_)]TJ\n\
372.799 0 Td\n\
[(SEN)3(HA)]TJ";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageKind {
    Plain,
    Placeholder,
    DoublePlaceholder,
    Empty,
}

#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub kind: PageKind,
    pub split: bool,
    pub compress: bool,
}

impl PageSpec {
    pub fn plain() -> Self {
        Self {
            kind: PageKind::Plain,
            split: false,
            compress: false,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            kind: PageKind::Placeholder,
            ..Self::plain()
        }
    }

    pub fn double_placeholder() -> Self {
        Self {
            kind: PageKind::DoublePlaceholder,
            ..Self::plain()
        }
    }

    pub fn empty() -> Self {
        Self {
            kind: PageKind::Empty,
            ..Self::plain()
        }
    }

    pub fn with_content_split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    fn content(&self, page_num: usize) -> String {
        let body = format!("BT\n/F1 12 Tf\n50 700 Td\n(Page-{}) Tj\nET\n", page_num);
        match self.kind {
            PageKind::Plain | PageKind::Empty => body,
            PageKind::Placeholder => format!("{}q\nBT\n{}\nET\nQ\n", body, PLACEHOLDER_BLOCK),
            PageKind::DoublePlaceholder => format!(
                "{}BT\n{}\nET\nBT\n{}\nET\n",
                body, PLACEHOLDER_BLOCK, PLACEHOLDER_BLOCK
            ),
        }
    }
}

fn content_stream(bytes: &[u8], compress: bool) -> Stream {
    if compress {
        compressed_stream(Dictionary::new(), bytes).unwrap()
    } else {
        Stream::new(Dictionary::new(), bytes.to_vec())
    }
}

/// Build a PDF whose pages share one indirect resources dictionary.
pub fn build_pdf(pages: &[PageSpec]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let template_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => helvetica,
            "C2_0" => template_font,
        },
    });

    let mut kids = Vec::new();
    for (idx, spec) in pages.iter().enumerate() {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };

        if spec.kind != PageKind::Empty {
            let content = spec.content(idx + 1);
            let bytes = content.as_bytes();
            if spec.split {
                let (head, tail) = bytes.split_at(bytes.len() / 2);
                let a = doc.add_object(content_stream(head, spec.compress));
                let b = doc.add_object(content_stream(tail, spec.compress));
                page.set(
                    "Contents",
                    vec![Object::Reference(a), Object::Reference(b)],
                );
            } else {
                let id = doc.add_object(content_stream(bytes, spec.compress));
                page.set("Contents", id);
            }
        }

        kids.push(Object::Reference(doc.add_object(page)));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
