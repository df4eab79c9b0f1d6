//! Template PDFs built in memory for the integration tests

use lopdf::{dictionary, Document, Object, Stream};

/// Login/password block as the template generator writes it.
pub const PLACEHOLDER_BLOCK: &str = "/C2_0 19.2 Tf\n\
0.6375 0 0 0.6375 157.2973 535.605 Tm\n\
[(L)4(OGIN)-2(_)]TJ\n\
372.799 0 Td\n\
[(SEN)3(HA)]TJ";

/// Build a template with `page_count` pages; the page at `placeholder_page`
/// (if any) carries the login/password block. Pages share one indirect
/// resources dictionary.
pub fn template(page_count: usize, placeholder_page: Option<usize>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let courier = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => helvetica,
            "C2_0" => courier,
        },
    });

    let mut kids = Vec::new();
    for idx in 0..page_count {
        let mut content = format!("BT\n/F1 12 Tf\n50 700 Td\n(Page {}) Tj\nET\n", idx + 1);
        if placeholder_page == Some(idx) {
            content.push_str(&format!("BT\n{}\nET\n", PLACEHOLDER_BLOCK));
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
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

/// Decoded content of every page, in page order.
pub fn page_contents(pdf: &[u8]) -> Vec<Vec<u8>> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|id| doc.get_page_content(*id).unwrap())
        .collect()
}

pub fn page_text(pdf: &[u8], page_index: usize) -> String {
    String::from_utf8_lossy(&page_contents(pdf)[page_index]).into_owned()
}
