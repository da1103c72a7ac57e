//! Multi-chapter EPUB packaging.
//!
//! An EPUB is a zip archive with a fixed layout:
//!
//! ```text
//! mimetype                  stored, must be the first entry
//! META-INF/container.xml    points at the package document
//! OEBPS/content.opf         metadata, manifest, spine
//! OEBPS/nav.xhtml           EPUB 3 table of contents
//! OEBPS/toc.ncx             EPUB 2 table of contents for older readers
//! OEBPS/chapter_N.xhtml     one per filing
//! ```
//!
//! Filing HTML is rarely valid XHTML, so each chapter body is re-serialized from a
//! parsed DOM before it goes into the archive.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html, Node};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::Result;

const MIMETYPE: &str = "application/epub+zip";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Elements emitted as self-closing tags.
const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "hr", "source", "track", "wbr"];

/// Elements dropped along with their content.
const DROPPED_ELEMENTS: &[&str] = &[
    "base", "button", "embed", "head", "iframe", "img", "input", "link", "math", "meta",
    "noscript", "object", "param", "script", "select", "style", "svg", "template",
    "textarea", "title", "ix:header",
];

/// Book-level metadata written to the package document.
#[derive(Debug, Clone)]
pub struct EpubMetadata {
    pub identifier: String,
    pub title: String,
    pub language: String,
    pub author: String,
    pub modified: DateTime<Utc>,
}

impl EpubMetadata {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            language: "en".to_string(),
            author: "SEC EDGAR".to_string(),
            modified: Utc::now(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = modified;
        self
    }
}

#[derive(Debug, Clone)]
struct Chapter {
    title: String,
    body: String,
}

impl Chapter {
    fn file_name(index: usize) -> String {
        format!("chapter_{}.xhtml", index + 1)
    }

    fn id(index: usize) -> String {
        format!("chapter_{}", index + 1)
    }
}

/// Collects chapters and serializes them into an EPUB archive.
#[derive(Debug, Clone)]
pub struct EpubBuilder {
    metadata: EpubMetadata,
    chapters: Vec<Chapter>,
}

impl EpubBuilder {
    pub fn new(metadata: EpubMetadata) -> Self {
        Self {
            metadata,
            chapters: Vec::new(),
        }
    }

    /// Adds one chapter from an HTML document.
    ///
    /// Blank documents are ignored; returns whether a chapter was added.
    pub fn add_chapter(&mut self, title: impl Into<String>, html: &str) -> bool {
        if html.trim().is_empty() {
            return false;
        }
        self.chapters.push(Chapter {
            title: title.into(),
            body: to_xhtml_body(html),
        });
        true
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Serializes the book, or returns `None` when no chapter was added.
    pub fn build(&self) -> Result<Option<Vec<u8>>> {
        if self.chapters.is_empty() {
            return Ok(None);
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored)?;
        zip.write_all(MIMETYPE.as_bytes())?;

        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML.as_bytes())?;

        zip.start_file("OEBPS/content.opf", deflated)?;
        zip.write_all(self.package_document().as_bytes())?;

        zip.start_file("OEBPS/nav.xhtml", deflated)?;
        zip.write_all(self.nav_document().as_bytes())?;

        zip.start_file("OEBPS/toc.ncx", deflated)?;
        zip.write_all(self.ncx_document().as_bytes())?;

        for (index, chapter) in self.chapters.iter().enumerate() {
            zip.start_file(format!("OEBPS/{}", Chapter::file_name(index)), deflated)?;
            zip.write_all(self.chapter_document(chapter).as_bytes())?;
        }

        let cursor = zip.finish()?;
        Ok(Some(cursor.into_inner()))
    }

    fn package_document(&self) -> String {
        let meta = &self.metadata;
        let mut manifest = String::from(
            "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n    \
             <item id=\"nav\" href=\"nav.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>\n",
        );
        let mut spine = String::from("    <itemref idref=\"nav\"/>\n");

        for index in 0..self.chapters.len() {
            manifest.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
                Chapter::id(index),
                Chapter::file_name(index)
            ));
            spine.push_str(&format!("    <itemref idref=\"{}\"/>\n", Chapter::id(index)));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="book-id" xml:lang="{lang}">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="book-id">{identifier}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>{lang}</dc:language>
    <dc:creator>{author}</dc:creator>
    <meta property="dcterms:modified">{modified}</meta>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#,
            lang = encode_double_quoted_attribute(&meta.language),
            identifier = encode_text(&meta.identifier),
            title = encode_text(&meta.title),
            author = encode_text(&meta.author),
            modified = meta.modified.format("%Y-%m-%dT%H:%M:%SZ"),
            manifest = manifest,
            spine = spine,
        )
    }

    fn nav_document(&self) -> String {
        let entries: String = self
            .chapters
            .iter()
            .enumerate()
            .map(|(index, chapter)| {
                format!(
                    "      <li><a href=\"{}\">{}</a></li>\n",
                    Chapter::file_name(index),
                    encode_text(&chapter.title)
                )
            })
            .collect();

        let title = encode_text(&self.metadata.title);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>{title}</title></head>
<body>
  <nav epub:type="toc" id="toc">
    <h1>{title}</h1>
    <ol>
{entries}    </ol>
  </nav>
</body>
</html>
"#
        )
    }

    fn ncx_document(&self) -> String {
        let points: String = self
            .chapters
            .iter()
            .enumerate()
            .map(|(index, chapter)| {
                format!(
                    "    <navPoint id=\"navpoint-{n}\" playOrder=\"{n}\">\n      \
                     <navLabel><text>{label}</text></navLabel>\n      \
                     <content src=\"{src}\"/>\n    </navPoint>\n",
                    n = index + 1,
                    label = encode_text(&chapter.title),
                    src = Chapter::file_name(index)
                )
            })
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{uid}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>
{points}  </navMap>
</ncx>
"#,
            uid = encode_double_quoted_attribute(&self.metadata.identifier),
            title = encode_text(&self.metadata.title),
            points = points,
        )
    }

    fn chapter_document(&self, chapter: &Chapter) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}" lang="{lang}">
<head><title>{title}</title></head>
<body>
{body}
</body>
</html>
"#,
            lang = encode_double_quoted_attribute(&self.metadata.language),
            title = encode_text(&chapter.title),
            body = chapter.body,
        )
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Re-serializes the `<body>` of an HTML document as well-formed XHTML.
///
/// Scripts, styles, images, form controls and inline XBRL header metadata are
/// dropped. Elements whose names are not plain XML names (inline XBRL `ix:*`
/// wrappers, for one) are unwrapped so their text survives.
pub fn to_xhtml_body(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "body")
        .unwrap_or(root);

    let mut out = String::with_capacity(html.len());
    write_children(body, &mut out);
    out
}

fn write_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&encode_text(&**text)),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if DROPPED_ELEMENTS.contains(&name) {
        return;
    }
    if !is_xml_name(name) {
        write_children(element, out);
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr, value) in element.value().attrs() {
        if !is_xml_name(attr) || attr.starts_with("on") || attr == "xmlns" {
            continue;
        }
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }

    if VOID_ELEMENTS.contains(&name) {
        out.push_str("/>");
        return;
    }

    out.push('>');
    write_children(element, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}
