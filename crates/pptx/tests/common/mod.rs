//! In-memory PPTX fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// Minimal PNG signature plus junk, stored uncompressed like real media.
pub const IMAGE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n', 0, 0, 0, 13, 7, 7, 7];

pub struct DeckBuilder {
    entries: Vec<(String, Vec<u8>, CompressionMethod)>,
}

impl DeckBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            entries: Vec::new(),
        };
        builder.push(
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_vec(),
            CompressionMethod::Deflated,
        );
        builder.push(
            "ppt/presentation.xml",
            format!(r#"<p:presentation {}/>"#, NS).into_bytes(),
            CompressionMethod::Deflated,
        );
        builder
    }

    fn push(&mut self, name: &str, data: Vec<u8>, method: CompressionMethod) {
        self.entries.push((name.to_string(), data, method));
    }

    /// Add `ppt/slides/slide{n}.xml` and its relationship part.
    pub fn slide(mut self, n: usize, xml: String) -> Self {
        self.push(
            &format!("ppt/slides/slide{}.xml", n),
            xml.into_bytes(),
            CompressionMethod::Deflated,
        );
        self.push(
            &format!("ppt/slides/_rels/slide{}.xml.rels", n),
            br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#.to_vec(),
            CompressionMethod::Deflated,
        );
        self
    }

    pub fn part(mut self, name: &str, xml: String) -> Self {
        self.push(name, xml.into_bytes(), CompressionMethod::Deflated);
        self
    }

    pub fn image(mut self, name: &str) -> Self {
        self.push(name, IMAGE.to_vec(), CompressionMethod::Stored);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data, method) in &self.entries {
            let options = FileOptions::default().compression_method(*method);
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

/// Slide XML with one shape per paragraph; each paragraph is a list of runs
/// sized 24pt.
pub fn text_slide(paragraphs: &[&[&str]]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|runs| {
            let runs: String = runs
                .iter()
                .map(|t| format!(r#"<a:r><a:rPr lang="en-US" sz="2400"/><a:t>{}</a:t></a:r>"#, t))
                .collect();
            format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Text"/></p:nvSpPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p>{}</a:p></p:txBody></p:sp>"#,
                runs
            )
        })
        .collect();
    slide_with(&body)
}

/// Slide XML whose only shape is a picture.
pub fn image_slide() -> String {
    slide_with(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture 3"/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/></p:blipFill></p:pic>"#,
    )
}

pub fn slide_with(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr>{}</p:spTree></p:cSld></p:sld>"#,
        NS, shapes
    )
}

/// Style part carrying every font role.
pub fn styled_part(root: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<{root} {ns}><p:txStyles><p:titleStyle><a:lvl1pPr><a:defRPr sz="4400"><a:latin typeface="+mj-lt"/><a:ea typeface="+mj-ea"/><a:cs typeface="+mj-cs"/></a:defRPr></a:lvl1pPr></p:titleStyle></p:txStyles></{root}>"#,
        root = root,
        ns = NS
    )
}

/// Decompressed parts of a container, by name.
pub fn read_parts(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut parts = BTreeMap::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i).unwrap();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        parts.insert(file.name().to_string(), data);
    }
    parts
}

pub fn part_text(bytes: &[u8], name: &str) -> String {
    String::from_utf8(read_parts(bytes).remove(name).unwrap()).unwrap()
}
