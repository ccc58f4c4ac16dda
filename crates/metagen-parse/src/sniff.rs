//! Cheap detection of a model file's root element.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{ParseError, Result};

/// Resolve the qualified name of the root element of an XML file.
///
/// Reading stops at the first start tag; the rest of the file is not parsed.
pub fn resolve_root_element_name(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|err| ParseError::RootNameNotFound {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    resolve_root_element(BufReader::new(file), path)
}

/// Resolve the root element name from any buffered XML source.
pub fn resolve_root_element<R: BufRead>(source: R, path: &Path) -> Result<String> {
    let not_found = |reason: String| ParseError::RootNameNotFound {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                return Ok(String::from_utf8_lossy(element.name().as_ref()).into_owned());
            }
            Ok(Event::Text(text)) => {
                return Err(not_found(format!(
                    "content before root element: '{}'",
                    String::from_utf8_lossy(&text)
                )));
            }
            Ok(Event::Eof) => return Err(not_found("document has no root element".to_string())),
            Ok(_) => {}
            Err(err) => {
                return Err(not_found(format!(
                    "error at position {}: {err}",
                    reader.error_position()
                )));
            }
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sniff(xml: &str) -> Result<String> {
        resolve_root_element(xml.as_bytes(), Path::new("inline.xml"))
    }

    #[test]
    fn returns_first_element_name() {
        let xml = r#"<?xml version="1.0"?>
<!-- relations of the crm domain -->
<relation-set><relation id="r1"/></relation-set>"#;
        assert_eq!(sniff(xml).expect("root"), "relation-set");
    }

    #[test]
    fn keeps_namespace_prefix() {
        assert_eq!(sniff("<m:process xmlns:m=\"urn:m\"/>").expect("root"), "m:process");
    }

    #[test]
    fn stops_before_broken_content() {
        assert_eq!(sniff("<view id=\"v\"><broken</view>").expect("root"), "view");
    }

    #[test]
    fn empty_document_is_an_error() {
        assert!(matches!(sniff(""), Err(ParseError::RootNameNotFound { .. })));
    }

    #[test]
    fn text_before_root_is_an_error() {
        assert!(matches!(
            sniff("not xml at all"),
            Err(ParseError::RootNameNotFound { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = resolve_root_element_name(Path::new("/definitely/missing/model.xml"));
        assert!(matches!(result, Err(ParseError::RootNameNotFound { .. })));
    }
}
