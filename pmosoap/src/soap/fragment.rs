//! Lecture superficielle d'un fragment XML (contenu d'un Body)
//!
//! Seuls l'élément racine et le texte de ses enfants directs sont lus.
//! Les préfixes sont ignorés : on compare les noms locaux.

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Error as XmlError, Reader};

use crate::errors::SoapParseError;

/// First element of a fragment and the text of its direct children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub root: String,
    pub children: Vec<(String, String)>,
}

impl Fragment {
    /// Text of the first direct child named `local_name`.
    pub fn child(&self, local_name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|(name, _)| name == local_name)
            .map(|(_, text)| text.as_str())
    }
}

pub(crate) fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Reads the first element of `content`.
///
/// Returns `None` when the fragment holds no element at all (empty body or
/// bare text). Text of nested descendants is concatenated into the text of
/// the direct child that contains them.
pub(crate) fn read_fragment(content: &[u8]) -> Result<Option<Fragment>, SoapParseError> {
    let mut reader = Reader::from_reader(content);

    let mut fragment: Option<Fragment> = None;
    let mut current: Option<(String, String)> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => {
                        fragment = Some(Fragment {
                            root: local_name(&e),
                            children: Vec::new(),
                        })
                    }
                    2 => current = Some((local_name(&e), String::new())),
                    _ => {}
                }
            }
            Event::Empty(e) => match depth {
                0 => {
                    return Ok(Some(Fragment {
                        root: local_name(&e),
                        children: Vec::new(),
                    }));
                }
                1 => {
                    if let Some(f) = fragment.as_mut() {
                        f.children.push((local_name(&e), String::new()));
                    }
                }
                _ => {}
            },
            Event::End(_) => {
                if depth == 2 {
                    if let (Some(f), Some(child)) = (fragment.as_mut(), current.take()) {
                        f.children.push(child);
                    }
                }
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            Event::Text(e) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&e.decode().map_err(XmlError::Encoding)?);
                }
            }
            Event::CData(e) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&e.decode().map_err(XmlError::Encoding)?);
                }
            }
            Event::GeneralRef(e) => {
                if let Some((_, text)) = current.as_mut() {
                    if let Some(ch) = e.resolve_char_ref()? {
                        text.push(ch);
                    } else {
                        let name = e.decode().map_err(XmlError::Encoding)?;
                        match resolve_predefined_entity(&name) {
                            Some(value) => text.push_str(value),
                            None => {
                                text.push('&');
                                text.push_str(&name);
                                text.push(';');
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_root_and_children() {
        let xml = br#"
            <ns1:AuthResponse xmlns:ns1="urn:x">
              <ns1:response>&lt;JournalNumber&gt;42&#x21;</ns1:response>
              <ns1:empty/>
              <ns1:nested><a>one</a><b>two</b></ns1:nested>
            </ns1:AuthResponse>"#;

        let fragment = read_fragment(xml).unwrap().unwrap();
        assert_eq!(fragment.root, "AuthResponse");
        assert_eq!(fragment.child("response"), Some("<JournalNumber>42!"));
        assert_eq!(fragment.child("empty"), Some(""));
        assert_eq!(fragment.child("nested"), Some("onetwo"));
        assert_eq!(fragment.child("missing"), None);
    }

    #[test]
    fn test_no_element() {
        assert_eq!(read_fragment(b"").unwrap(), None);
        assert_eq!(read_fragment(b"   just text  ").unwrap(), None);
    }

    #[test]
    fn test_cdata_is_kept_verbatim() {
        let xml = b"<r><response><![CDATA[<b>raw</b>]]></response></r>";
        let fragment = read_fragment(xml).unwrap().unwrap();
        assert_eq!(fragment.child("response"), Some("<b>raw</b>"));
    }

    #[test]
    fn test_malformed_fragment() {
        assert!(read_fragment(b"<r><a></b></r>").is_err());
    }
}
