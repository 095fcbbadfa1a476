//! OAI-PMH response parsing.
//!
//! Turns response documents into [`Page`]s of headers or records. An OAI
//! `<error>` element becomes [`HarvesterError::OaiProtocol`], except
//! `noRecordsMatch`, which is an ordinary empty listing.

use roxmltree::{Document, Node};

use crate::error::{HarvesterError, Result};
use crate::types::{Header, OaiRecord, Page, Verb};
use crate::xml::{
    find_by_path, find_child, find_children, get_attribute, get_text, standalone_fragment,
};

/// Error code for a selective harvest that matched nothing.
const NO_RECORDS_MATCH: &str = "noRecordsMatch";

/// Parse a `ListIdentifiers` response.
///
/// # Examples
/// ```
/// use crosswalk_harvester::response::parse_identifiers;
///
/// let xml = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
///   <ListIdentifiers>
///     <header><identifier>oai:x:1</identifier><datestamp>2014-06-01</datestamp></header>
///     <resumptionToken>page2</resumptionToken>
///   </ListIdentifiers>
/// </OAI-PMH>"#;
///
/// let page = parse_identifiers(xml).unwrap();
/// assert_eq!(page.items[0].identifier, "oai:x:1");
/// assert_eq!(page.resumption_token.as_deref(), Some("page2"));
/// ```
pub fn parse_identifiers(xml: &str) -> Result<Page<Header>> {
    let doc = Document::parse(xml)?;
    let Some(list) = verb_element(&doc, Verb::ListIdentifiers)? else {
        return Ok(Page::empty());
    };

    let items = find_children(list, "header")
        .map(parse_header)
        .collect::<Result<Vec<_>>>()?;

    Ok(Page {
        items,
        resumption_token: resumption_token(list),
    })
}

/// Parse a `ListRecords` response.
pub fn parse_records(xml: &str) -> Result<Page<OaiRecord>> {
    let doc = Document::parse(xml)?;
    let Some(list) = verb_element(&doc, Verb::ListRecords)? else {
        return Ok(Page::empty());
    };

    let items = find_children(list, "record")
        .map(|record| parse_record(record, xml))
        .collect::<Result<Vec<_>>>()?;

    Ok(Page {
        items,
        resumption_token: resumption_token(list),
    })
}

/// Parse a `GetRecord` response.
pub fn parse_get_record(xml: &str) -> Result<OaiRecord> {
    let doc = Document::parse(xml)?;
    let record = verb_element(&doc, Verb::GetRecord)?
        .and_then(|get| find_by_path(get, "record"))
        .ok_or_else(|| HarvesterError::MissingElement {
            element: "record".to_string(),
            context: Verb::GetRecord.to_string(),
        })?;
    parse_record(record, xml)
}

/// Locate the verb element, surfacing any OAI error first.
///
/// Returns `Ok(None)` for `noRecordsMatch`.
fn verb_element<'a, 'input>(
    doc: &'a Document<'input>,
    verb: Verb,
) -> Result<Option<Node<'a, 'input>>> {
    let root = doc.root_element();

    if let Some(error) = find_child(root, "error") {
        let code = get_attribute(error, "code").unwrap_or("unknown").to_string();
        if code == NO_RECORDS_MATCH {
            tracing::debug!(verb = %verb, "No records match");
            return Ok(None);
        }
        return Err(HarvesterError::OaiProtocol {
            code,
            message: get_text(error),
        });
    }

    find_child(root, verb.as_str())
        .map(Some)
        .ok_or_else(|| HarvesterError::MissingElement {
            element: verb.to_string(),
            context: "OAI-PMH response".to_string(),
        })
}

fn parse_header(node: Node<'_, '_>) -> Result<Header> {
    let identifier = find_child(node, "identifier")
        .map(get_text)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| HarvesterError::MissingElement {
            element: "identifier".to_string(),
            context: "header".to_string(),
        })?;

    Ok(Header {
        identifier,
        datestamp: find_child(node, "datestamp")
            .map(get_text)
            .unwrap_or_default(),
        set_specs: find_children(node, "setSpec").map(get_text).collect(),
        deleted: get_attribute(node, "status") == Some("deleted"),
    })
}

fn parse_record(node: Node<'_, '_>, xml: &str) -> Result<OaiRecord> {
    let header = find_child(node, "header")
        .ok_or_else(|| HarvesterError::MissingElement {
            element: "header".to_string(),
            context: "record".to_string(),
        })
        .and_then(parse_header)?;

    let metadata = if header.deleted || find_child(node, "metadata").is_none() {
        None
    } else {
        Some(standalone_fragment(node, xml))
    };

    Ok(OaiRecord { header, metadata })
}

/// Resumption token text; an empty token marks the last page.
fn resumption_token(list: Node<'_, '_>) -> Option<String> {
    find_child(list, "resumptionToken")
        .map(get_text)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn envelope(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2014-06-01T00:00:00Z</responseDate>
  {body}
</OAI-PMH>"#
        )
    }

    #[test]
    fn test_identifiers_with_sets_and_deleted() {
        let xml = envelope(
            r#"<ListIdentifiers>
                 <header><identifier>oai:x:1</identifier><datestamp>2014-01-01</datestamp>
                   <setSpec>maps</setSpec><setSpec>photos</setSpec></header>
                 <header status="deleted"><identifier>oai:x:2</identifier><datestamp>2014-01-02</datestamp></header>
                 <resumptionToken completeListSize="2"></resumptionToken>
               </ListIdentifiers>"#,
        );
        let page = parse_identifiers(&xml).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].set_specs, vec!["maps", "photos"]);
        assert!(!page.items[0].deleted);
        assert!(page.items[1].deleted);
        assert_eq!(page.resumption_token, None);
    }

    #[test]
    fn test_no_records_match_is_empty_page() {
        let xml = envelope(r#"<error code="noRecordsMatch">Nothing here</error>"#);
        let page = parse_records(&xml).unwrap();
        assert!(page.items.is_empty());
        assert!(page.resumption_token.is_none());
    }

    #[test]
    fn test_other_errors_are_protocol_errors() {
        let xml = envelope(r#"<error code="badResumptionToken">Token expired</error>"#);
        let err = parse_identifiers(&xml).unwrap_err();
        match err {
            HarvesterError::OaiProtocol { code, message } => {
                assert_eq!(code, "badResumptionToken");
                assert_eq!(message, "Token expired");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_records_metadata_is_standalone() {
        let xml = envelope(
            r#"<ListRecords>
                 <record>
                   <header><identifier>oai:x:1</identifier><datestamp>2014-01-01</datestamp></header>
                   <metadata>
                     <oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
                                xmlns:dc="http://purl.org/dc/elements/1.1/">
                       <dc:title>Moominpappa at Sea</dc:title>
                     </oai_dc:dc>
                   </metadata>
                 </record>
                 <record>
                   <header status="deleted"><identifier>oai:x:2</identifier><datestamp>2014-01-02</datestamp></header>
                 </record>
                 <resumptionToken>next</resumptionToken>
               </ListRecords>"#,
        );
        let page = parse_records(&xml).unwrap();

        assert_eq!(page.resumption_token.as_deref(), Some("next"));
        assert_eq!(page.items.len(), 2);
        let metadata = page.items[0].metadata.as_deref().unwrap();
        assert!(metadata.starts_with(
            r#"<record xmlns="http://www.openarchives.org/OAI/2.0/">"#
        ));
        assert!(Document::parse(metadata).is_ok());
        assert!(page.items[1].metadata.is_none());
    }

    #[test]
    fn test_get_record() {
        let xml = envelope(
            r#"<GetRecord><record>
                 <header><identifier>oai:x:7</identifier><datestamp>2014-01-07</datestamp></header>
                 <metadata><dc/></metadata>
               </record></GetRecord>"#,
        );
        let record = parse_get_record(&xml).unwrap();
        assert_eq!(record.header.identifier, "oai:x:7");
        assert!(record.metadata.is_some());
    }

    #[test]
    fn test_missing_verb_element() {
        let xml = envelope("<Identify/>");
        assert!(matches!(
            parse_records(&xml),
            Err(HarvesterError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_header_without_identifier() {
        let xml = envelope(
            "<ListIdentifiers><header><datestamp>2014-01-01</datestamp></header></ListIdentifiers>",
        );
        assert!(matches!(
            parse_identifiers(&xml),
            Err(HarvesterError::MissingElement { .. })
        ));
    }
}
