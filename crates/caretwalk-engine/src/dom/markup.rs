//! # Markup Loader
//!
//! Builds a [`Dom`] from a tiny tag language, enough to describe rich-text
//! fixtures and demo documents:
//!
//! ```text
//! <div>Plain <b>bold</b> text<br/>next</div>
//! ```
//!
//! - `<name>` opens a structural node, `</name>` closes it
//! - `<name/>` is an empty structural node
//! - everything else is text, with HTML entities decoded
//!
//! Attributes, comments and doctypes are not part of the language; a `<`
//! that does not start a tag is kept as literal text.

use logos::Logos;

use super::{Dom, DomError, NodeId};
use crate::tree::DocumentTree;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    #[regex(r"<[A-Za-z][A-Za-z0-9-]*>")]
    Open,

    #[regex(r"</[A-Za-z][A-Za-z0-9-]*>")]
    Close,

    #[regex(r"<[A-Za-z][A-Za-z0-9-]*/>")]
    Empty,

    #[regex(r"[^<]+")]
    Text,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Expected </{expected}> but found </{found}> at byte {at}")]
    MismatchedClose {
        expected: String,
        found: String,
        at: usize,
    },
    #[error("Closing tag </{tag}> at byte {at} has no matching open tag")]
    StrayClose { tag: String, at: usize },
    #[error("Tag <{0}> is never closed")]
    Unclosed(String),
    #[error(transparent)]
    Tree(#[from] DomError),
}

/// Parse markup into a fresh [`Dom`].
///
/// Returns the tree and the node to use as container: the single top-level
/// element when there is exactly one, the document root otherwise.
pub fn parse_markup(input: &str) -> Result<(Dom, NodeId), MarkupError> {
    let mut dom = Dom::new();
    let root = dom.root();
    let mut open: Vec<(NodeId, &str)> = vec![(root, "#document")];
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        let at = lexer.span().start;
        let parent = open.last().map_or(root, |(node, _)| *node);

        match result {
            Ok(TokenKind::Open) => {
                let tag = &slice[1..slice.len() - 1];
                let element = dom.create_element(tag);
                append(&mut dom, parent, element)?;
                open.push((element, tag));
            }
            Ok(TokenKind::Empty) => {
                let element = dom.create_element(&slice[1..slice.len() - 2]);
                append(&mut dom, parent, element)?;
            }
            Ok(TokenKind::Close) => {
                let found = &slice[2..slice.len() - 1];
                if open.len() == 1 {
                    return Err(MarkupError::StrayClose {
                        tag: found.to_string(),
                        at,
                    });
                }
                if let Some((_, expected)) = open.pop()
                    && expected != found
                {
                    return Err(MarkupError::MismatchedClose {
                        expected: expected.to_string(),
                        found: found.to_string(),
                        at,
                    });
                }
            }
            // A lone `<` is not a tag, keep it as text.
            Ok(TokenKind::Text) | Err(()) => push_text(&mut dom, parent, slice)?,
        }
    }

    if open.len() > 1
        && let Some((_, tag)) = open.pop()
    {
        return Err(MarkupError::Unclosed(tag.to_string()));
    }

    let container = match dom.children(root) {
        [only] if dom.tag(*only).is_some() => *only,
        _ => root,
    };
    Ok((dom, container))
}

fn append(dom: &mut Dom, parent: NodeId, child: NodeId) -> Result<(), DomError> {
    dom.append_child(parent, child)
}

/// Append text to `parent`, merging with a trailing text node so that lone
/// `<` characters do not split a run.
fn push_text(dom: &mut Dom, parent: NodeId, raw: &str) -> Result<(), DomError> {
    let decoded = html_escape::decode_html_entities(raw);
    if let Some(last) = dom.last_child(parent)
        && let Some(existing) = dom.text(last)
    {
        let merged = format!("{existing}{decoded}");
        return dom.set_text(last, &merged);
    }
    let text = dom.create_text(&decoded);
    append(dom, parent, text)
}
