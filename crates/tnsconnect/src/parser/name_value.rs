//! Name-value descriptor grammar.
//!
//! ```text
//! node  := '(' KEY '=' value ')'
//! value := node+ | TEXT | QUOTED
//! ```
//!
//! The input is split into tokens first, then a recursive-descent parser
//! builds a tree of [`NvNode`]s which is finally interpreted into a
//! [`DescriptionList`]. Keys are case-insensitive; unknown keys are ignored.

use super::ParseContext;
use super::fields::{AddressField, DescriptionField, ListField};
use crate::constants::MAX_DESCRIPTOR_DEPTH;
use crate::descriptor::{Description, DescriptionList};
use crate::error::ConnectParamsError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Open,
    Close,
    Equals,
    /// Unquoted run of text, trimmed.
    Text,
    /// Double-quoted string, span includes the quotes.
    Quoted,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        match bytes[pos] {
            b'(' | b')' | b'=' => {
                let kind = match bytes[pos] {
                    b'(' => TokenKind::Open,
                    b')' => TokenKind::Close,
                    _ => TokenKind::Equals,
                };
                pos += 1;
                tokens.push(Token {
                    kind,
                    start,
                    end: pos,
                });
            }
            b'"' => {
                let close = input[pos + 1..]
                    .find('"')
                    .ok_or_else(|| ConnectParamsError::parse(start, "unterminated quoted value"))?;
                pos += close + 2;
                tokens.push(Token {
                    kind: TokenKind::Quoted,
                    start,
                    end: pos,
                });
            }
            b if b.is_ascii_whitespace() => pos += 1,
            _ => {
                while pos < bytes.len() && !matches!(bytes[pos], b'(' | b')' | b'=' | b'"') {
                    pos += 1;
                }
                let raw = &input[start..pos];
                let trimmed_end = start + raw.trim_end().len();
                tokens.push(Token {
                    kind: TokenKind::Text,
                    start,
                    end: trimmed_end,
                });
            }
        }
    }

    Ok(tokens)
}

/// A parsed `(KEY=VALUE)` group.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NvNode {
    /// Upper-cased key.
    pub name: String,
    /// Byte offset of the key in the input.
    pub position: usize,
    pub value: NvValue,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NvValue {
    Text(String),
    List(Vec<NvNode>),
}

impl NvNode {
    fn text(&self) -> Result<&str> {
        match &self.value {
            NvValue::Text(text) => Ok(text),
            NvValue::List(_) => Err(ConnectParamsError::parse(
                self.position,
                format!("expected a value for {}, found nested groups", self.name),
            )),
        }
    }

    fn children(&self) -> Result<&[NvNode]> {
        match &self.value {
            NvValue::List(children) => Ok(children),
            NvValue::Text(text) if text.is_empty() => Ok(&[]),
            NvValue::Text(_) => Err(ConnectParamsError::parse(
                self.position,
                format!("expected nested groups for {}", self.name),
            )),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn end_position(&self) -> usize {
        self.input.len()
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        match self.next() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(ConnectParamsError::parse(
                token.start,
                format!(
                    "expected {what}, found \"{}\"",
                    &self.input[token.start..token.end]
                ),
            )),
            None => Err(ConnectParamsError::parse(
                self.end_position(),
                format!("expected {what}, found end of input"),
            )),
        }
    }

    fn node(&mut self, depth: usize) -> Result<NvNode> {
        let open = self.expect(TokenKind::Open, "\"(\"")?;
        if depth >= MAX_DESCRIPTOR_DEPTH {
            return Err(ConnectParamsError::parse(
                open.start,
                format!("descriptor nests deeper than {MAX_DESCRIPTOR_DEPTH} levels"),
            ));
        }
        let key = self.expect(TokenKind::Text, "a key")?;
        let name = self.input[key.start..key.end].to_ascii_uppercase();
        self.expect(TokenKind::Equals, "\"=\"")?;

        let value = if self.peek().map(|t| t.kind) == Some(TokenKind::Open) {
            let mut children = Vec::new();
            while self.peek().map(|t| t.kind) == Some(TokenKind::Open) {
                children.push(self.node(depth + 1)?);
            }
            NvValue::List(children)
        } else {
            NvValue::Text(self.text_value()?)
        };

        self.expect(TokenKind::Close, "\")\"")?;
        Ok(NvNode {
            name,
            position: key.start,
            value,
        })
    }

    /// Everything up to the closing parenthesis; `=` is allowed inside values.
    fn text_value(&mut self) -> Result<String> {
        let mut span: Option<(usize, usize)> = None;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Close => break,
                TokenKind::Open => {
                    return Err(ConnectParamsError::parse(
                        token.start,
                        "unexpected \"(\" inside a value",
                    ));
                }
                TokenKind::Quoted if span.is_none() => {
                    self.cursor += 1;
                    if self.peek().map(|t| t.kind) != Some(TokenKind::Close) {
                        let after = self.peek().map_or(self.end_position(), |t| t.start);
                        return Err(ConnectParamsError::parse(
                            after,
                            "unexpected text after quoted value",
                        ));
                    }
                    return Ok(self.input[token.start + 1..token.end - 1].to_string());
                }
                TokenKind::Text | TokenKind::Equals | TokenKind::Quoted => {
                    self.cursor += 1;
                    span = Some(span.map_or((token.start, token.end), |(s, _)| (s, token.end)));
                }
            }
        }
        Ok(span.map_or_else(String::new, |(s, e)| self.input[s..e].trim().to_string()))
    }
}

/// Parse a descriptor into its node tree.
pub(crate) fn parse_tree(input: &str) -> Result<NvNode> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        input,
        tokens,
        cursor: 0,
    };
    let root = parser.node(0)?;
    if let Some(token) = parser.peek() {
        return Err(ConnectParamsError::parse(
            token.start,
            "unexpected input after the closing \")\"",
        ));
    }
    Ok(root)
}

/// Parse a descriptor string into a description list.
pub(crate) fn parse(input: &str, ctx: &ParseContext<'_>) -> Result<DescriptionList> {
    let root = parse_tree(input)?;
    match root.name.as_str() {
        "DESCRIPTION_LIST" => description_list(&root, ctx),
        "DESCRIPTION" => Ok(DescriptionList::single(description(&root, ctx)?)),
        "ADDRESS_LIST" | "ADDRESS" => {
            let mut result = ctx.description_template.template();
            collect_addresses(std::slice::from_ref(&root), &mut result, ctx)?;
            finish_description(result, root.position).map(DescriptionList::single)
        }
        other => Err(ConnectParamsError::parse(
            root.position,
            format!("expected DESCRIPTION_LIST or DESCRIPTION, found {other}"),
        )),
    }
}

fn description_list(node: &NvNode, ctx: &ParseContext<'_>) -> Result<DescriptionList> {
    let mut list = DescriptionList::default();
    for child in node.children()? {
        if child.name == "DESCRIPTION" {
            list.descriptions.push(description(child, ctx)?);
        } else if let Some(field) = ListField::from_list_key(&child.name) {
            field.apply(&mut list, child.text()?)?;
        }
    }
    if list.descriptions.is_empty() {
        return Err(ConnectParamsError::parse(
            node.position,
            "DESCRIPTION_LIST contains no DESCRIPTION",
        ));
    }
    Ok(list)
}

fn description(node: &NvNode, ctx: &ParseContext<'_>) -> Result<Description> {
    let mut result = ctx.description_template.template();
    let children = node.children()?;
    collect_addresses(children, &mut result, ctx)?;

    for child in children {
        match child.name.as_str() {
            "ADDRESS" | "ADDRESS_LIST" => {}
            "CONNECT_DATA" => {
                for item in child.children()? {
                    if let Some(field) = DescriptionField::from_connect_data_key(&item.name) {
                        field.apply(&mut result, item.text()?)?;
                    }
                }
            }
            "SECURITY" => {
                for item in child.children()? {
                    if let Some(field) = DescriptionField::from_security_key(&item.name) {
                        field.apply(&mut result, item.text()?)?;
                    }
                }
            }
            name => {
                if let Some(field) = DescriptionField::from_description_key(name) {
                    field.apply(&mut result, child.text()?)?;
                }
            }
        }
    }

    finish_description(result, node.position)
}

/// Gather `ADDRESS` entries, directly or nested in `ADDRESS_LIST`, in order.
fn collect_addresses(
    nodes: &[NvNode],
    description: &mut Description,
    ctx: &ParseContext<'_>,
) -> Result<()> {
    for node in nodes {
        match node.name.as_str() {
            "ADDRESS" => {
                let mut address = ctx.address_template.clone();
                for item in node.children()? {
                    if let Some(field) = AddressField::from_address_key(&item.name) {
                        field.apply(&mut address, item.text()?)?;
                    }
                }
                description.addresses.push(address);
            }
            "ADDRESS_LIST" => {
                let items = node.children()?;
                for item in items {
                    if item.name == "LOAD_BALANCE" {
                        DescriptionField::LoadBalance.apply(description, item.text()?)?;
                    }
                }
                collect_addresses(items, description, ctx)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn finish_description(description: Description, position: usize) -> Result<Description> {
    if description.addresses.is_empty() {
        return Err(ConnectParamsError::parse(
            position,
            "DESCRIPTION contains no ADDRESS",
        ));
    }
    Ok(description)
}
