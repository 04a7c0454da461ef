//! Schema validation for untrusted wiki data
//!
//! Import, replace and the persistence backends run raw JSON through
//! [`validate`] before it can become a [`Document`]. The walker checks the
//! whole structural shape top-down and reports the first failing location as
//! a path, e.g. `pages.faq.blocks[2].items[0].answer: expected string`.
//! Keys that are not plain identifiers are quoted: `pages["plugins/cq-chat"]`.
//!
//! Beyond shape, it enforces the identity rules the store relies on:
//! navigation ids are unique across the forest, block ids are unique within
//! a page (sections included), and each page is keyed by its own slug.
//!
//! Unknown block or navigation tags are errors. Unknown extra keys are
//! dropped, and optional fields may be absent but not `null`.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;

use super::block::{BlockType, ContentBlock};
use super::document::Document;

/// First structural mismatch found in a value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        let path = if path.is_empty() { "(root)" } else { path };
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

type Check = Result<(), ValidationError>;

/// Validates a raw value and decodes it into a [`Document`]
pub fn validate(raw: &Value) -> Result<Document, ValidationError> {
    Walker::default().shape(raw, "", Shape::Object(DOCUMENT))?;
    serde_json::from_value(raw.clone()).map_err(|e| ValidationError::new("", e.to_string()))
}

/// Validates a single block (and any nested section children)
pub fn validate_block(raw: &Value) -> Result<ContentBlock, ValidationError> {
    Walker::default().block(raw, "")?;
    serde_json::from_value(raw.clone()).map_err(|e| ValidationError::new("", e.to_string()))
}

/// Re-checks a typed document, e.g. before it is persisted
///
/// Typed documents always have the right shape; this catches the rules the
/// type system cannot express (empty names, duplicate ids, slug keys).
pub fn check(document: &Document) -> Check {
    let value =
        serde_json::to_value(document).map_err(|e| ValidationError::new("", e.to_string()))?;
    Walker::default().shape(&value, "", Shape::Object(DOCUMENT))
}

#[derive(Clone, Copy)]
enum Shape {
    Str,
    NonEmpty,
    Bool,
    Integer,
    /// Non-negative integer that fits a u32
    Count,
    /// One of a few small integer literals
    Literal(&'static [u64]),
    Enum(&'static [&'static str]),
    Strings,
    StringRows,
    Object(&'static [Field]),
    Objects(&'static [Field]),
    FileTree,
    Blocks,
    NavNodes,
    Pages,
}

struct Field {
    name: &'static str,
    shape: Shape,
    required: bool,
}

const fn req(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: true,
    }
}

const fn opt(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: false,
    }
}

const PERMISSION_DEFAULTS: &[&str] = &["all", "op", "none"];
const TWO_TO_FOUR: &[u64] = &[2, 3, 4];

const DOCUMENT: &[Field] = &[
    req("version", Shape::Str),
    req("settings", Shape::Object(SETTINGS)),
    req("navigation", Shape::NavNodes),
    req("pages", Shape::Pages),
];

// settings

const SETTINGS: &[Field] = &[
    req("name", Shape::NonEmpty),
    req("description", Shape::Str),
    req("logoText", Shape::NonEmpty),
    opt("version", Shape::Str),
    opt("githubUrl", Shape::Str),
    req("defaultSlug", Shape::NonEmpty),
    req(
        "accentColor",
        Shape::Enum(&["indigo", "violet", "blue", "emerald", "rose", "amber"]),
    ),
    req("navbarLinks", Shape::Objects(NAVBAR_LINK)),
    req("showThemeToggle", Shape::Bool),
    req("showSearch", Shape::Bool),
    req("showGithub", Shape::Bool),
    req("uiLabels", Shape::Object(UI_LABELS)),
];

const NAVBAR_LINK: &[Field] = &[
    req("label", Shape::Str),
    req("href", Shape::Str),
    opt("external", Shape::Bool),
    opt("badge", Shape::Str),
];

const UI_LABELS: &[Field] = &[
    req("toc", Shape::Object(&[req("title", Shape::Str)])),
    req(
        "search",
        Shape::Object(&[
            req("placeholder", Shape::Str),
            req("empty", Shape::Str),
            req("noResults", Shape::Str),
            req("noResultsHint", Shape::Str),
            req("triggerLabel", Shape::Str),
            req("shortcut", Shape::Str),
        ]),
    ),
    req(
        "pagination",
        Shape::Object(&[req("previous", Shape::Str), req("next", Shape::Str)]),
    ),
    req(
        "feedback",
        Shape::Object(&[
            req("question", Shape::Str),
            req("yes", Shape::Str),
            req("no", Shape::Str),
            req("thanksYes", Shape::Str),
            req("thanksNo", Shape::Str),
        ]),
    ),
    req(
        "article",
        Shape::Object(&[req("copyLink", Shape::Str), req("copied", Shape::Str)]),
    ),
    req("sidebar", Shape::Object(&[req("searchLabel", Shape::Str)])),
];

// navigation

const NAV_COMMON: &[Field] = &[
    req("id", Shape::NonEmpty),
    req("type", Shape::Enum(&["group", "page", "link"])),
    req("title", Shape::NonEmpty),
    req("order", Shape::Integer),
];

const NAV_GROUP: &[Field] = &[
    opt("collapsible", Shape::Bool),
    opt("defaultOpen", Shape::Bool),
    opt("children", Shape::NavNodes),
];

const NAV_PAGE: &[Field] = &[
    req("slug", Shape::Str),
    opt("badge", Shape::Str),
    opt("hidden", Shape::Bool),
    opt("draft", Shape::Bool),
    opt("disabled", Shape::Bool),
];

const NAV_LINK: &[Field] = &[req("href", Shape::Str), opt("external", Shape::Bool)];

// pages

const PAGE: &[Field] = &[
    req("id", Shape::NonEmpty),
    req("meta", Shape::Object(PAGE_META)),
    req("blocks", Shape::Blocks),
];

const PAGE_META: &[Field] = &[
    req("title", Shape::NonEmpty),
    req("slug", Shape::NonEmpty),
    opt("description", Shape::Str),
    opt("tags", Shape::Strings),
    req("status", Shape::Enum(&["draft", "published"])),
    req("updatedAt", Shape::Str),
    opt("author", Shape::Str),
    opt("related", Shape::Strings),
    opt("badge", Shape::Str),
    opt("category", Shape::Str),
];

// block items

const LIST_ITEM: &[Field] = &[
    req("text", Shape::Str),
    opt("checked", Shape::Bool),
    opt("children", Shape::Strings),
];

const FAQ_ITEM: &[Field] = &[req("question", Shape::Str), req("answer", Shape::Str)];

const COMMAND_ITEM: &[Field] = &[
    req("command", Shape::Str),
    req("description", Shape::Str),
    opt("usage", Shape::Str),
    opt("aliases", Shape::Strings),
    opt("permission", Shape::Str),
    opt("permissionDefault", Shape::Enum(PERMISSION_DEFAULTS)),
];

const STEP_ITEM: &[Field] = &[
    req("title", Shape::Str),
    opt("description", Shape::Str),
    opt("code", Shape::Str),
    opt("note", Shape::Str),
];

const CARD_ITEM: &[Field] = &[
    req("title", Shape::Str),
    opt("description", Shape::Str),
    opt("href", Shape::Str),
    opt("badge", Shape::Str),
    opt("icon", Shape::Str),
];

const FILE_NODE: &[Field] = &[
    req("name", Shape::Str),
    req("type", Shape::Enum(&["file", "dir"])),
    opt("description", Shape::Str),
    opt("children", Shape::FileTree),
];

const PERMISSION_ITEM: &[Field] = &[
    req("node", Shape::Str),
    req("description", Shape::Str),
    req("default", Shape::Enum(PERMISSION_DEFAULTS)),
];

const STAT_ITEM: &[Field] = &[
    req("label", Shape::Str),
    req("value", Shape::Str),
    opt("unit", Shape::Str),
];

const INGREDIENT: &[Field] = &[
    req("slot", Shape::Str),
    req("item", Shape::Str),
    opt("count", Shape::Count),
];

const LINK_ITEM: &[Field] = &[
    req("title", Shape::Str),
    req("href", Shape::Str),
    opt("description", Shape::Str),
    opt("external", Shape::Bool),
];

const PARAGRAPH: &[Field] = &[req("content", Shape::Str)];

const HEADING: &[Field] = &[
    req("level", Shape::Literal(TWO_TO_FOUR)),
    req("text", Shape::Str),
    opt("anchor", Shape::Str),
];

const LIST: &[Field] = &[
    req("style", Shape::Enum(&["bullet", "ordered", "check"])),
    req("items", Shape::Objects(LIST_ITEM)),
];

const TABLE: &[Field] = &[
    req("headers", Shape::Strings),
    req("rows", Shape::StringRows),
    opt("caption", Shape::Str),
];

const CALLOUT: &[Field] = &[
    req(
        "variant",
        Shape::Enum(&["info", "tip", "warning", "danger", "note"]),
    ),
    opt("title", Shape::Str),
    req("content", Shape::Str),
];

const CODE: &[Field] = &[
    opt("language", Shape::Str),
    opt("filename", Shape::Str),
    req("content", Shape::Str),
];

const FAQ: &[Field] = &[opt("title", Shape::Str), req("items", Shape::Objects(FAQ_ITEM))];

const COMMANDS: &[Field] = &[
    opt("title", Shape::Str),
    opt("category", Shape::Str),
    req("items", Shape::Objects(COMMAND_ITEM)),
];

const STEPS: &[Field] = &[opt("title", Shape::Str), req("items", Shape::Objects(STEP_ITEM))];

const CARDS: &[Field] = &[
    opt("columns", Shape::Literal(TWO_TO_FOUR)),
    req("items", Shape::Objects(CARD_ITEM)),
];

const FILE_TREE: &[Field] = &[opt("title", Shape::Str), req("root", Shape::FileTree)];

const PERMISSIONS: &[Field] = &[
    opt("title", Shape::Str),
    req("items", Shape::Objects(PERMISSION_ITEM)),
];

const DIVIDER: &[Field] = &[];

const IMAGE: &[Field] = &[
    req("src", Shape::Str),
    req("alt", Shape::Str),
    opt("caption", Shape::Str),
];

const QUOTE: &[Field] = &[req("content", Shape::Str), opt("author", Shape::Str)];

const STATS: &[Field] = &[opt("title", Shape::Str), req("items", Shape::Objects(STAT_ITEM))];

const RECIPE: &[Field] = &[
    opt("title", Shape::Str),
    req("ingredients", Shape::Objects(INGREDIENT)),
    req("result", Shape::Str),
    opt("shape", Shape::StringRows),
];

const LINK_LIST: &[Field] = &[opt("title", Shape::Str), req("items", Shape::Objects(LINK_ITEM))];

const SECTION: &[Field] = &[
    req("title", Shape::Str),
    opt("description", Shape::Str),
    req("children", Shape::Blocks),
];

const RAW_MD: &[Field] = &[req("content", Shape::Str)];

/// Type-specific fields of each block variant
fn block_fields(block_type: BlockType) -> &'static [Field] {
    match block_type {
        BlockType::Paragraph => PARAGRAPH,
        BlockType::Heading => HEADING,
        BlockType::List => LIST,
        BlockType::Table => TABLE,
        BlockType::Callout => CALLOUT,
        BlockType::Code => CODE,
        BlockType::Faq => FAQ,
        BlockType::Commands => COMMANDS,
        BlockType::Steps => STEPS,
        BlockType::Cards => CARDS,
        BlockType::FileTree => FILE_TREE,
        BlockType::Permissions => PERMISSIONS,
        BlockType::Divider => DIVIDER,
        BlockType::Image => IMAGE,
        BlockType::Quote => QUOTE,
        BlockType::Stats => STATS,
        BlockType::Recipe => RECIPE,
        BlockType::LinkList => LINK_LIST,
        BlockType::Section => SECTION,
        BlockType::RawMd => RAW_MD,
    }
}

fn key_path(parent: &str, key: &str) -> String {
    let plain = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !plain {
        format!("{}[{}]", parent, Value::String(key.to_string()))
    } else if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(path: &str, what: &str, got: &Value) -> ValidationError {
    ValidationError::new(path, format!("expected {}, got {}", what, kind_of(got)))
}

fn string<'a>(value: &'a Value, path: &str) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| expected(path, "string", value))
}

fn array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ValidationError> {
    value.as_array().ok_or_else(|| expected(path, "array", value))
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| expected(path, "object", value))
}

fn one_of<T: std::fmt::Display>(allowed: &[T]) -> String {
    allowed
        .iter()
        .map(|a| format!("'{}'", a))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Recursive shape walker; carries the id sets the uniqueness rules need
#[derive(Default)]
struct Walker {
    nav_ids: HashSet<String>,
    block_ids: HashSet<String>,
}

impl Walker {
    fn fields(&mut self, obj: &Map<String, Value>, path: &str, fields: &[Field]) -> Check {
        for field in fields {
            let field_path = key_path(path, field.name);
            match obj.get(field.name) {
                Some(value) => self.shape(value, &field_path, field.shape)?,
                None if field.required => {
                    return Err(ValidationError::new(&field_path, "required"))
                }
                None => {}
            }
        }
        Ok(())
    }

    fn shape(&mut self, value: &Value, path: &str, shape: Shape) -> Check {
        match shape {
            Shape::Str => string(value, path).map(|_| ()),
            Shape::NonEmpty => {
                if string(value, path)?.is_empty() {
                    return Err(ValidationError::new(path, "must not be empty"));
                }
                Ok(())
            }
            Shape::Bool => match value {
                Value::Bool(_) => Ok(()),
                other => Err(expected(path, "boolean", other)),
            },
            Shape::Integer => match value.as_i64() {
                Some(_) => Ok(()),
                None => Err(expected(path, "integer", value)),
            },
            Shape::Count => match value.as_u64() {
                Some(n) if n <= u64::from(u32::MAX) => Ok(()),
                _ => Err(expected(path, "non-negative integer", value)),
            },
            Shape::Literal(allowed) => match value.as_u64() {
                Some(n) if allowed.contains(&n) => Ok(()),
                _ => Err(ValidationError::new(
                    path,
                    format!("expected one of {}", one_of(allowed)),
                )),
            },
            Shape::Enum(allowed) => {
                let s = string(value, path)?;
                if allowed.contains(&s) {
                    Ok(())
                } else {
                    Err(ValidationError::new(
                        path,
                        format!("expected one of {}, got '{}'", one_of(allowed), s),
                    ))
                }
            }
            Shape::Strings => {
                for (i, item) in array(value, path)?.iter().enumerate() {
                    string(item, &index_path(path, i))?;
                }
                Ok(())
            }
            Shape::StringRows => {
                for (i, row) in array(value, path)?.iter().enumerate() {
                    self.shape(row, &index_path(path, i), Shape::Strings)?;
                }
                Ok(())
            }
            Shape::Object(fields) => {
                let obj = object(value, path)?;
                self.fields(obj, path, fields)
            }
            Shape::Objects(fields) => {
                for (i, item) in array(value, path)?.iter().enumerate() {
                    self.shape(item, &index_path(path, i), Shape::Object(fields))?;
                }
                Ok(())
            }
            Shape::FileTree => self.shape(value, path, Shape::Objects(FILE_NODE)),
            Shape::Blocks => {
                for (i, item) in array(value, path)?.iter().enumerate() {
                    self.block(item, &index_path(path, i))?;
                }
                Ok(())
            }
            Shape::NavNodes => {
                for (i, item) in array(value, path)?.iter().enumerate() {
                    self.nav_node(item, &index_path(path, i))?;
                }
                Ok(())
            }
            Shape::Pages => self.pages(value, path),
        }
    }

    fn block(&mut self, value: &Value, path: &str) -> Check {
        let obj = object(value, path)?;

        let id_path = key_path(path, "id");
        let id = match obj.get("id") {
            Some(id) => string(id, &id_path)?,
            None => return Err(ValidationError::new(&id_path, "required")),
        };
        if id.is_empty() {
            return Err(ValidationError::new(&id_path, "must not be empty"));
        }

        let tag_path = key_path(path, "type");
        let tag = match obj.get("type") {
            Some(tag) => string(tag, &tag_path)?,
            None => return Err(ValidationError::new(&tag_path, "required")),
        };
        let block_type: BlockType = tag
            .parse()
            .map_err(|_| ValidationError::new(&tag_path, format!("unknown block type '{}'", tag)))?;

        if !self.block_ids.insert(id.to_string()) {
            return Err(ValidationError::new(
                &id_path,
                format!("duplicate block id '{}'", id),
            ));
        }

        self.fields(obj, path, block_fields(block_type))
    }

    fn nav_node(&mut self, value: &Value, path: &str) -> Check {
        let obj = object(value, path)?;
        self.fields(obj, path, NAV_COMMON)?;

        let id = obj.get("id").and_then(Value::as_str).unwrap_or_default();
        if !self.nav_ids.insert(id.to_string()) {
            return Err(ValidationError::new(
                &key_path(path, "id"),
                format!("duplicate navigation id '{}'", id),
            ));
        }

        let tag = obj.get("type").and_then(Value::as_str).unwrap_or_default();
        let specific = match tag {
            "group" => NAV_GROUP,
            "page" => NAV_PAGE,
            _ => NAV_LINK,
        };
        if tag != "group" && obj.contains_key("children") {
            return Err(ValidationError::new(
                &key_path(path, "children"),
                "only group nodes may have children",
            ));
        }

        self.fields(obj, path, specific)
    }

    fn pages(&mut self, value: &Value, path: &str) -> Check {
        for (key, page) in object(value, path)? {
            let page_path = key_path(path, key);
            let obj = object(page, &page_path)?;

            // Block ids only need to be unique within one page.
            self.block_ids.clear();
            self.fields(obj, &page_path, PAGE)?;

            let slug = obj
                .get("meta")
                .and_then(|meta| meta.get("slug"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            if slug != key {
                return Err(ValidationError::new(
                    &key_path(&key_path(&page_path, "meta"), "slug"),
                    format!("must match page key '{}', got '{}'", key, slug),
                ));
            }
        }
        Ok(())
    }
}
