//! Node type registry.
//!
//! A fixed catalogue of syntax element kinds. Every kind has a stable numeric
//! id and the style tags the presentation layer uses to paint it.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Stable numeric identity of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeTypeId(pub u16);

impl NodeTypeId {
    /// The document root.
    pub const ROOT: Self = Self(0);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Style categories understood by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleTag {
    Emphasis,
    Strong,
    Atom,
    ClassName,
    Comment,
    Strikethrough,
    MacroName,
    Link,
    LabelName,
    Heading,
    Annotation,
    DefinitionKeyword,
    Namespace,
    Bool,
    TypeName,
    VariableName,
}

/// A style tag attached to a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRule {
    pub tag: StyleTag,
    /// Applies to the whole node including its children, rather than only to
    /// the node's own text.
    pub inherit: bool,
}

impl StyleRule {
    pub const fn own(tag: StyleTag) -> Self {
        Self { tag, inherit: false }
    }

    pub const fn inherited(tag: StyleTag) -> Self {
        Self { tag, inherit: true }
    }
}

/// An immutable syntax element kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeType {
    pub id: NodeTypeId,
    pub name: &'static str,
    pub top: bool,
    pub styles: Vec<StyleRule>,
}

impl NodeType {
    pub fn new(id: u16, name: &'static str) -> Self {
        Self {
            id: NodeTypeId(id),
            name,
            top: false,
            styles: Vec::new(),
        }
    }

    pub fn top(id: u16, name: &'static str) -> Self {
        Self {
            top: true,
            ..Self::new(id, name)
        }
    }

    #[must_use]
    pub fn with_style(mut self, rule: StyleRule) -> Self {
        self.styles.push(rule);
        self
    }
}

/// Startup-time registry validation failure. Fatal: the editor must not start.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("node type registry misconfigured: duplicate id {0}")]
    DuplicateId(NodeTypeId),
    #[error("node type registry misconfigured: no top node type")]
    MissingTop,
    #[error("node type registry misconfigured: id 0 must be the only top node type (found `{0}`)")]
    RootNotTop(&'static str),
    #[error("node type registry misconfigured: more than one top node type")]
    MultipleTop,
    #[error("node type registry misconfigured: ids are not contiguous, missing {0}")]
    Gap(NodeTypeId),
}

/// Ids of the stock Org catalogue.
pub mod org {
    use super::NodeTypeId;

    pub const TOP: NodeTypeId = NodeTypeId(0);
    pub const ITALIC: NodeTypeId = NodeTypeId(1);
    pub const BOLD: NodeTypeId = NodeTypeId(2);
    pub const ENTITY: NodeTypeId = NodeTypeId(3);
    pub const EMOJI: NodeTypeId = NodeTypeId(4);
    pub const TARGET: NodeTypeId = NodeTypeId(5);
    pub const MACRO: NodeTypeId = NodeTypeId(6);
    pub const UNDERLINE: NodeTypeId = NodeTypeId(7);
    pub const VERBATIM: NodeTypeId = NodeTypeId(8);
    pub const CODE: NodeTypeId = NodeTypeId(9);
    pub const COMMENT: NodeTypeId = NodeTypeId(10);
    pub const INLINE_SRC: NodeTypeId = NodeTypeId(11);
    pub const STRIKETHROUGH: NodeTypeId = NodeTypeId(12);
    pub const PLAIN_LINK: NodeTypeId = NodeTypeId(13);
    pub const EXPORT_SNIPPET: NodeTypeId = NodeTypeId(14);
    pub const KEYWORD: NodeTypeId = NodeTypeId(15);
    pub const BLOCK: NodeTypeId = NodeTypeId(16);
    pub const REGULAR_LINK: NodeTypeId = NodeTypeId(17);
    pub const TABLE: NodeTypeId = NodeTypeId(18);
    pub const PARAGRAPH: NodeTypeId = NodeTypeId(19);
    pub const PLAIN_TEXT: NodeTypeId = NodeTypeId(20);
    pub const LIST: NodeTypeId = NodeTypeId(21);
    pub const HEADING: NodeTypeId = NodeTypeId(22);
    pub const DRAWER: NodeTypeId = NodeTypeId(23);
    pub const FOOTNOTE_DEF: NodeTypeId = NodeTypeId(24);
    pub const FOOTNOTE_REF: NodeTypeId = NodeTypeId(25);
    pub const NADA: NodeTypeId = NodeTypeId(26);
}

/// Validated, read-only catalogue of node types indexed by id.
#[derive(Debug, Clone)]
pub struct NodeTypeRegistry {
    types: Vec<NodeType>,
    comment_token: Option<&'static str>,
}

impl NodeTypeRegistry {
    /// Validate `types` and build a registry.
    ///
    /// # Errors
    /// Returns a [`RegistryError`] on duplicate ids, a missing or misplaced
    /// top type, or ids that do not cover `0..types.len()`.
    pub fn new(mut types: Vec<NodeType>) -> Result<Self, RegistryError> {
        types.sort_by_key(|ty| ty.id);

        match types.iter().filter(|ty| ty.top).count() {
            0 => return Err(RegistryError::MissingTop),
            1 => {}
            _ => return Err(RegistryError::MultipleTop),
        }

        for (i, ty) in types.iter().enumerate() {
            if i > 0 && types[i - 1].id == ty.id {
                return Err(RegistryError::DuplicateId(ty.id));
            }
            if ty.id.index() != i {
                return Err(RegistryError::Gap(NodeTypeId(i as u16)));
            }
        }
        if !types[0].top {
            return Err(RegistryError::RootNotTop(types[0].name));
        }

        Ok(Self {
            types,
            comment_token: None,
        })
    }

    /// The stock Org catalogue.
    ///
    /// # Errors
    /// Only fails if the built-in table itself is inconsistent.
    pub fn org() -> Result<Self, RegistryError> {
        use StyleRule as R;
        use StyleTag as T;

        let types = vec![
            NodeType::top(0, "topNode"),
            NodeType::new(1, "italic").with_style(R::inherited(T::Emphasis)),
            NodeType::new(2, "bold").with_style(R::inherited(T::Strong)),
            NodeType::new(3, "entity").with_style(R::own(T::Bool)),
            NodeType::new(4, "emoji").with_style(R::own(T::Atom)),
            NodeType::new(5, "target").with_style(R::own(T::LabelName)),
            NodeType::new(6, "macro").with_style(R::own(T::MacroName)),
            NodeType::new(7, "underline"),
            NodeType::new(8, "verbatim"),
            NodeType::new(9, "code"),
            NodeType::new(10, "comment").with_style(R::own(T::Comment)),
            NodeType::new(11, "inlinesrc").with_style(R::own(T::ClassName)),
            NodeType::new(12, "strikethrough").with_style(R::inherited(T::Strikethrough)),
            NodeType::new(13, "plainlink").with_style(R::own(T::Link)),
            NodeType::new(14, "exportsnippet").with_style(R::own(T::Namespace)),
            NodeType::new(15, "keyword").with_style(R::own(T::Annotation)),
            NodeType::new(16, "block").with_style(R::own(T::DefinitionKeyword)),
            NodeType::new(17, "regularlink").with_style(R::inherited(T::Link)),
            NodeType::new(18, "table"),
            NodeType::new(19, "paragraph"),
            NodeType::new(20, "plaintext"),
            NodeType::new(21, "list"),
            NodeType::new(22, "heading").with_style(R::own(T::Heading)),
            NodeType::new(23, "drawer"),
            NodeType::new(24, "fndef").with_style(R::own(T::TypeName)),
            NodeType::new(25, "fnref").with_style(R::own(T::VariableName)),
            NodeType::new(26, "nada"),
        ];
        Ok(Self::new(types)?.with_comment_token("#"))
    }

    /// Line comment token advertised to the hosting editor.
    #[must_use]
    pub const fn with_comment_token(mut self, token: &'static str) -> Self {
        self.comment_token = Some(token);
        self
    }

    pub const fn comment_token(&self) -> Option<&'static str> {
        self.comment_token
    }

    pub fn type_of(&self, id: NodeTypeId) -> Option<&NodeType> {
        self.types.get(id.index())
    }

    pub fn style_tags_of(&self, id: NodeTypeId) -> &[StyleRule] {
        self.type_of(id).map_or(&[], |ty| ty.styles.as_slice())
    }

    pub fn name_of(&self, id: NodeTypeId) -> &'static str {
        self.type_of(id).map_or("?", |ty| ty.name)
    }

    pub fn is_top(&self, id: NodeTypeId) -> bool {
        self.type_of(id).is_some_and(|ty| ty.top)
    }

    pub fn top(&self) -> &NodeType {
        &self.types[0]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeType> {
        self.types.iter()
    }
}
