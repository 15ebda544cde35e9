//! Structured doc-comment records produced by the parser.

/// One `/** ... */` block and the code it documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    /// First paragraph of the description.
    pub summary: String,
    /// Remaining description paragraphs.
    pub body: String,
    /// Tags in source order.
    pub tags: Vec<Tag>,
    /// Declaration on the first code line after the comment.
    pub context: Option<Context>,
    /// 1-based line the comment opens on.
    pub line: usize,
}

impl Comment {
    /// `@api private` comments are left out of rendered output.
    pub fn is_private(&self) -> bool {
        self.tags
            .iter()
            .any(|tag| matches!(tag, Tag::Api { visibility } if visibility == "private"))
    }

    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.tags.iter().filter_map(|tag| match tag {
            Tag::Param(param) => Some(param),
            _ => None,
        })
    }

    pub fn returns(&self) -> Option<(&[String], &str)> {
        self.tags.iter().find_map(|tag| match tag {
            Tag::Return { types, description } => Some((types.as_slice(), description.as_str())),
            _ => None,
        })
    }
}

/// A parsed `@tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `@param {Type} name description`
    Param(Param),
    /// `@return {Type} description`
    Return {
        types: Vec<String>,
        description: String,
    },
    /// `@api public|private`
    Api { visibility: String },
    /// `@example` followed by code lines.
    Example { code: String },
    /// `@deprecated note`
    Deprecated { note: String },
    /// `@see target`
    See { target: String },
    /// Anything else, kept verbatim.
    Other { name: String, value: String },
}

/// A documented parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub types: Vec<String>,
    pub description: String,
    /// Written as `[name]` or `[name=default]`.
    pub optional: bool,
}

/// What kind of declaration a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Function,
    Method,
    Class,
    Property,
    Declaration,
}

/// The declaration following a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub kind: ContextKind,
    pub name: String,
    /// Owner for methods and properties (`Widget` in `Widget.prototype.draw`).
    pub receiver: Option<String>,
    /// Raw parameter list for callables, whitespace-normalized.
    pub params: Option<String>,
}

impl Context {
    /// Human-readable signature used as the section heading.
    pub fn signature(&self) -> String {
        let qualified = match &self.receiver {
            Some(receiver) => format!("{receiver}.{}", self.name),
            None => self.name.clone(),
        };

        match self.kind {
            ContextKind::Class => format!("class {qualified}"),
            ContextKind::Function | ContextKind::Method => {
                format!("{qualified}({})", self.params.as_deref().unwrap_or(""))
            }
            ContextKind::Property | ContextKind::Declaration => qualified,
        }
    }
}
