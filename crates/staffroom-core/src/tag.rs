use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of cached entities the client tracks.
///
/// Closed on purpose: every provided or invalidated tag names one of these,
/// so a typo in an endpoint definition fails to compile instead of silently
/// never matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    User,
    Job,
    Application,
    Interview,
    Offer,
    Notification,
    Content,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::User => "user",
            TagKind::Job => "job",
            TagKind::Application => "application",
            TagKind::Interview => "interview",
            TagKind::Offer => "offer",
            TagKind::Notification => "notification",
            TagKind::Content => "content",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How narrowly a tag points within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagSelector {
    /// The whole kind, every entry that touches it.
    Kind,
    /// The collection sentinel: "the membership of this kind's lists".
    List,
    /// One entity by id.
    Item(String),
}

/// A cache tag: what slice of the data an entry provides, or a mutation
/// invalidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub kind: TagKind,
    pub selector: TagSelector,
}

impl Tag {
    /// Tag covering the whole kind.
    #[must_use]
    pub fn of(kind: TagKind) -> Self {
        Self {
            kind,
            selector: TagSelector::Kind,
        }
    }

    /// The collection sentinel for a kind.
    #[must_use]
    pub fn list(kind: TagKind) -> Self {
        Self {
            kind,
            selector: TagSelector::List,
        }
    }

    /// Tag for one entity by id.
    #[must_use]
    pub fn item(kind: TagKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            selector: TagSelector::Item(id.into()),
        }
    }

    /// Tags for a fetched collection: one item tag per id plus the list
    /// sentinel, so membership changes and single-entity edits invalidate
    /// independently.
    pub fn collection<I, S>(kind: TagKind, ids: I) -> Vec<Tag>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags: Vec<Tag> = ids.into_iter().map(|id| Tag::item(kind, id)).collect();
        tags.push(Tag::list(kind));
        tags
    }

    /// Whether this invalidation tag hits an entry providing `entry_tags`.
    ///
    /// A `Kind` tag hits every entry of its kind. A `List` tag hits entries
    /// providing the kind or the list sentinel. An `Item` tag hits the exact
    /// entity, except on entries that also carry the list sentinel: there the
    /// item tags only annotate the roster, and membership is owned by `List`.
    pub fn matches_entry(&self, entry_tags: &[Tag]) -> bool {
        match &self.selector {
            TagSelector::Kind => entry_tags.iter().any(|t| t.kind == self.kind),
            TagSelector::List => entry_tags.iter().any(|t| {
                t.kind == self.kind
                    && matches!(t.selector, TagSelector::Kind | TagSelector::List)
            }),
            TagSelector::Item(id) => {
                let mut saw_item = false;
                let mut saw_list = false;
                for t in entry_tags {
                    if t.kind != self.kind {
                        continue;
                    }
                    match &t.selector {
                        TagSelector::Kind => return true,
                        TagSelector::List => saw_list = true,
                        TagSelector::Item(entry_id) if entry_id == id => saw_item = true,
                        TagSelector::Item(_) => {}
                    }
                }
                saw_item && !saw_list
            }
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            TagSelector::Kind => write!(f, "{}", self.kind),
            TagSelector::List => write!(f, "{}:LIST", self.kind),
            TagSelector::Item(id) => write!(f, "{}:{}", self.kind, id),
        }
    }
}

/// Whether any declared invalidation tag hits an entry providing
/// `entry_tags`.
pub fn invalidation_matches(declared: &[Tag], entry_tags: &[Tag]) -> bool {
    declared.iter().any(|tag| tag.matches_entry(entry_tags))
}
