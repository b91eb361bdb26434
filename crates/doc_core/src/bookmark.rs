//! Bookmarks - named ranges delimited by start/end marker nodes
//!
//! A bookmark exists while its start marker is reachable from the document
//! root. The index maps each name to its attached markers and is updated on
//! every attach and detach, so name lookups never scan the tree.
//!
//! Read access goes through [`Bookmarks`] (`doc.bookmarks()`), edits through
//! [`BookmarksMut`] (`doc.bookmarks_mut()`).

use crate::config::BookmarkSettings;
use crate::{DocModelError, Document, NodeId, NodeKind, NodeType, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static STRICT_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").ok());

/// Validate a bookmark name against the configured rules
pub fn validate_bookmark_name(name: &str, settings: &BookmarkSettings) -> Result<()> {
    let invalid = |reason: &str| DocModelError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.graphemes(true).count() > settings.max_name_length {
        return Err(invalid(&format!(
            "name is longer than {} characters",
            settings.max_name_length
        )));
    }
    if settings.strict_names
        && !STRICT_NAME.as_ref().is_some_and(|re| re.is_match(name))
    {
        return Err(invalid(
            "name must start with a letter and contain only letters, digits, and underscores",
        ));
    }
    Ok(())
}

// =============================================================================
// Index
// =============================================================================

/// Attached markers registered under one name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkMarkers {
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct BookmarkIndex {
    markers: HashMap<String, BookmarkMarkers>,
}

impl BookmarkIndex {
    pub(crate) fn register(&mut self, name: &str, is_start: bool, id: NodeId) {
        let entry = self.markers.entry(name.to_string()).or_default();
        if is_start {
            entry.start = Some(id);
        } else {
            entry.end = Some(id);
        }
    }

    pub(crate) fn unregister(&mut self, name: &str, is_start: bool, id: NodeId) {
        let Some(entry) = self.markers.get_mut(name) else {
            return;
        };
        let slot = if is_start { &mut entry.start } else { &mut entry.end };
        if *slot == Some(id) {
            *slot = None;
        }
        if entry.start.is_none() && entry.end.is_none() {
            self.markers.remove(name);
        }
    }

    fn get(&self, name: &str) -> Option<&BookmarkMarkers> {
        self.markers.get(name)
    }

    fn start(&self, name: &str) -> Option<NodeId> {
        self.markers.get(name).and_then(|m| m.start)
    }

    fn end(&self, name: &str) -> Option<NodeId> {
        self.markers.get(name).and_then(|m| m.end)
    }
}

// =============================================================================
// Public Types
// =============================================================================

/// The marker pair of a complete bookmark; its content lies strictly between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRange {
    pub start: NodeId,
    pub end: NodeId,
}

/// A bookmark as listed by the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub name: String,
    pub start: NodeId,
    /// `None` while the end marker is not attached
    pub end: Option<NodeId>,
}

impl Bookmark {
    /// The range, if both markers are attached
    pub fn range(&self) -> Option<BookmarkRange> {
        self.end.map(|end| BookmarkRange {
            start: self.start,
            end,
        })
    }
}

/// A marker found in a subtree, with its child-index path below the subtree top
pub(crate) struct MarkerRef {
    pub(crate) name: String,
    pub(crate) is_start: bool,
    pub(crate) id: NodeId,
    path: Vec<usize>,
}

// =============================================================================
// Document hooks
// =============================================================================

impl Document {
    /// Read access to the bookmarks of this document
    pub fn bookmarks(&self) -> Bookmarks<'_> {
        Bookmarks { doc: self }
    }

    /// Edit access to the bookmarks of this document
    pub fn bookmarks_mut(&mut self) -> BookmarksMut<'_> {
        BookmarksMut { doc: self }
    }

    pub(crate) fn collect_markers(&self, top: NodeId) -> Vec<MarkerRef> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.collect_markers_into(top, &mut path, &mut out);
        out
    }

    fn collect_markers_into(&self, id: NodeId, path: &mut Vec<usize>, out: &mut Vec<MarkerRef>) {
        let Some(node) = self.get(id) else { return };
        match node.kind() {
            NodeKind::BookmarkStart { name } | NodeKind::BookmarkEnd { name } => out.push(MarkerRef {
                name: name.clone(),
                is_start: node.node_type() == NodeType::BookmarkStart,
                id,
                path: path.clone(),
            }),
            _ => {
                for (i, &child) in node.children().iter().enumerate() {
                    path.push(i);
                    self.collect_markers_into(child, path, out);
                    path.pop();
                }
            }
        }
    }

    /// Check the bookmark invariants for attaching `child` at `index` under the
    /// attached `parent`, without mutating. Returns the markers to register.
    pub(crate) fn check_bookmark_attach(
        &self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<Vec<MarkerRef>> {
        let markers = self.collect_markers(child);
        if markers.is_empty() {
            return Ok(markers);
        }

        let mut base = self.position_path(parent);
        let depth = base.len();
        base.push(index);

        let mut starts: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut ends: HashMap<&str, Vec<usize>> = HashMap::new();
        for marker in &markers {
            let (seen, registered) = if marker.is_start {
                (&mut starts, self.bookmark_index.start(&marker.name))
            } else {
                (&mut ends, self.bookmark_index.end(&marker.name))
            };
            if registered.is_some() || seen.contains_key(marker.name.as_str()) {
                return Err(DocModelError::DuplicateName(marker.name.clone()));
            }
            let mut path = base.clone();
            path.extend_from_slice(&marker.path);
            seen.insert(marker.name.as_str(), path);
        }

        // Paths of attached nodes as they will be once the child is in place.
        let shifted = |id: NodeId| {
            let mut path = self.position_path(id);
            if path.len() > depth && path[..depth] == base[..depth] && path[depth] >= index {
                path[depth] += 1;
            }
            path
        };

        for marker in &markers {
            let name = marker.name.as_str();
            let start = starts
                .get(name)
                .cloned()
                .or_else(|| self.bookmark_index.start(name).map(shifted));
            let end = ends
                .get(name)
                .cloned()
                .or_else(|| self.bookmark_index.end(name).map(shifted));
            if let (Some(start), Some(end)) = (start, end) {
                if start >= end {
                    return Err(DocModelError::invalid(format!(
                        "bookmark {:?} would end before it starts",
                        name
                    )));
                }
            }
        }

        Ok(markers)
    }

    pub(crate) fn unregister_bookmarks(&mut self, top: NodeId) {
        for marker in self.collect_markers(top) {
            self.bookmark_index
                .unregister(&marker.name, marker.is_start, marker.id);
        }
    }

    fn bookmark_range(&self, name: &str) -> Result<BookmarkRange> {
        let markers = self
            .bookmark_index
            .get(name)
            .filter(|m| m.start.is_some())
            .ok_or_else(|| DocModelError::not_found(format!("bookmark {:?}", name)))?;
        match (markers.start, markers.end) {
            (Some(start), Some(end)) => Ok(BookmarkRange { start, end }),
            _ => Err(DocModelError::invalid(format!(
                "bookmark {:?} has no attached end marker",
                name
            ))),
        }
    }

    /// Lowest node containing both `a` and `b`
    fn common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let chain: Vec<NodeId> = std::iter::once(a).chain(self.ancestors(a)).collect();
        std::iter::once(b)
            .chain(self.ancestors(b))
            .find(|n| chain.contains(n))
            .unwrap_or(self.root())
    }
}

// =============================================================================
// Read view
// =============================================================================

/// Read-only view over a document's bookmarks
#[derive(Clone, Copy)]
pub struct Bookmarks<'a> {
    doc: &'a Document,
}

impl<'a> Bookmarks<'a> {
    /// Resolve a bookmark to its marker pair.
    ///
    /// `NotFound` if no start marker with this name is attached;
    /// `InvalidOperation` if the end marker is missing.
    pub fn get(&self, name: &str) -> Result<BookmarkRange> {
        self.doc.bookmark_range(name)
    }

    /// Same as [`get`](Self::get)
    pub fn lookup(&self, name: &str) -> Result<BookmarkRange> {
        self.get(name)
    }

    /// Find a bookmark by name, complete or not
    pub fn find(&self, name: &str) -> Option<Bookmark> {
        let markers = self.doc.bookmark_index.get(name)?;
        markers.start.map(|start| Bookmark {
            name: name.to_string(),
            start,
            end: markers.end,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.doc.bookmark_index.start(name).is_some()
    }

    /// Number of bookmarks (attached start markers)
    pub fn len(&self) -> usize {
        self.doc
            .bookmark_index
            .markers
            .values()
            .filter(|m| m.start.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bookmarks in document order of their start markers
    pub fn iter(&self) -> impl Iterator<Item = Bookmark> + 'a {
        let doc = self.doc;
        let mut keyed: Vec<(Vec<usize>, Bookmark)> = doc
            .bookmark_index
            .markers
            .iter()
            .filter_map(|(name, m)| {
                m.start.map(|start| {
                    (
                        doc.position_path(start),
                        Bookmark {
                            name: name.clone(),
                            start,
                            end: m.end,
                        },
                    )
                })
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, bookmark)| bookmark)
    }

    /// Names in document order
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|b| b.name).collect()
    }

    /// The `index`-th bookmark in document order
    pub fn get_at(&self, index: usize) -> Option<Bookmark> {
        self.iter().nth(index)
    }

    /// Top-most nodes lying entirely between the two markers, in document order
    pub fn nodes(&self, name: &str) -> Result<Vec<NodeId>> {
        let range = self.get(name)?;
        let doc = self.doc;
        let scope = doc.common_ancestor(range.start, range.end);

        let mut inside = Vec::new();
        let mut capturing = false;
        for id in doc.descendants(scope) {
            if id == range.start {
                capturing = true;
                continue;
            }
            if id == range.end {
                break;
            }
            if capturing {
                inside.push(id);
            }
        }

        // Ancestors of the end marker are entered but not finished inside
        // the range; drop them, then keep only the outermost remaining nodes.
        let end_ancestors: Vec<NodeId> = doc.ancestors(range.end).collect();
        inside.retain(|n| !end_ancestors.contains(n));
        let kept: std::collections::HashSet<NodeId> = inside.iter().copied().collect();
        Ok(inside
            .into_iter()
            .filter(|&n| doc.parent(n).map_or(true, |p| !kept.contains(&p)))
            .collect())
    }

    /// Text between the markers, with the usual control characters
    pub fn text(&self, name: &str) -> Result<String> {
        let range = self.get(name)?;
        let scope = self.doc.common_ancestor(range.start, range.end);
        self.doc.text_between(scope, range.start, range.end)
    }
}

// =============================================================================
// Edit view
// =============================================================================

/// Mutable view over a document's bookmarks
pub struct BookmarksMut<'a> {
    doc: &'a mut Document,
}

impl BookmarksMut<'_> {
    /// Read access through the edit view
    pub fn view(&self) -> Bookmarks<'_> {
        self.doc.bookmarks()
    }

    /// Create a bookmark from before `first` to after `last`.
    ///
    /// A paragraph anchor is bracketed whole: the start goes in front of the
    /// first paragraph's content, the end after the last paragraph's content.
    /// Both anchors must be attached. Nothing changes if any step fails.
    pub fn insert(&mut self, name: &str, first: NodeId, last: NodeId) -> Result<BookmarkRange> {
        validate_bookmark_name(name, &self.doc.config().bookmarks)?;
        if self.doc.bookmark_index.get(name).is_some() {
            return Err(DocModelError::DuplicateName(name.to_string()));
        }
        for anchor in [first, last] {
            if !self.doc.is_attached(anchor) {
                return Err(DocModelError::invalid(format!(
                    "bookmark anchor {} is not attached to the document",
                    anchor
                )));
            }
        }

        let range = self.doc.atomically(|doc| {
            let start = doc.create_bookmark_start(name)?;
            let end = doc.create_bookmark_end(name)?;
            if doc.node_type(first) == Some(NodeType::Paragraph) {
                doc.prepend_child(first, start)?;
            } else {
                doc.insert_before(first, start)?;
            }
            if doc.node_type(last) == Some(NodeType::Paragraph) {
                doc.append_child(last, end)?;
            } else {
                doc.insert_after(last, end)?;
            }
            Ok(BookmarkRange { start, end })
        })?;

        tracing::debug!(name, "inserted bookmark");
        Ok(range)
    }

    /// Replace the content between the markers with a single run.
    ///
    /// Both markers must sit in the same paragraph. Runs between them are
    /// removed; other markers stay. Empty text leaves the range empty.
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<()> {
        let range = self.doc.bookmark_range(name)?;
        let paragraph = self.doc.parent(range.start);
        if paragraph.is_none() || paragraph != self.doc.parent(range.end) {
            return Err(DocModelError::invalid(format!(
                "bookmark {:?} spans more than one paragraph",
                name
            )));
        }
        let siblings = self.doc.children(paragraph.unwrap_or(range.start));
        let (Some(from), Some(to)) = (
            siblings.iter().position(|&c| c == range.start),
            siblings.iter().position(|&c| c == range.end),
        ) else {
            return Err(DocModelError::invalid("bookmark markers are not linked"));
        };
        let runs: Vec<NodeId> = siblings[from + 1..to]
            .iter()
            .copied()
            .filter(|&c| self.doc.node_type(c) == Some(NodeType::Run))
            .collect();

        for run in runs {
            self.doc.remove(run)?;
        }
        if !text.is_empty() {
            let run = self.doc.create_run(text);
            self.doc.insert_after(range.start, run)?;
        }
        Ok(())
    }

    /// Rename a bookmark, keeping its markers in place
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<()> {
        let markers = self
            .doc
            .bookmark_index
            .get(name)
            .copied()
            .filter(|m| m.start.is_some())
            .ok_or_else(|| DocModelError::not_found(format!("bookmark {:?}", name)))?;
        if name == new_name {
            return Ok(());
        }
        validate_bookmark_name(new_name, &self.doc.config().bookmarks)?;
        if self.doc.bookmark_index.get(new_name).is_some() {
            return Err(DocModelError::DuplicateName(new_name.to_string()));
        }

        for marker in [markers.start, markers.end].into_iter().flatten() {
            if let NodeKind::BookmarkStart { name: label } | NodeKind::BookmarkEnd { name: label } =
                self.doc.node_mut(marker)?.kind_mut()
            {
                *label = new_name.to_string();
            }
        }
        self.doc.bookmark_index.markers.remove(name);
        self.doc
            .bookmark_index
            .markers
            .insert(new_name.to_string(), markers);

        tracing::debug!(from = name, to = new_name, "renamed bookmark");
        Ok(())
    }

    /// Delete both markers; the content between them stays
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let markers = self
            .doc
            .bookmark_index
            .get(name)
            .copied()
            .filter(|m| m.start.is_some())
            .ok_or_else(|| DocModelError::not_found(format!("bookmark {:?}", name)))?;

        for marker in [markers.start, markers.end].into_iter().flatten() {
            self.doc.free_marker(marker);
        }
        self.doc.bookmark_index.markers.remove(name);

        tracing::debug!(name, "removed bookmark");
        Ok(())
    }

    /// Delete the `index`-th bookmark in document order
    pub fn remove_at(&mut self, index: usize) -> Result<()> {
        let bookmark = self
            .view()
            .get_at(index)
            .ok_or_else(|| DocModelError::not_found(format!("bookmark at index {}", index)))?;
        self.remove(&bookmark.name)
    }

    /// Delete every attached marker. Returns the number of names cleared.
    pub fn clear(&mut self) -> usize {
        let entries: Vec<BookmarkMarkers> =
            self.doc.bookmark_index.markers.drain().map(|(_, m)| m).collect();
        let count = entries.len();
        for markers in entries {
            for marker in [markers.start, markers.end].into_iter().flatten() {
                self.doc.free_marker(marker);
            }
        }

        tracing::debug!(count, "cleared bookmarks");
        count
    }
}
