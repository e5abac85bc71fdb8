//! Folder registry and path reconstruction
//!
//! A traversal records every folder it discovers as `id -> {name, parent}`.
//! Paths are rebuilt by following parent pointers up to, but excluding, the
//! traversal root.

use std::collections::HashMap;

/// Name given to the synthetic root entry
pub const ROOT_NAME: &str = "Root";

/// A folder observed during one traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    /// None marks the traversal root
    pub parent: Option<String>,
}

/// Outcome of looking up a folder id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a FolderNode),
    Missing,
}

/// Id-to-node arena for one traversal
#[derive(Debug, Default)]
pub struct FolderMap {
    nodes: HashMap<String, FolderNode>,
}

impl FolderMap {
    /// Create a map seeded with the traversal root
    pub fn with_root(root_id: &str) -> Self {
        let mut map = Self::default();
        map.nodes.insert(
            root_id.to_string(),
            FolderNode {
                id: root_id.to_string(),
                name: ROOT_NAME.to_string(),
                parent: None,
            },
        );
        map
    }

    /// Register a folder the first time it is seen.
    ///
    /// Returns false (and leaves the existing node untouched) if the id is
    /// already known.
    pub fn register(&mut self, id: &str, name: &str, parent: Option<&str>) -> bool {
        if self.nodes.contains_key(id) {
            return false;
        }
        self.nodes.insert(
            id.to_string(),
            FolderNode {
                id: id.to_string(),
                name: name.to_string(),
                parent: parent.map(String::from),
            },
        );
        true
    }

    pub fn lookup(&self, id: &str) -> Lookup<'_> {
        match self.nodes.get(id) {
            Some(node) => Lookup::Found(node),
            None => Lookup::Missing,
        }
    }

    /// Number of registered folders, root included
    pub fn folder_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Slash-joined folder names from the root (exclusive) down to `folder_id`.
///
/// Stops at the root or at the first parent id the map does not know. The
/// walk is bounded by the map size so a parent cycle cannot spin forever.
pub fn resolve_path(folder_id: Option<&str>, folders: &FolderMap) -> String {
    let Some(start) = folder_id.filter(|id| !id.is_empty()) else {
        return String::new();
    };

    let mut names: Vec<&str> = Vec::new();
    let mut current = start;
    for _ in 0..folders.folder_count() {
        let node = match folders.lookup(current) {
            Lookup::Found(node) => node,
            // dangling parent: the path ends here
            Lookup::Missing => break,
        };
        let Some(parent) = node.parent.as_deref() else {
            break;
        };
        names.push(&node.name);
        current = parent;
    }

    names.reverse();
    names.join("/")
}
