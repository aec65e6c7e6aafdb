use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    /// child of a directory that has not been listed yet
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub expanded: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn entry(path: PathBuf, is_directory: bool) -> Self {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let (kind, children) = if is_directory {
            (NodeKind::Directory, vec![TreeNode::placeholder()])
        } else {
            (NodeKind::File, Vec::new())
        };
        Self { label, path, kind, expanded: false, children }
    }

    fn placeholder() -> Self {
        Self {
            label: String::new(),
            path: PathBuf::new(),
            kind: NodeKind::Placeholder,
            expanded: false,
            children: Vec::new(),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == NodeKind::Placeholder
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub label: String,
    pub is_directory: bool,
    pub expanded: bool,
    /// Child indices leading from the root to this node.
    pub address: Vec<usize>,
}

/// Filesystem tree whose directories are listed one level at a time, when
/// they are expanded.
#[derive(Debug, Default)]
pub struct FileTree {
    root: Option<TreeNode>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole tree with `root_path`, expanded one level.
    pub fn initialize(&mut self, root_path: &Path) {
        self.root = Some(TreeNode {
            label: root_path.display().to_string(),
            path: root_path.to_path_buf(),
            kind: NodeKind::Directory,
            expanded: true,
            children: list_directory(root_path),
        });
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn node(&self, address: &[usize]) -> Option<&TreeNode> {
        let mut node = self.root.as_ref()?;
        for &index in address {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, address: &[usize]) -> Option<&mut TreeNode> {
        let mut node = self.root.as_mut()?;
        for &index in address {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }

    /// Throws away the directory's children and lists it again. Returns
    /// `false` when the address does not name a directory.
    pub fn expand(&mut self, address: &[usize]) -> bool {
        let Some(node) = self.node_mut(address) else {
            return false;
        };
        if !node.is_directory() {
            return false;
        }
        node.children = list_directory(&node.path);
        node.expanded = true;
        true
    }

    pub fn collapse(&mut self, address: &[usize]) {
        if let Some(node) = self.node_mut(address) {
            if node.is_directory() {
                node.expanded = false;
            }
        }
    }

    pub fn select(&self, address: &[usize]) -> Option<&Path> {
        self.node(address)
            .filter(|node| node.kind == NodeKind::File)
            .map(|node| node.path.as_path())
    }

    pub fn locate(&self, path: &Path) -> Option<Vec<usize>> {
        fn walk(node: &TreeNode, path: &Path, address: &mut Vec<usize>) -> bool {
            if node.path == path {
                return true;
            }
            for (index, child) in node.children.iter().enumerate() {
                address.push(index);
                if walk(child, path, address) {
                    return true;
                }
                address.pop();
            }
            false
        }

        let mut address = Vec::new();
        walk(self.root.as_ref()?, path, &mut address).then_some(address)
    }

    pub fn visible_rows(&self) -> Vec<TreeRow> {
        fn push_rows(node: &TreeNode, depth: usize, address: &mut Vec<usize>, rows: &mut Vec<TreeRow>) {
            rows.push(TreeRow {
                depth,
                label: node.label.clone(),
                is_directory: node.is_directory(),
                expanded: node.expanded,
                address: address.clone(),
            });
            if !node.expanded {
                return;
            }
            for (index, child) in node.children.iter().enumerate() {
                if child.is_placeholder() {
                    continue;
                }
                address.push(index);
                push_rows(child, depth + 1, address, rows);
                address.pop();
            }
        }

        let mut rows = Vec::new();
        if let Some(root) = &self.root {
            push_rows(root, 0, &mut Vec::new(), &mut rows);
        }
        rows
    }
}

/// Lists the immediate entries of `path`, directories first. A listing that
/// fails part way is reported as empty.
pub fn list_directory(path: &Path) -> Vec<TreeNode> {
    match read_entries(path) {
        Ok(entries) => entries
            .into_iter()
            .map(|(entry, is_dir)| TreeNode::entry(entry, is_dir))
            .collect(),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "directory listing failed");
            Vec::new()
        }
    }
}

fn read_entries(path: &Path) -> io::Result<Vec<(PathBuf, bool)>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        } else {
            files.push(path);
        }
    }
    dirs.sort();
    files.sort();

    Ok(dirs
        .into_iter()
        .map(|p| (p, true))
        .chain(files.into_iter().map(|p| (p, false)))
        .collect())
}
