//! High-level Repository API
//!
//! Ties a workspace, its object store, HEAD and config together. This is
//! the main entry point for snapshotting a directory.

use crate::codec::{Encode, Object};
use crate::config::Config;
use crate::model::{Author, Blob, Commit, Entry, FileMode, ObjectId, Tree};
use crate::store::{Head, ObjectStore};
use crate::workspace::{Workspace, META_DIR};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of [`Repository::commit`]
#[derive(Clone, Debug)]
pub struct CommitSummary {
    pub id: ObjectId,
    pub tree: ObjectId,
    /// True when HEAD was empty before this commit
    pub root: bool,
    pub commit: Commit,
}

/// A workspace with its `.cairn` metadata directory
///
/// Provides:
/// - Repository creation and opening
/// - Recursive tree snapshots of the workspace
/// - Commits that move the single HEAD pointer
pub struct Repository {
    workspace: Workspace,
    store: ObjectStore,
    head: Head,
    config: Config,
    meta: PathBuf,
}

impl Repository {
    /// Create `.cairn/objects` and a default config under `path`
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref();
        let meta = root.join(META_DIR);
        fs::create_dir_all(meta.join("objects"))?;

        let config_path = meta.join("config.json");
        if !config_path.exists() {
            Config::default().save(&config_path)?;
        }

        info!(path = %meta.display(), "initialized repository");
        Self::open(root)
    }

    /// Open an existing repository
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let meta = root.join(META_DIR);
        if !meta.join("objects").is_dir() {
            return Err(Error::NotFound(format!(
                "no repository at {}",
                root.display()
            )));
        }

        let config = Config::load(&meta.join("config.json"))?;
        let store =
            ObjectStore::new(meta.join("objects")).with_compression_level(config.compression_level);

        Ok(Repository {
            workspace: Workspace::new(root),
            store,
            head: Head::new(meta.join("HEAD")),
            config,
            meta,
        })
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the `.cairn` directory
    pub fn meta_dir(&self) -> &Path {
        &self.meta
    }

    /// Current HEAD commit, if any
    pub fn head(&self) -> Result<Option<ObjectId>> {
        self.head.read()
    }

    /// Hash a file as a blob, storing it when `write` is set
    pub fn hash_object(&self, path: &Path, write: bool) -> Result<ObjectId> {
        let blob = Blob::new(self.workspace.read_bytes(path)?);
        if write {
            self.store.store(&blob)
        } else {
            blob.id()
        }
    }

    /// Store the whole workspace as nested trees, returning the root tree id
    pub fn write_tree(&self) -> Result<ObjectId> {
        self.write_dir(self.workspace.root())
    }

    fn write_dir(&self, dir: &Path) -> Result<ObjectId> {
        let mut tree = Tree::new();
        for path in self.workspace.list_entries(dir)? {
            let name = self.workspace.entry_name(&path)?;
            let mode = self.workspace.file_mode(&path)?;
            let id = if mode == FileMode::Directory {
                self.write_dir(&path)?
            } else {
                self.store.store(&Blob::new(self.workspace.read_bytes(&path)?))?
            };
            tree.insert(Entry::with_mode(name, id, mode))?;
        }

        let id = self.store.store(&tree)?;
        debug!(%id, dir = %dir.display(), entries = tree.len(), "stored tree");
        Ok(id)
    }

    /// Snapshot the workspace and record a commit with the configured author
    pub fn commit(&self, message: &str) -> Result<CommitSummary> {
        self.commit_with_author(message, self.config.author()?)
    }

    /// Snapshot the workspace and record a commit by `author`
    pub fn commit_with_author(&self, message: &str, author: Author) -> Result<CommitSummary> {
        self.commit_as(Commit::new(self.write_tree()?, author, message))
    }

    /// Store a prepared commit and move HEAD to it
    pub fn commit_as(&self, commit: Commit) -> Result<CommitSummary> {
        let root = self.head.read()?.is_none();
        let id = self.store.store(&commit)?;
        self.head.update(&id)?;

        info!(%id, tree = %commit.tree, root, "created commit");
        Ok(CommitSummary {
            id,
            tree: commit.tree,
            root,
            commit,
        })
    }

    /// Load any object by id
    pub fn cat_object(&self, id: &ObjectId) -> Result<Object> {
        self.store.load(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ada() -> Author {
        Author::new("Ada", "ada@example.com").unwrap()
    }

    #[test]
    fn test_init_and_open() {
        let dir = tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        assert!(dir.path().join(".cairn/objects").is_dir());
        assert!(dir.path().join(".cairn/config.json").is_file());

        let repo = Repository::open(dir.path()).unwrap();
        assert_eq!(repo.head().unwrap(), None);
    }

    #[test]
    fn test_open_missing_repository() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_write_tree_nests_directories() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("readme.md"), b"# hi\n").unwrap();
        fs::create_dir_all(dir.path().join("src/inner")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), b"fn main() {}\n").unwrap();
        fs::write(dir.path().join("src/inner/mod.rs"), b"").unwrap();

        let root_id = repo.write_tree().unwrap();
        let root = repo.store().load_tree(&root_id).unwrap();

        let names: Vec<&str> = root.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["readme.md", "src"]);

        let src = root.get("src").unwrap();
        assert_eq!(src.mode, FileMode::Directory);
        let src_tree = repo.store().load_tree(&src.id).unwrap();
        assert!(src_tree.get("inner").unwrap().mode.is_tree());

        let lib = repo
            .store()
            .load_blob(&src_tree.get("lib.rs").unwrap().id)
            .unwrap();
        assert_eq!(lib.data(), b"fn main() {}\n");
    }

    #[test]
    fn test_write_tree_excludes_metadata() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let root = repo.store().load_tree(&repo.write_tree().unwrap()).unwrap();
        assert!(root.is_empty());
        assert_eq!(root.id().unwrap(), Tree::new().id().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_tree_ignores_broken_symlinks() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("kept.txt"), b"kept").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("link")).unwrap();

        let root = repo.store().load_tree(&repo.write_tree().unwrap()).unwrap();
        let names: Vec<&str> = root.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["kept.txt"]);
    }

    #[test]
    fn test_write_tree_is_stable() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a"), b"1").unwrap();

        assert_eq!(repo.write_tree().unwrap(), repo.write_tree().unwrap());
    }

    #[test]
    fn test_commit_moves_head() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("hello.txt"), b"hello").unwrap();

        let tree = repo.write_tree().unwrap();
        let first = repo
            .commit_as(Commit::with_timestamp(tree, ada(), "init\n", 1))
            .unwrap();
        assert!(first.root);
        assert_eq!(repo.head().unwrap(), Some(first.id));

        let second = repo
            .commit_as(Commit::with_timestamp(tree, ada(), "again\n", 2))
            .unwrap();
        assert!(!second.root);
        assert_eq!(repo.head().unwrap(), Some(second.id));

        let stored = repo.store().load_commit(&second.id).unwrap();
        assert_eq!(stored.tree, tree);
        assert_eq!(stored.title(), "again");
    }

    #[test]
    fn test_commit_uses_configured_author() {
        let dir = tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let config = Config {
            author: Some(ada()),
            ..Config::default()
        };
        config.save(&dir.path().join(".cairn/config.json")).unwrap();
        fs::write(dir.path().join("notes.txt"), b"notes").unwrap();

        let repo = Repository::open(dir.path()).unwrap();
        let author = repo.config().author_with(|_| None).unwrap();
        let summary = repo.commit_with_author("from config", author).unwrap();

        assert_eq!(summary.commit.author, ada());
        assert_eq!(summary.tree, repo.write_tree().unwrap());
        let stored = repo.store().load_commit(&summary.id).unwrap();
        assert_eq!(stored.author, ada());
        assert_eq!(stored.message, "from config");
    }

    #[test]
    fn test_hash_object_write_flag() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let path = dir.path().join("file");
        fs::write(&path, b"hello").unwrap();

        let id = repo.hash_object(&path, false).unwrap();
        assert_eq!(id, ObjectId::digest(b"blob 5\0hello"));
        assert!(!repo.store().contains(&id));

        assert_eq!(repo.hash_object(&path, true).unwrap(), id);
        assert!(repo.store().contains(&id));
        assert!(matches!(repo.cat_object(&id).unwrap(), Object::Blob(_)));
    }
}
