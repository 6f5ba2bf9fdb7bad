//! Template path normalization
//!
//! Watch targets are identified by a leading-relative path string
//! (`./posts/a.md`), so the same file added from different call sites
//! always maps to the same target.

use std::path::{Component, Path, PathBuf};

/// Prefix a path with `./` unless it is already explicitly relative or absolute.
pub fn add_leading_dot_slash(path: &str) -> String {
    if path == "." || path == ".." {
        return format!("{path}/");
    }
    if path.starts_with('/') || path.starts_with("./") || path.starts_with("../") {
        return path.to_string();
    }
    format!("./{path}")
}

/// Strip a single leading `./`, if present.
pub fn strip_leading_dot_slash(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

/// Whether the target contains glob metacharacters.
pub fn is_glob(target: &str) -> bool {
    target.contains(['*', '?', '[', '{'])
}

/// The literal directory prefix of a glob (`./src/**/*.js` -> `./src`).
///
/// Non-glob targets are returned unchanged.
pub fn glob_base(target: &str) -> &str {
    if !is_glob(target) {
        return target;
    }
    let first_magic = target.find(['*', '?', '[', '{']).unwrap_or(target.len());
    match target[..first_magic].rfind('/') {
        Some(0) => "/",
        Some(idx) => &target[..idx],
        None => ".",
    }
}

/// Whether a path carries one of the given extensions (without the dot).
pub fn has_extension(path: &str, extensions: &[String]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed == ext))
        .unwrap_or(false)
}

/// Lexically normalize a path: drop `.` components and fold `..` into parents.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Path transforms anchored at the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Anchor at the process working directory.
    pub fn current() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute form of a target (`./a.js` -> `<root>/a.js`).
    pub fn absolute(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            normalize_lexically(p)
        } else {
            normalize_lexically(&self.root.join(p))
        }
    }

    /// Root-relative form of a path, `/`-separated, without a leading `./`.
    ///
    /// Paths that fall outside the root come back in absolute form.
    pub fn relative(&self, path: &Path) -> String {
        let absolute = if path.is_absolute() {
            normalize_lexically(path)
        } else {
            normalize_lexically(&self.root.join(path))
        };
        match absolute.strip_prefix(normalize_lexically(&self.root)) {
            Ok(rel) => to_slash(rel),
            Err(_) => to_slash(&absolute),
        }
    }

    /// Leading-relative target form of any path.
    pub fn to_target(&self, path: &Path) -> String {
        add_leading_dot_slash(&self.relative(path))
    }

    /// Turn a directory into a recursive glob (`./src` -> `./src/**`).
    ///
    /// Empty input means the whole project; files are returned unchanged.
    pub fn recursive_glob(&self, path: &str) -> String {
        if path.is_empty() {
            return "./**".to_string();
        }
        let path = add_leading_dot_slash(path);
        if self.absolute(&path).is_dir() {
            let sep = if path.ends_with('/') { "" } else { "/" };
            return format!("{path}{sep}**");
        }
        path
    }
}
