//! Path resolution logic
//!
//! This module handles splitting paths into components and walking them
//! against a directory structure.

use crate::{EntryIndex, FsError, MAX_NAME_LEN};

/// Component separator
pub const SEPARATOR: char = '/';

/// Child lookup used while walking a path
///
/// The namespace table implements this; resolution itself never touches
/// table storage directly.
pub trait DirectoryLookup {
    /// Finds the child of `parent` whose name equals `name` byte for byte
    fn find_child(&self, parent: EntryIndex, name: &str) -> Option<EntryIndex>;
}

/// Path resolver
///
/// Side-effect-free translation of slash-delimited paths.
pub struct PathResolver;

impl PathResolver {
    /// Splits off the first component of `path`
    ///
    /// Leading separators are skipped. The remainder still starts with its
    /// separator and is `None` once the string is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use fs_table::PathResolver;
    ///
    /// assert_eq!(PathResolver::split_next_component("//docs/a.txt"), ("docs", Some("/a.txt")));
    /// assert_eq!(PathResolver::split_next_component("a.txt"), ("a.txt", None));
    /// ```
    pub fn split_next_component(path: &str) -> (&str, Option<&str>) {
        let path = path.trim_start_matches(SEPARATOR);
        match path.find(SEPARATOR) {
            Some(pos) => (&path[..pos], Some(&path[pos..])),
            None => (path, None),
        }
    }

    /// Iterates over the non-empty components of `path`
    pub fn components(path: &str) -> impl Iterator<Item = &str> {
        path.split(SEPARATOR).filter(|component| !component.is_empty())
    }

    /// Resolves `path` to a table index, starting at the root
    ///
    /// An empty path and `"/"` name the root. Repeated separators are
    /// ignored. A file in the middle of a path has no children, so the walk
    /// simply fails with `NotFound` there, as does any component longer
    /// than `MAX_NAME_LEN`.
    pub fn resolve<L>(lookup: &L, path: &str) -> Result<EntryIndex, FsError>
    where
        L: DirectoryLookup + ?Sized,
    {
        let mut current = EntryIndex::ROOT;
        if path.is_empty() || path == "/" {
            return Ok(current);
        }

        let mut rest = Some(path);
        while let Some(remaining) = rest {
            let (component, next) = Self::split_next_component(remaining);
            rest = next;
            if component.is_empty() {
                continue;
            }
            if component.len() > MAX_NAME_LEN {
                return Err(FsError::NotFound);
            }
            current = lookup
                .find_child(current, component)
                .ok_or(FsError::NotFound)?;
        }

        Ok(current)
    }

    /// Splits `path` at its last separator into parent path and leaf name
    ///
    /// The parent is `"/"` when nothing precedes the separator, or when the
    /// path has no separator at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use fs_table::PathResolver;
    ///
    /// assert_eq!(PathResolver::split_parent_and_leaf("/docs/a.txt"), Ok(("/docs", "a.txt")));
    /// assert_eq!(PathResolver::split_parent_and_leaf("/docs"), Ok(("/", "docs")));
    /// ```
    pub fn split_parent_and_leaf(path: &str) -> Result<(&str, &str), FsError> {
        let (parent, leaf) = match path.rfind(SEPARATOR) {
            Some(pos) => (&path[..pos], &path[pos + 1..]),
            None => ("", path),
        };

        if leaf.is_empty() {
            return Err(FsError::InvalidName);
        }

        let parent = if parent.is_empty() { "/" } else { parent };
        Ok((parent, leaf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Directory structure keyed by (parent, name)
    struct MapLookup(HashMap<(usize, &'static str), usize>);

    impl MapLookup {
        fn sample() -> Self {
            // /docs(1) /docs/a.txt(2) /docs/sub(3) /docs/sub/b(4)
            let mut map = HashMap::new();
            map.insert((0, "docs"), 1);
            map.insert((1, "a.txt"), 2);
            map.insert((1, "sub"), 3);
            map.insert((3, "b"), 4);
            Self(map)
        }
    }

    impl DirectoryLookup for MapLookup {
        fn find_child(&self, parent: EntryIndex, name: &str) -> Option<EntryIndex> {
            self.0
                .iter()
                .find(|((p, n), _)| *p == parent.get() && *n == name)
                .map(|(_, child)| EntryIndex::new(*child))
        }
    }

    #[test]
    fn test_split_next_component() {
        assert_eq!(
            PathResolver::split_next_component("/docs/a.txt"),
            ("docs", Some("/a.txt"))
        );
        assert_eq!(PathResolver::split_next_component("/a.txt"), ("a.txt", None));
        assert_eq!(PathResolver::split_next_component("docs/"), ("docs", Some("/")));
        assert_eq!(PathResolver::split_next_component("/"), ("", None));
        assert_eq!(PathResolver::split_next_component(""), ("", None));
    }

    #[test]
    fn test_components_skip_empty() {
        let parts: Vec<&str> = PathResolver::components("//docs///sub/").collect();
        assert_eq!(parts, vec!["docs", "sub"]);
    }

    #[test]
    fn test_resolve_root() {
        let lookup = MapLookup::sample();
        assert_eq!(PathResolver::resolve(&lookup, ""), Ok(EntryIndex::ROOT));
        assert_eq!(PathResolver::resolve(&lookup, "/"), Ok(EntryIndex::ROOT));
        assert_eq!(PathResolver::resolve(&lookup, "///"), Ok(EntryIndex::ROOT));
    }

    #[test]
    fn test_resolve_nested() {
        let lookup = MapLookup::sample();
        assert_eq!(
            PathResolver::resolve(&lookup, "/docs/sub/b"),
            Ok(EntryIndex::new(4))
        );
        assert_eq!(
            PathResolver::resolve(&lookup, "docs//sub/"),
            Ok(EntryIndex::new(3))
        );
    }

    #[test]
    fn test_resolve_missing_component() {
        let lookup = MapLookup::sample();
        assert_eq!(
            PathResolver::resolve(&lookup, "/docs/missing"),
            Err(FsError::NotFound)
        );
        assert_eq!(
            PathResolver::resolve(&lookup, "/docs/a.txt/deeper"),
            Err(FsError::NotFound)
        );
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let lookup = MapLookup::sample();
        assert_eq!(PathResolver::resolve(&lookup, "/DOCS"), Err(FsError::NotFound));
    }

    #[test]
    fn test_split_parent_and_leaf() {
        assert_eq!(
            PathResolver::split_parent_and_leaf("/docs/sub/b"),
            Ok(("/docs/sub", "b"))
        );
        assert_eq!(PathResolver::split_parent_and_leaf("/docs"), Ok(("/", "docs")));
        assert_eq!(PathResolver::split_parent_and_leaf("docs"), Ok(("/", "docs")));
        assert_eq!(
            PathResolver::split_parent_and_leaf("docs/a.txt"),
            Ok(("docs", "a.txt"))
        );
    }

    #[test]
    fn test_split_empty_leaf() {
        assert_eq!(
            PathResolver::split_parent_and_leaf("/docs/"),
            Err(FsError::InvalidName)
        );
        assert_eq!(PathResolver::split_parent_and_leaf("/"), Err(FsError::InvalidName));
        assert_eq!(PathResolver::split_parent_and_leaf(""), Err(FsError::InvalidName));
    }

    /// Answers every lookup, so only the resolver's own checks can fail
    struct AnyName;

    impl DirectoryLookup for AnyName {
        fn find_child(&self, parent: EntryIndex, _name: &str) -> Option<EntryIndex> {
            Some(EntryIndex::new(parent.get() + 1))
        }
    }

    #[test]
    fn test_component_length_bound() {
        let exact = "c".repeat(MAX_NAME_LEN);
        let overlong = "c".repeat(MAX_NAME_LEN + 1);

        assert_eq!(
            PathResolver::resolve(&AnyName, &format!("/{}/{}", exact, exact)),
            Ok(EntryIndex::new(2))
        );
        assert_eq!(
            PathResolver::resolve(&AnyName, &format!("/{}", overlong)),
            Err(FsError::NotFound)
        );
        assert_eq!(
            PathResolver::resolve(&AnyName, &format!("/a/{}/b", overlong)),
            Err(FsError::NotFound)
        );

        // Splitting alone does not bound length; creation rejects the leaf
        let path = format!("/{}/rest", overlong);
        assert_eq!(
            PathResolver::split_next_component(&path),
            (overlong.as_str(), Some("/rest"))
        );
    }
}
