//! Virtual-path normalization and naming helpers shared by the file store and its callers.
//!
//! Virtual paths are rooted at `/`, which always denotes the sandbox root. Relative input is
//! interpreted against that root.

/// Normalizes a virtual filesystem path.
///
/// Trims whitespace, converts backslashes to `/`, resolves `.`/`..`, and ensures a leading
/// slash. Returns `None` when a `..` segment would climb above the root; callers treat that as a
/// sandbox escape rather than silently clamping it.
pub fn normalize_virtual_path(path: &str) -> Option<String> {
    let trimmed = path.trim();
    let mut segments: Vec<&str> = Vec::new();
    let replaced = trimmed.replace('\\', "/");
    for segment in replaced.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            segments.pop()?;
            continue;
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        Some("/".to_string())
    } else {
        Some(format!("/{}", segments.join("/")))
    }
}

/// Joins a leaf name onto a normalized virtual directory path.
pub fn join_virtual_path(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }
}

/// Returns the parent of a normalized virtual path (`/` for top-level entries and the root).
pub fn parent_virtual_path(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Returns the final segment of a normalized virtual path, or `None` for the root.
pub fn virtual_leaf_name(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|leaf| !leaf.is_empty())
}

/// Returns `true` when `name` is usable as a single entry name inside a directory.
///
/// Separators and the `.`/`..` pseudo-entries are rejected so a name can never address anything
/// other than a direct child of its directory.
pub fn is_valid_leaf_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// Splits a file name into stem and extension (`"a.tar.gz"` -> `("a.tar", Some("gz"))`).
///
/// Leading-dot names such as `.profile` have no extension.
pub fn split_file_name(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Returns the extension of `name` without the dot, as written.
pub fn file_extension(name: &str) -> Option<&str> {
    split_file_name(name).1
}

/// Picks the first free name of the form `stem.ext`, `stem (1).ext`, `stem (2).ext`, ...
///
/// `is_taken` reports whether a candidate already exists in the target directory.
pub fn unique_child_name(
    stem: &str,
    extension: Option<&str>,
    mut is_taken: impl FnMut(&str) -> bool,
) -> String {
    let render = |counter: u32| {
        let base = if counter == 0 {
            stem.to_string()
        } else {
            format!("{stem} ({counter})")
        };
        match extension {
            Some(ext) => format!("{base}.{ext}"),
            None => base,
        }
    };

    let mut counter = 0;
    loop {
        let candidate = render(counter);
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_virtual_path_matches_expected_cases() {
        let cases = [
            ("", Some("/")),
            ("   ", Some("/")),
            ("foo/bar", Some("/foo/bar")),
            ("/foo//bar/", Some("/foo/bar")),
            ("./foo/../bar", Some("/bar")),
            ("\\\\foo\\\\bar", Some("/foo/bar")),
            ("/docs/../notes/readme.txt", Some("/notes/readme.txt")),
            ("../../etc", None),
            ("/Desktop/../../etc/passwd", None),
            ("/a/b/../../..", None),
        ];

        for (input, expected) in cases {
            assert_eq!(
                normalize_virtual_path(input).as_deref(),
                expected,
                "input={input:?}"
            );
        }
    }

    #[test]
    fn parent_and_leaf_split_normalized_paths() {
        assert_eq!(parent_virtual_path("/Desktop/notes.txt"), "/Desktop");
        assert_eq!(parent_virtual_path("/Desktop"), "/");
        assert_eq!(parent_virtual_path("/"), "/");
        assert_eq!(virtual_leaf_name("/Desktop/notes.txt"), Some("notes.txt"));
        assert_eq!(virtual_leaf_name("/"), None);
        assert_eq!(join_virtual_path("/", "Desktop"), "/Desktop");
        assert_eq!(join_virtual_path("/Desktop", "a.txt"), "/Desktop/a.txt");
    }

    #[test]
    fn leaf_names_reject_separators_and_dot_segments() {
        for bad in ["", "  ", ".", "..", "../x", "a/b", "a\\b"] {
            assert!(!is_valid_leaf_name(bad), "{bad:?} should be rejected");
        }
        for good in ["notes.txt", ".profile", "New Folder (2)"] {
            assert!(is_valid_leaf_name(good), "{good:?} should be accepted");
        }
    }

    #[test]
    fn split_file_name_keeps_dotfiles_whole() {
        assert_eq!(split_file_name("a.tar.gz"), ("a.tar", Some("gz")));
        assert_eq!(split_file_name(".profile"), (".profile", None));
        assert_eq!(split_file_name("README"), ("README", None));
        assert_eq!(split_file_name("trailing."), ("trailing.", None));
    }

    #[test]
    fn unique_child_name_counts_up_until_free() {
        let taken = ["New Folder", "New Folder (1)"];
        let name = unique_child_name("New Folder", None, |c| taken.contains(&c));
        assert_eq!(name, "New Folder (2)");

        let name = unique_child_name("New Text File", Some("txt"), |c| c == "New Text File.txt");
        assert_eq!(name, "New Text File (1).txt");
    }
}
