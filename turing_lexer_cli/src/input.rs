//! Source and profile loading
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use turing_lexer::profile::builtin;
use turing_lexer::{LexiconProfile, ProfileError};

use crate::ProfileArgs;

/// Marker for reading the source from stdin
pub const STDIN: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot infer a profile for '{input}'; pass --profile or --profile-file")]
    NoProfile { input: String },

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Reads a file, or all of stdin for `-`
pub fn read_source(input: &str) -> Result<String, InputError> {
    if input == STDIN {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|source| InputError::Read {
                path: "<stdin>".to_string(),
                source,
            })?;
        return Ok(buffer);
    }

    std::fs::read_to_string(input).map_err(|source| InputError::Read {
        path: input.to_string(),
        source,
    })
}

/// Built-in profile id for a file extension
pub fn profile_for_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "py" | "pyw" => Some(builtin::IMPERATIVE),
        "rkt" | "scm" | "ss" | "lisp" | "el" => Some(builtin::SYMBOLIC),
        "sql" => Some(builtin::QUERY),
        _ => None,
    }
}

/// `--profile-file`, then `--profile`, then the input's extension
pub fn resolve_profile(args: &ProfileArgs, input: &str) -> Result<Arc<LexiconProfile>, InputError> {
    if let Some(path) = &args.profile_file {
        return Ok(LexiconProfile::from_toml_file(path)?.into_shared());
    }
    if let Some(name) = &args.profile {
        return Ok(builtin::by_name(name)?);
    }

    let inferred = if input == STDIN {
        None
    } else {
        profile_for_extension(Path::new(input))
    };
    match inferred {
        Some(name) => Ok(builtin::by_name(name)?),
        None => Err(InputError::NoProfile {
            input: input.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_extension_inference() {
        assert_eq!(profile_for_extension(Path::new("a/b.py")), Some("imperative"));
        assert_eq!(profile_for_extension(Path::new("lib.RKT")), Some("symbolic"));
        assert_eq!(profile_for_extension(Path::new("x.scm")), Some("symbolic"));
        assert_eq!(profile_for_extension(Path::new("q.sql")), Some("query"));
        assert_eq!(profile_for_extension(Path::new("notes.txt")), None);
        assert_eq!(profile_for_extension(Path::new("Makefile")), None);
    }

    #[test]
    fn test_explicit_profile_wins_over_extension() {
        let args = ProfileArgs {
            profile: Some("sql".to_string()),
            profile_file: None,
        };
        assert_eq!(resolve_profile(&args, "script.py").unwrap().id(), "query");

        let inferred = resolve_profile(&ProfileArgs::default(), "script.py").unwrap();
        assert_eq!(inferred.id(), "imperative");
    }

    #[test]
    fn test_stdin_needs_a_profile() {
        assert_matches!(
            resolve_profile(&ProfileArgs::default(), STDIN),
            Err(InputError::NoProfile { .. })
        );
        assert_matches!(
            resolve_profile(&ProfileArgs::default(), "README"),
            Err(InputError::NoProfile { .. })
        );
    }

    #[test]
    fn test_profile_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id = \"ini\"\noperators = [\"=\"]\ndelimiters = \"[]\"").unwrap();
        let args = ProfileArgs {
            profile: None,
            profile_file: Some(file.path().to_path_buf()),
        };
        assert_eq!(resolve_profile(&args, "settings.py").unwrap().id(), "ini");
    }

    #[test]
    fn test_unknown_profile_and_missing_file() {
        let args = ProfileArgs {
            profile: Some("cobol".to_string()),
            profile_file: None,
        };
        assert_matches!(
            resolve_profile(&args, "x.py"),
            Err(InputError::Profile(ProfileError::UnknownProfile { .. }))
        );

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.py");
        assert_matches!(
            read_source(missing.to_str().unwrap()),
            Err(InputError::Read { .. })
        );
    }
}
