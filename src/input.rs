//! Reads the raw account list from its configured source.

use std::io::Read;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::config::InputSource;
use crate::github::error::IntakeError;

/// Returns the raw text for `source`, consuming `stdin` only when the source
/// is standard input.
///
/// # Errors
///
/// Returns [`IntakeError::Io`] when the file or standard input cannot be
/// read.
pub fn read_input(
    source: &InputSource<'_>,
    stdin: &mut impl Read,
) -> Result<String, IntakeError> {
    match source {
        InputSource::Inline(text) => Ok((*text).to_owned()),
        InputSource::File(path) => read_file(path),
        InputSource::Stdin => {
            let mut buffer = String::new();
            stdin
                .read_to_string(&mut buffer)
                .map_err(|error| IntakeError::Io {
                    message: format!("failed to read account list from stdin: {error}"),
                })?;
            Ok(buffer)
        }
    }
}

fn read_file(path: &Utf8Path) -> Result<String, IntakeError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| IntakeError::Io {
        message: format!("invalid input path '{path}': no file name"),
    })?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        IntakeError::Io {
            message: format!("failed to open input directory '{parent}': {error}"),
        }
    })?;
    dir.read_to_string(file_name)
        .map_err(|error| IntakeError::Io {
            message: format!("failed to read account list '{path}': {error}"),
        })
}

#[cfg(test)]
mod tests {
    use std::io;

    use camino::Utf8PathBuf;

    use super::read_input;
    use crate::config::InputSource;
    use crate::github::error::IntakeError;

    #[test]
    fn inline_text_ignores_stdin() {
        let text = read_input(&InputSource::Inline("octocat"), &mut io::empty())
            .expect("inline input should be returned");
        assert_eq!(text, "octocat");
    }

    #[test]
    fn reads_stdin_to_end() {
        let text = read_input(&InputSource::Stdin, &mut "a, b\nc".as_bytes())
            .expect("stdin should be read");
        assert_eq!(text, "a, b\nc");
    }

    #[test]
    fn reads_named_file() {
        let dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("accounts.txt"))
            .expect("temporary path should be UTF-8");
        std::fs::write(&path, "octocat\nhubot\n").expect("fixture should be written");

        let text = read_input(&InputSource::File(path), &mut io::empty())
            .expect("file should be read");

        assert_eq!(text, "octocat\nhubot\n");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.txt"))
            .expect("temporary path should be UTF-8");

        let result = read_input(&InputSource::File(path), &mut io::empty());

        assert!(
            matches!(result, Err(IntakeError::Io { .. })),
            "expected Io error, got {result:?}"
        );
    }
}
