//! Fake converter executables
//!
//! A [`FakeSoffice`] is a small shell script that understands the
//! `--convert-to pdf ... --outdir DIR INPUT` command line and behaves in a
//! scripted way, so conversion can be tested without LibreOffice installed.

use std::path::{Path, PathBuf};

/// Behaviour of the fake `soffice` script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeSoffice {
    /// Writes a small valid-looking PDF next to the input
    Pdf,
    /// Prints `stderr` and exits with `code`
    Fail { code: i32, stderr: &'static str },
    /// Exits successfully without producing anything
    NoOutput,
    /// Produces a zero-byte PDF
    EmptyPdf,
    /// Produces a file that does not start with `%PDF`
    NotPdf,
    /// Never finishes on its own
    Hang,
}

/// Version line printed for `soffice --version`
pub const FAKE_SOFFICE_VERSION: &str = "LibreOffice 24.2.0.3 420(Build:3)";

impl FakeSoffice {
    /// Write the script as `<dir>/soffice` and return its path
    ///
    /// The received arguments are recorded in `<dir>/soffice-args.txt`.
    #[cfg(unix)]
    pub fn install(self, dir: &Path) -> PathBuf {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("soffice");
        let args_file = Self::args_file(dir);

        let action = match self {
            FakeSoffice::Pdf => {
                r#"printf '%s\n' '%PDF-1.7' '1 0 obj' 'endobj' '%%EOF' > "$outdir/$name.pdf""#.to_string()
            }
            FakeSoffice::Fail { code, stderr } => format!("echo '{}' >&2\nexit {}", stderr, code),
            FakeSoffice::NoOutput => "exit 0".to_string(),
            FakeSoffice::EmptyPdf => r#": > "$outdir/$name.pdf""#.to_string(),
            FakeSoffice::NotPdf => r#"echo 'not a pdf' > "$outdir/$name.pdf""#.to_string(),
            FakeSoffice::Hang => "exec sleep 30".to_string(),
        };

        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "{version}"
  exit 0
fi
echo "$@" > "{args}"
outdir=""
prev=""
input=""
for arg in "$@"; do
  if [ "$prev" = "--outdir" ]; then
    outdir="$arg"
  fi
  prev="$arg"
  input="$arg"
done
name=$(basename "$input" .docx)
{action}
"#,
            version = FAKE_SOFFICE_VERSION,
            args = args_file.display(),
            action = action,
        );

        {
            let mut file = std::fs::File::create(&path).expect("Failed to create fake soffice");
            file.write_all(script.as_bytes())
                .expect("Failed to write fake soffice");
            file.sync_all().expect("Failed to sync fake soffice");
        }

        let mut perms = std::fs::metadata(&path)
            .expect("Failed to get metadata")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("Failed to set permissions");

        path
    }

    /// File where the script records its arguments
    pub fn args_file(dir: &Path) -> PathBuf {
        dir.join("soffice-args.txt")
    }
}
