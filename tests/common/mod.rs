#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pdf_squash::config::{EngineSettings, Settings};

#[path = "../../src/pdf/test_support.rs"]
mod fixtures;

/// Write a `pages`-page PDF to `path`; see `build_pdf`
pub fn write_pdf(path: &Path, pages: u32, payload: usize) -> PathBuf {
    fs::write(path, fixtures::build_pdf(pages, payload)).expect("failed to write fixture");
    path.to_path_buf()
}

/// A stand-in for Ghostscript: a `/bin/sh` script that picks the output and
/// input paths out of the pdfwrite arguments and then runs `body`, with
/// `$in` and `$out` set.
pub struct FakeEngine {
    script: PathBuf,
}

impl FakeEngine {
    pub fn new(dir: &Path, body: &str) -> Self {
        let script = dir.join("fake-gs.sh");
        let text = format!(
            r#"#!/bin/sh
out=""
in=""
for arg in "$@"; do
  case "$arg" in
    -sOutputFile=*) out="${{arg#-sOutputFile=}}" ;;
    -*) ;;
    *) in="$arg" ;;
  esac
done
echo "GPL Ghostscript 10.02.1 (2023-11-01)"
{}
"#,
            body
        );
        fs::write(&script, text).expect("failed to write fake engine");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
                .expect("failed to mark fake engine executable");
        }
        Self { script }
    }

    /// Announces `pages` pages, reports each one, then copies the input
    pub fn copying(dir: &Path, pages: u32) -> Self {
        let mut body = format!("echo \"Processing pages 1 through {}.\"\n", pages);
        for page in 1..=pages {
            body.push_str(&format!("echo \"Page {}\"\n", page));
        }
        body.push_str("cp \"$in\" \"$out\"\n");
        Self::new(dir, &body)
    }

    /// The script itself, for callers that can only name one executable
    pub fn program(&self) -> &Path {
        &self.script
    }

    pub fn engine(&self) -> EngineSettings {
        EngineSettings::new("/bin/sh").with_leading_args([self.script.to_string_lossy()])
    }

    pub fn settings(&self, work_dir: &Path) -> Settings {
        let mut settings = Settings::default()
            .with_engine(self.engine())
            .with_work_dir(work_dir);
        settings.poll_interval = Duration::from_millis(20);
        settings.grace_period = Duration::from_millis(300);
        settings
    }
}

pub fn dir_entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
