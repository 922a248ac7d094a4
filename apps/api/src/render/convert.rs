//! LibreOffice PDF backend: render the DOCX, then convert it with
//! `soffice --headless --convert-to pdf` inside a scratch directory.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::render::docx::render_docx;
use crate::render::{PdfBackend, RenderError, ResumeDocument, ARTIFACT_BASENAME};

#[derive(Debug, Clone)]
pub struct LibreOfficeBackend {
    binary: PathBuf,
    timeout: Duration,
    scratch_root: PathBuf,
}

impl LibreOfficeBackend {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            scratch_root: std::env::temp_dir(),
        }
    }

    /// Parent directory for per-conversion scratch directories.
    #[cfg(test)]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    /// Runs `soffice --version` and returns its banner.
    pub async fn version(&self) -> Result<String, RenderError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| self.timed_out())??;

        if !output.status.success() {
            return Err(RenderError::Conversion(format!(
                "{} --version exited with {}",
                self.binary.display(),
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn convert_in(&self, workdir: &Path, docx: &[u8]) -> Result<Vec<u8>, RenderError> {
        let input = workdir.join(format!("{ARTIFACT_BASENAME}.docx"));
        let expected = workdir.join(format!("{ARTIFACT_BASENAME}.pdf"));
        tokio::fs::write(&input, docx).await?;

        // A private profile keeps concurrent conversions from sharing a lock.
        let profile = workdir.join("profile");
        let mut cmd = Command::new(&self.binary);
        cmd.arg(format!("-env:UserInstallation=file://{}", profile.display()))
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(workdir)
            .arg(&input)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(binary = %self.binary.display(), workdir = %workdir.display(), "Starting soffice conversion");

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| self.timed_out())??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(RenderError::Conversion(format!(
                "soffice exited with {}: stderr={}, stdout={}",
                output.status,
                stderr.trim(),
                stdout.trim()
            )));
        }

        match tokio::fs::read(&expected).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RenderError::Conversion(
                "soffice finished without producing a PDF".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn timed_out(&self) -> RenderError {
        RenderError::Conversion(format!(
            "soffice did not finish within {}s",
            self.timeout.as_secs_f32()
        ))
    }
}

#[async_trait]
impl PdfBackend for LibreOfficeBackend {
    fn name(&self) -> &'static str {
        "libreoffice"
    }

    async fn render(&self, document: &ResumeDocument) -> Result<Vec<u8>, RenderError> {
        let docx = render_docx(document)?;
        let workdir = tempfile::Builder::new()
            .prefix("tailor-render-")
            .tempdir_in(&self.scratch_root)?;

        let result = self.convert_in(workdir.path(), &docx).await;
        if let Ok(bytes) = &result {
            info!(bytes = bytes.len(), "Converted DOCX to PDF with soffice");
        }
        // workdir drops here on every path.
        result
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use super::*;
    use crate::render::RenderOptions;

    const CONVERTING_SCRIPT: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "LibreOffice 7.6.4.1"
  exit 0
fi
# $1=-env:... $2=--headless $3=--convert-to $4=pdf $5=--outdir $6=DIR $7=INPUT
name=$(basename "$7" .docx)
printf '%%PDF-1.4 stub' > "$6/$name.pdf"
"#;

    const FAILING_SCRIPT: &str = "#!/bin/sh\necho 'source file could not be loaded' >&2\nexit 3\n";

    const SILENT_SCRIPT: &str = "#!/bin/sh\nexit 0\n";

    const HANGING_SCRIPT: &str = "#!/bin/sh\nsleep 5\n";

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    // One test so that no script is being written while another is executed.
    #[tokio::test]
    async fn test_conversion_with_stub_soffice() {
        let bin = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let converting = write_script(bin.path(), "soffice-ok", CONVERTING_SCRIPT);
        let failing = write_script(bin.path(), "soffice-fail", FAILING_SCRIPT);
        let silent = write_script(bin.path(), "soffice-silent", SILENT_SCRIPT);
        let hanging = write_script(bin.path(), "soffice-hang", HANGING_SCRIPT);

        let document =
            ResumeDocument::from_text(Some("Jane Doe"), "SKILLS:\n- Rust", &RenderOptions::default());
        let backend = |binary: &Path, timeout: Duration| {
            LibreOfficeBackend::new(binary, timeout).with_scratch_root(scratch.path())
        };

        let ok = backend(&converting, Duration::from_secs(10));
        assert_eq!(ok.version().await.unwrap(), "LibreOffice 7.6.4.1");
        let bytes = ok.render(&document).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 stub");
        assert!(is_empty(scratch.path()));

        let err = backend(&failing, Duration::from_secs(10))
            .render(&document)
            .await
            .unwrap_err();
        assert!(matches!(&err, RenderError::Conversion(m) if m.contains("could not be loaded")));
        assert!(is_empty(scratch.path()));

        let err = backend(&silent, Duration::from_secs(10))
            .render(&document)
            .await
            .unwrap_err();
        assert!(matches!(&err, RenderError::Conversion(m) if m.contains("without producing")));
        assert!(is_empty(scratch.path()));

        let err = backend(&hanging, Duration::from_millis(200))
            .render(&document)
            .await
            .unwrap_err();
        assert!(matches!(&err, RenderError::Conversion(m) if m.contains("did not finish")));
        assert!(is_empty(scratch.path()));

        let missing = backend(&bin.path().join("nope"), Duration::from_secs(1));
        assert!(matches!(missing.version().await, Err(RenderError::Io(_))));
    }
}
