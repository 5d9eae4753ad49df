//! Invokes the system linker to turn the object file the native backend
//! wrote into an executable. Zinc has no runtime of its own to link in
//! (spec.md §4.5: calls out to the C standard library for I/O and math
//! only), so this is a thin `cc`/`link.exe` shell-out rather than a custom
//! driver.

use std::path::Path;
use std::process::Command;

use crate::error::CodeGenError;

pub struct Linker {
    pub target: String,
    pub linker_cmd: String,
}

impl Linker {
    pub fn new(target: String) -> Self {
        let linker_cmd = if target.contains("windows") {
            "link.exe".to_string()
        } else {
            // Link through the system C compiler rather than `ld` directly
            // so libc, its startup objects, and `-lm` are found without
            // reimplementing the platform's link search path.
            "cc".to_string()
        };
        Self { target, linker_cmd }
    }

    pub fn link(
        &self,
        objects: &[&Path],
        output: &Path,
        libs: &[String],
    ) -> Result<(), CodeGenError> {
        let mut cmd = Command::new(&self.linker_cmd);
        cmd.args(objects).arg("-o").arg(output);
        for lib in libs {
            cmd.arg(format!("-l{lib}"));
        }
        cmd.arg("-lm");

        let status = cmd
            .status()
            .map_err(|e| CodeGenError::CompilationError(format!("failed to run linker: {e}")))?;
        if !status.success() {
            return Err(CodeGenError::CompilationError(format!(
                "linker exited with {status}"
            )));
        }
        Ok(())
    }
}
