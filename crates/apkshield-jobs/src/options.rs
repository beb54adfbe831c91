//! Typed protection options and the option-to-flag mapper.
//!
//! # Design
//! - Loosely typed form fields are parsed once into a [`ProtectionOptions`]
//!   value; unknown ABI tokens fail the whole request instead of being
//!   silently dropped.
//! - Flag emission order is fixed so the same request always produces the
//!   same command line.
//! - Signing is unconditional: there is no option that can disable it.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{JobError, JobResult};

/// CPU architectures that may be excluded from the protected output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Abi {
    /// 32-bit ARM (`armeabi-v7a` family).
    Arm,
    /// 64-bit ARM (`arm64-v8a`).
    Arm64,
    /// 32-bit x86.
    X86,
    /// 64-bit x86.
    X86_64,
}

impl Abi {
    /// Token forwarded to the external tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Abi {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arm" => Ok(Self::Arm),
            "arm64" => Ok(Self::Arm64),
            "x86" => Ok(Self::X86),
            "x86_64" => Ok(Self::X86_64),
            other => Err(JobError::validation("unknown_abi", format!(
                "unknown architecture '{other}': expected one of arm, arm64, x86, x86_64"
            ))),
        }
    }
}

/// Raw string fields collected from the upload form.
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    /// `debug` form field.
    pub debug: Option<String>,
    /// `disable_acf` form field.
    pub disable_acf: Option<String>,
    /// `dump_code` form field.
    pub dump_code: Option<String>,
    /// `keep_classes` form field.
    pub keep_classes: Option<String>,
    /// `noisy_log` form field.
    pub noisy_log: Option<String>,
    /// `smaller` form field.
    pub smaller: Option<String>,
    /// `use_protect_config` form field.
    pub use_protect_config: Option<String>,
    /// `exclude_abis` form field (comma-separated ABI tokens).
    pub exclude_abis: Option<String>,
}

/// Validated protection options for one job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectionOptions {
    /// Emit the tool's `--debug` flag.
    pub debug: bool,
    /// Emit `--disable-acf`.
    pub disable_acf: bool,
    /// Emit `--dump-code`.
    pub dump_code: bool,
    /// Emit `-K` (keep classes).
    pub keep_classes: bool,
    /// Emit `--noisy-log`.
    pub noisy_log: bool,
    /// Emit `-S` (smaller output).
    pub smaller: bool,
    /// Emit `-c <template>` when the configured template exists.
    pub use_protect_config: bool,
    /// Architectures excluded from the output, in caller order.
    pub exclude_abis: Vec<Abi>,
}

impl ProtectionOptions {
    /// Parse and validate the raw form fields.
    ///
    /// Only the literal string `"true"` enables a boolean flag; anything else
    /// (including absence) leaves it off. Unknown ABI tokens reject the whole
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Validation`] when `exclude_abis` contains a token
    /// outside the supported set.
    pub fn parse(raw: &RawOptions) -> JobResult<Self> {
        let exclude_abis = raw
            .exclude_abis
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map_or_else(|| Ok(Vec::new()), parse_abi_list)?;

        Ok(Self {
            debug: is_true(raw.debug.as_deref()),
            disable_acf: is_true(raw.disable_acf.as_deref()),
            dump_code: is_true(raw.dump_code.as_deref()),
            keep_classes: is_true(raw.keep_classes.as_deref()),
            noisy_log: is_true(raw.noisy_log.as_deref()),
            smaller: is_true(raw.smaller.as_deref()),
            use_protect_config: is_true(raw.use_protect_config.as_deref()),
            exclude_abis,
        })
    }

    /// Map the options onto external-tool argument tokens.
    ///
    /// The emission order is fixed: `--debug`, `--disable-acf`, `--dump-code`,
    /// `-K`, `--noisy-log`, `-S`, `-e <abis>`, `-c <template>`. The template
    /// argument is skipped unless `protect_config` points at an existing file.
    #[must_use]
    pub fn to_args(&self, protect_config: Option<&Path>) -> Vec<String> {
        let mut args = Vec::new();
        for (enabled, flag) in [
            (self.debug, "--debug"),
            (self.disable_acf, "--disable-acf"),
            (self.dump_code, "--dump-code"),
            (self.keep_classes, "-K"),
            (self.noisy_log, "--noisy-log"),
            (self.smaller, "-S"),
        ] {
            if enabled {
                args.push(flag.to_string());
            }
        }
        if !self.exclude_abis.is_empty() {
            args.push("-e".to_string());
            args.push(
                self.exclude_abis
                    .iter()
                    .map(|abi| abi.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        if self.use_protect_config
            && let Some(template) = protect_config.filter(|path| path.is_file())
        {
            args.push("-c".to_string());
            args.push(template.to_string_lossy().into_owned());
        }
        args
    }

    /// Names of the enabled options, for request logging.
    #[must_use]
    pub fn enabled_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for (enabled, name) in [
            (self.debug, "debug"),
            (self.disable_acf, "disable-acf"),
            (self.dump_code, "dump-code"),
            (self.keep_classes, "keep-classes"),
            (self.noisy_log, "noisy-log"),
            (self.smaller, "smaller"),
            (self.use_protect_config, "protect-config"),
        ] {
            if enabled {
                names.push(name);
            }
        }
        if !self.exclude_abis.is_empty() {
            names.push("exclude-abis");
        }
        names
    }
}

fn parse_abi_list(value: &str) -> JobResult<Vec<Abi>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Abi::from_str)
        .collect()
}

fn is_true(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Build the full external-tool command line for one job.
#[must_use]
pub fn build_command_args(
    jar_path: &Path,
    input_file: &Path,
    output_dir: &Path,
    options: &ProtectionOptions,
    protect_config: Option<&Path>,
) -> Vec<String> {
    let mut args = vec![
        "-jar".to_string(),
        jar_path.to_string_lossy().into_owned(),
        "-f".to_string(),
        input_file.to_string_lossy().into_owned(),
        "-o".to_string(),
        output_dir.to_string_lossy().into_owned(),
    ];
    args.extend(options.to_args(protect_config));
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(exclude: Option<&str>) -> RawOptions {
        RawOptions {
            debug: Some("true".to_string()),
            keep_classes: Some("true".to_string()),
            exclude_abis: exclude.map(str::to_string),
            ..RawOptions::default()
        }
    }

    #[test]
    fn only_the_literal_true_enables_a_flag() -> JobResult<()> {
        let options = ProtectionOptions::parse(&RawOptions {
            debug: Some("true".to_string()),
            smaller: Some("TRUE".to_string()),
            noisy_log: Some("1".to_string()),
            dump_code: Some("yes".to_string()),
            ..RawOptions::default()
        })?;
        assert!(options.debug);
        assert!(!options.smaller);
        assert!(!options.noisy_log);
        assert!(!options.dump_code);
        Ok(())
    }

    #[test]
    fn abi_list_is_split_and_validated() -> JobResult<()> {
        let options = ProtectionOptions::parse(&raw(Some("x86, x86_64")))?;
        assert_eq!(options.exclude_abis, vec![Abi::X86, Abi::X86_64]);
        Ok(())
    }

    #[test]
    fn unknown_abi_token_rejects_the_request() {
        let err = ProtectionOptions::parse(&raw(Some("arm64,mips"))).expect_err("should reject");
        assert!(err.detail().contains("mips"));
    }

    #[test]
    fn flag_order_is_deterministic() -> JobResult<()> {
        let options = ProtectionOptions::parse(&raw(Some("x86,x86_64")))?;
        let args = options.to_args(None);
        assert_eq!(args, vec!["--debug", "-K", "-e", "x86,x86_64"]);
        // Parsing the same raw fields again maps to the same tokens.
        assert_eq!(ProtectionOptions::parse(&raw(Some("x86,x86_64")))?.to_args(None), args);
        Ok(())
    }

    #[test]
    fn protect_config_requires_an_existing_template() -> JobResult<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        let template = dir.path().join("protect.json");

        let options = ProtectionOptions::parse(&RawOptions {
            use_protect_config: Some("true".to_string()),
            ..RawOptions::default()
        })?;
        assert!(options.to_args(Some(&template)).is_empty());

        std::fs::write(&template, b"{}").expect("write template");
        let args = options.to_args(Some(&template));
        assert_eq!(args[0], "-c");
        assert!(args[1].ends_with("protect.json"));
        Ok(())
    }

    #[test]
    fn full_command_line_carries_io_paths_first() -> JobResult<()> {
        let options = ProtectionOptions::parse(&raw(None))?;
        let args = build_command_args(
            Path::new("/opt/dpt.jar"),
            Path::new("/scratch/in.apk"),
            Path::new("/scratch/output"),
            &options,
            None,
        );
        assert_eq!(
            &args[..6],
            &["-jar", "/opt/dpt.jar", "-f", "/scratch/in.apk", "-o", "/scratch/output"]
        );
        assert_eq!(&args[6..], &["--debug", "-K"]);
        Ok(())
    }

    #[test]
    fn enabled_names_reflect_active_flags() -> JobResult<()> {
        let options = ProtectionOptions::parse(&raw(Some("arm")))?;
        assert_eq!(options.enabled_names(), vec!["debug", "keep-classes", "exclude-abis"]);
        Ok(())
    }
}
