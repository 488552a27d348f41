//! Discovers a candidate `dotnet` host, canonicalises it, and enumerates the
//! SDKs/runtimes it reports (spec §4.10).

use dotnet_acquire_exec::{Command, CommandExecutor, ExecuteOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How long `--list-sdks`/`--list-runtimes`/`--info` results are memoized
/// for (spec §4.10 `DOTNET_INFO_TTL`).
pub const DOTNET_INFO_TTL_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkEntry {
    pub version: String,
    pub arch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEntry {
    pub version: String,
    pub arch: String,
    pub mode: String,
}

const DESKTOP_RUNTIME_NAME: &str = "Microsoft.WindowsDesktop.App";

pub struct PathFinder<'a> {
    executor: &'a CommandExecutor,
}

impl<'a> PathFinder<'a> {
    pub fn new(executor: &'a CommandExecutor) -> Self {
        Self { executor }
    }

    fn cache_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            dotnet_install_tool_cache_ttl_ms: Some(DOTNET_INFO_TTL_MS),
            ..Default::default()
        }
    }

    /// Canonicalise each candidate and accept the first whose reported
    /// architecture matches `arch` (any, if `arch` is `None`).
    pub async fn get_true_path(&self, candidates: &[PathBuf], arch: Option<&str>) -> Option<PathBuf> {
        for candidate in candidates {
            let canonical = std::fs::canonicalize(candidate).unwrap_or_else(|_| candidate.clone());
            if !canonical.exists() {
                continue;
            }
            match arch {
                None => return Some(canonical),
                Some(wanted) => {
                    if let Some(info) = self.probe_info(&canonical).await {
                        if info.architecture.eq_ignore_ascii_case(wanted) {
                            return Some(canonical);
                        }
                    }
                }
            }
        }
        None
    }

    /// Whether the host at `dotnet_path` supports the `--arch` flag, probed
    /// by passing a nonsense architecture: supporting hosts reject it with a
    /// non-zero exit code.
    pub async fn supports_arch_flag(&self, dotnet_path: &Path) -> bool {
        let cmd = Command::new(dotnet_path.to_string_lossy().to_string())
            .arg("--list-sdks")
            .arg("--arch")
            .arg("not-a-real-arch");
        match self.executor.execute(&cmd, &ExecuteOptions::default()).await {
            Ok(result) => !result.success(),
            Err(_) => false,
        }
    }

    pub async fn probe_info(&self, dotnet_path: &Path) -> Option<HostInfo> {
        let cmd = Command::new(dotnet_path.to_string_lossy().to_string()).arg("--info");
        let result = self.executor.execute(&cmd, &self.cache_options()).await.ok()?;
        parse_info(&result.stdout)
    }

    pub async fn get_sdks(&self, host: &Path, arch: Option<&str>) -> Vec<SdkEntry> {
        let supports_arch = match arch {
            Some(_) => self.supports_arch_flag(host).await,
            None => false,
        };

        let resolved_arch = if supports_arch {
            arch.map(str::to_string)
        } else {
            self.probe_info(host).await.map(|i| i.architecture)
        };

        let mut cmd = Command::new(host.to_string_lossy().to_string()).arg("--list-sdks");
        if supports_arch {
            if let Some(a) = arch {
                cmd = cmd.arg("--arch").arg(a);
            }
        }

        let result = match self.executor.execute(&cmd, &self.cache_options()).await {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "failed to list sdks");
                return Vec::new();
            }
        };

        parse_sdk_lines(&result.stdout, resolved_arch.as_deref().unwrap_or("unknown"))
    }

    pub async fn get_runtimes(&self, host: &Path, arch: Option<&str>) -> Vec<RuntimeEntry> {
        let supports_arch = match arch {
            Some(_) => self.supports_arch_flag(host).await,
            None => false,
        };

        let resolved_arch = if supports_arch {
            arch.map(str::to_string)
        } else {
            self.probe_info(host).await.map(|i| i.architecture)
        };

        let mut cmd = Command::new(host.to_string_lossy().to_string()).arg("--list-runtimes");
        if supports_arch {
            if let Some(a) = arch {
                cmd = cmd.arg("--arch").arg(a);
            }
        }

        let result = match self.executor.execute(&cmd, &self.cache_options()).await {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "failed to list runtimes");
                return Vec::new();
            }
        };

        parse_runtime_lines(&result.stdout, resolved_arch.as_deref().unwrap_or("unknown"))
            .into_iter()
            .filter(|r| r.mode != DESKTOP_RUNTIME_NAME)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct HostInfo {
    pub architecture: String,
}

fn parse_info(stdout: &str) -> Option<HostInfo> {
    for line in stdout.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Architecture:") {
            return Some(HostInfo {
                architecture: rest.trim().to_string(),
            });
        }
    }
    None
}

fn parse_sdk_lines(stdout: &str, arch: &str) -> Vec<SdkEntry> {
    stdout
        .lines()
        .filter_map(|line| {
            let version = line.split_whitespace().next()?;
            if version.is_empty() {
                return None;
            }
            Some(SdkEntry {
                version: version.to_string(),
                arch: arch.to_string(),
            })
        })
        .collect()
}

fn parse_runtime_lines(stdout: &str, arch: &str) -> Vec<RuntimeEntry> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let version = parts.next()?;
            Some(RuntimeEntry {
                version: version.to_string(),
                arch: arch.to_string(),
                mode: name.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sdk_listing() {
        let stdout = "7.0.100 [/usr/share/dotnet/sdk]\n8.0.200 [/usr/share/dotnet/sdk]\n";
        let sdks = parse_sdk_lines(stdout, "x64");
        assert_eq!(sdks.len(), 2);
        assert_eq!(sdks[0].version, "7.0.100");
    }

    #[test]
    fn filters_desktop_runtime() {
        let stdout = "Microsoft.NETCore.App 7.0.0 [/x]\nMicrosoft.WindowsDesktop.App 7.0.0 [/x]\n";
        let runtimes = parse_runtime_lines(stdout, "x64")
            .into_iter()
            .filter(|r| r.mode != DESKTOP_RUNTIME_NAME)
            .collect::<Vec<_>>();
        assert_eq!(runtimes.len(), 1);
        assert_eq!(runtimes[0].mode, "Microsoft.NETCore.App");
    }

    #[test]
    fn parses_info_architecture() {
        let stdout = "Host:\n  Version: 8.0.0\n  Architecture: x64\n  Commit: abc\n";
        let info = parse_info(stdout).unwrap();
        assert_eq!(info.architecture, "x64");
    }
}
