/// Who is responsible for serving a given (distro, version, requested
/// version) combination (spec §3 `SupportStatus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    /// Served by the distribution's own feed.
    Distro,
    /// Served by Microsoft's feed.
    Microsoft,
    /// Neither feed fully covers it but installation may still proceed.
    Partial,
    /// No feed can serve this version on this distro.
    Unsupported,
    /// Distro/version pair not recognised.
    Unknown,
}

impl SupportStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            SupportStatus::Distro => "distro",
            SupportStatus::Microsoft => "microsoft",
            SupportStatus::Partial => "partial",
            SupportStatus::Unsupported => "unsupported",
            SupportStatus::Unknown => "unknown",
        }
    }
}
