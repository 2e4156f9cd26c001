use std::fmt;

use crate::error::AssemblyError;

/// Angular momentum of a shell record as it appears in a basis database.
///
/// Most records describe a single angular momentum. Pople style basis sets
/// additionally contain combined "L" (or "SP") records, where an s and a p
/// shell share their exponents but have separate contraction coefficients.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShellKind {
    Pure(u32),
    Combined,
}

impl ShellKind {
    /// Reserved integer code of a combined s+p shell.
    pub const COMBINED_CODE: i32 = -1;

    /// Integer angular momentum code, [`Self::COMBINED_CODE`] for combined shells
    pub fn code(self) -> i32 {
        match self {
            Self::Pure(l) => l as i32,
            Self::Combined => Self::COMBINED_CODE,
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combined => f.write_str("sp"),
            Self::Pure(l) => match SHELL_LABELS.get(*l as usize) {
                Some(&label) => f.write_str(label),
                None => write!(f, "l={l}"),
            },
        }
    }
}

/// Shell labels in order of their angular momentum
const SHELL_LABELS: [&str; 7] = ["s", "p", "d", "f", "g", "h", "i"];

/// Resolves a shell-type label (`"S"`, `"p"`, `"SP"`, `"L"`, ...) to its angular
/// momentum. Labels are matched case-insensitively.
pub fn angular_momentum_code_of(label: &str) -> Result<ShellKind, AssemblyError> {
    let normalized = label.trim().to_ascii_lowercase();

    if normalized == "sp" || normalized == "l" {
        return Ok(ShellKind::Combined);
    }

    SHELL_LABELS
        .iter()
        .position(|&known| known == normalized)
        .map(|l| ShellKind::Pure(l as u32))
        .ok_or_else(|| AssemblyError::UnknownShellType(label.to_owned()))
}

/// Number of Cartesian components of a shell with angular momentum `l`
pub const fn orbital_count(l: u32) -> usize {
    ((l + 1) * (l + 2) / 2) as usize
}
