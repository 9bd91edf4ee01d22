//! Registry of shading programs the sky atmosphere pass can resolve.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

/// Built-in full-screen program name.
pub const SKY_ATMOSPHERE_PROGRAM: &str = "sky_atmosphere";
/// Built-in compute program name.
pub const SKY_ATMOSPHERE_COMPUTE_PROGRAM: &str = "sky_atmosphere_compute";
/// Kernel entry point of the compute program.
pub const SKY_ATMOSPHERE_KERNEL: &str = "ComputeSkyAtmosphere";
/// Thread group size of the compute kernel.
pub const SKY_ATMOSPHERE_GROUP_SIZE: (u32, u32) = (8, 8);

/// Error types for program resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("program '{name}' not found in library")]
    NotLoaded { name: String },

    #[error("program '{name}' is a {actual} program, expected {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("program '{name}' has no kernel '{kernel}'")]
    KernelNotFound { name: String, kernel: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    /// Evaluated once per output pixel by a full-screen draw.
    FullScreen,
    /// Dispatched over thread groups of `group_size` pixels.
    Compute { group_size: (u32, u32) },
}

impl ProgramKind {
    fn label(&self) -> &'static str {
        match self {
            Self::FullScreen => "full-screen",
            Self::Compute { .. } => "compute",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub kind: ProgramKind,
    pub entry_point: String,
}

impl Program {
    pub fn full_screen(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProgramKind::FullScreen,
            entry_point: "main".to_string(),
        }
    }

    pub fn compute(name: impl Into<String>, kernel: impl Into<String>, group_size: (u32, u32)) -> Self {
        Self {
            name: name.into(),
            kind: ProgramKind::Compute { group_size },
            entry_point: kernel.into(),
        }
    }

    /// Thread group size, or `None` for full-screen programs.
    pub fn group_size(&self) -> Option<(u32, u32)> {
        match self.kind {
            ProgramKind::Compute { group_size } => Some(group_size),
            ProgramKind::FullScreen => None,
        }
    }
}

/// Central registry of loaded programs.
#[derive(Debug)]
pub struct ProgramLibrary {
    programs: HashMap<String, Arc<Program>>,
}

impl ProgramLibrary {
    /// Create a new empty program library.
    pub fn new() -> Self {
        Self {
            programs: HashMap::new(),
        }
    }

    /// Library with the sky atmosphere programs already registered.
    pub fn with_builtin() -> Self {
        let mut library = Self::new();
        library.register(Program::full_screen(SKY_ATMOSPHERE_PROGRAM));
        library.register(Program::compute(
            SKY_ATMOSPHERE_COMPUTE_PROGRAM,
            SKY_ATMOSPHERE_KERNEL,
            SKY_ATMOSPHERE_GROUP_SIZE,
        ));
        library
    }

    /// Register a program, replacing any previous one of the same name.
    pub fn register(&mut self, program: Program) -> Arc<Program> {
        let program = Arc::new(program);
        let replaced = self
            .programs
            .insert(program.name.clone(), program.clone())
            .is_some();
        if replaced {
            tracing::debug!(name = %program.name, "replaced program");
        } else {
            tracing::debug!(name = %program.name, "registered program");
        }
        program
    }

    /// Get a previously registered program by name.
    pub fn get(&self, name: &str) -> Option<Arc<Program>> {
        self.programs.get(name).cloned()
    }

    /// Resolve a program that must be a full-screen program.
    pub fn resolve_full_screen(&self, name: &str) -> Result<Arc<Program>, ProgramError> {
        let program = self.get(name).ok_or_else(|| ProgramError::NotLoaded {
            name: name.to_string(),
        })?;
        match program.kind {
            ProgramKind::FullScreen => Ok(program),
            other => Err(ProgramError::WrongKind {
                name: name.to_string(),
                expected: ProgramKind::FullScreen.label(),
                actual: other.label(),
            }),
        }
    }

    /// Resolve a compute program and check that it exposes `kernel`.
    pub fn resolve_compute(&self, name: &str, kernel: &str) -> Result<Arc<Program>, ProgramError> {
        let program = self.get(name).ok_or_else(|| ProgramError::NotLoaded {
            name: name.to_string(),
        })?;
        let ProgramKind::Compute { .. } = program.kind else {
            return Err(ProgramError::WrongKind {
                name: name.to_string(),
                expected: "compute",
                actual: program.kind.label(),
            });
        };
        if program.entry_point != kernel {
            return Err(ProgramError::KernelNotFound {
                name: name.to_string(),
                kernel: kernel.to_string(),
            });
        }
        Ok(program)
    }

    /// Number of registered programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl Default for ProgramLibrary {
    fn default() -> Self {
        Self::new()
    }
}
