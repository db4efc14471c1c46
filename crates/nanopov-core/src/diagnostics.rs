use serde::{Deserialize, Serialize};

/// Category of a recoverable problem found while building a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Polygon or unknown shape type; the shape was skipped.
    UnsupportedShape,
    /// Ellipse or rectangle used inside a silo; rendered best-effort.
    UntestedPath,
    /// Camera style without tuned framing constants.
    StyleNotOptimized,
    /// A finish preset replaced the requested filter/transmit values.
    ColorFinishOverride,
    /// No default color for a material; the fallback color was used.
    UnknownMaterial,
    /// Vacuum shape with no solid before it to cut; not emitted.
    OrphanVacuum,
}

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Info,
}

/// A single recoverable problem, with the layer and shape it came from when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub layer: Option<usize>,
    pub shape: Option<usize>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            layer: None,
            shape: None,
        }
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::warning(kind, message)
        }
    }

    pub fn at(mut self, layer: usize, shape: usize) -> Self {
        self.layer = Some(layer);
        self.shape = Some(shape);
        self
    }
}

/// Ordered collection of diagnostics. Every entry is also sent to the log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        let level = match diagnostic.severity {
            Severity::Warning => log::Level::Warn,
            Severity::Info => log::Level::Info,
        };
        match (diagnostic.layer, diagnostic.shape) {
            (Some(layer), Some(shape)) => log::log!(
                level,
                "{:?} (layer {}, shape {}): {}",
                diagnostic.kind,
                layer,
                shape,
                diagnostic.message
            ),
            _ => log::log!(level, "{:?}: {}", diagnostic.kind, diagnostic.message),
        }
        self.entries.push(diagnostic);
    }

    /// Number of entries at `Severity::Warning`.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_entries_are_not_warnings() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning(DiagnosticKind::UnknownMaterial, "no Ge color").at(0, 1));
        diags.push(Diagnostic::info(DiagnosticKind::OrphanVacuum, "nothing to cut").at(1, 0));
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.warning_count(), 1);

        let orphan: Vec<&Diagnostic> = diags.of_kind(DiagnosticKind::OrphanVacuum).collect();
        assert_eq!(orphan.len(), 1);
        assert_eq!(orphan[0].severity, Severity::Info);
        assert_eq!((orphan[0].layer, orphan[0].shape), (Some(1), Some(0)));
    }
}
