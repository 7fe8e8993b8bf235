//! Console output and plot artifacts for finished experiments.

pub mod artifacts;
pub mod pdf;
pub mod printable;

pub use artifacts::{
    ArtifactRenderer, COMPARISON_METHOD, Figure, NORM_SUFFIX, PlotArtifact, PlotKind,
    artifact_file_name, comparison_figures, family_figures, render_all,
};
pub use pdf::PdfRenderer;
pub use printable::{Printable, render_console, render_summary};
