pub mod pdf;
pub mod raster;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::session::Conversation;
use pdf::{Assembler, PdfAssembler};
use raster::{BubbleRasterizer, Rasterizer};

/// Fixed name of the exported document.
pub const EXPORT_FILE_NAME: &str = "conversa.pdf";

/// Where an export currently stands. A new export may begin only from
/// `Idle`, `Done` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Capturing,
    Assembling,
    Done,
    Failed,
}

/// Export failures. `Display` is the user-visible notice; the `Failed`
/// payload holds detail that is only logged.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The conversation still holds nothing beyond the greeting.
    #[error("Envie uma mensagem antes de exportar a conversa.")]
    NothingToExport,

    /// An export is already running.
    #[error("Uma exportação já está em andamento.")]
    ExportInProgress,

    /// The cancellation token fired at a suspension point.
    #[error("Exportação cancelada.")]
    Cancelled,

    /// Rasterization, assembly or the file write failed.
    #[error("Desculpe, houve um erro ao exportar a conversa. Tente novamente em alguns instantes.")]
    Failed(String),
}

/// Drives one transcript export at a time through capture and assembly.
pub struct Exporter {
    rasterizer: Arc<dyn Rasterizer>,
    assembler: Arc<dyn Assembler>,
    phase: ExportPhase,
}

impl Exporter {
    pub fn new() -> Self {
        Self::with_pipeline(Arc::new(BubbleRasterizer), Arc::new(PdfAssembler))
    }

    pub fn with_rasterizer(rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self::with_pipeline(rasterizer, Arc::new(PdfAssembler))
    }

    pub fn with_pipeline(rasterizer: Arc<dyn Rasterizer>, assembler: Arc<dyn Assembler>) -> Self {
        Self {
            rasterizer,
            assembler,
            phase: ExportPhase::Idle,
        }
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    /// Exports the conversation to `conversa.pdf` inside `dir`.
    ///
    /// Refuses overlapping runs and greeting-only conversations. The
    /// cancellation token is observed before capture, between capture and
    /// assembly, and before the file write; a cancelled run ends in `Failed`,
    /// from which a fresh export may start. The conversation itself is never
    /// touched.
    pub async fn export(
        &mut self,
        conversation: &Conversation,
        dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ExportError> {
        if matches!(self.phase, ExportPhase::Capturing | ExportPhase::Assembling) {
            return Err(ExportError::ExportInProgress);
        }
        if !conversation.user_has_sent() {
            return Err(ExportError::NothingToExport);
        }

        self.phase = ExportPhase::Capturing;
        if cancel.is_cancelled() {
            return Err(self.cancelled());
        }

        let messages = conversation.messages().to_vec();
        let rasterizer = Arc::clone(&self.rasterizer);
        let bitmap =
            match tokio::task::spawn_blocking(move || rasterizer.rasterize(&messages)).await {
                Ok(bitmap) => bitmap,
                Err(e) => return Err(self.failed(format!("capture task: {e}"))),
            };
        if cancel.is_cancelled() {
            return Err(self.cancelled());
        }

        self.phase = ExportPhase::Assembling;
        let assembler = Arc::clone(&self.assembler);
        let bytes = match tokio::task::spawn_blocking(move || assembler.assemble(&bitmap)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return Err(self.failed(format!("assembly: {e}"))),
            Err(e) => return Err(self.failed(format!("assembly task: {e}"))),
        };
        if cancel.is_cancelled() {
            return Err(self.cancelled());
        }

        let path = dir.join(EXPORT_FILE_NAME);
        if let Err(e) = fs::write(&path, &bytes) {
            return Err(self.failed(format!("write {}: {e}", path.display())));
        }

        self.phase = ExportPhase::Done;
        info!("Transcript exported to {}", path.display());
        Ok(path)
    }

    fn cancelled(&mut self) -> ExportError {
        self.phase = ExportPhase::Failed;
        ExportError::Cancelled
    }

    fn failed(&mut self, detail: String) -> ExportError {
        error!("Export failed: {}", detail);
        self.phase = ExportPhase::Failed;
        ExportError::Failed(detail)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}
