// src/export/logic.rs

use crate::core::admin::AdminLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::xlsx::export_xlsx;
use crate::ui::messages::warning;
use std::path::Path;

/// High level export entry point.
pub struct ExportLogic;

impl ExportLogic {
    /// Export every team × game row of one session.
    ///
    /// - `format`: csv | json | xlsx
    /// - `file`: absolute path of the output file
    /// - `session_id`: session to export; teams of other sessions never leak in
    ///
    /// Returns the number of rows written (0 when the session has no teams,
    /// in which case no file is created).
    pub fn export(
        pool: &DbPool,
        format: ExportFormat,
        file: &str,
        session_id: &str,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output file path must be absolute: {file}"
            )));
        }

        let rows = AdminLogic::export_results(pool, session_id)?;

        if rows.is_empty() {
            warning(format!("No teams registered in session '{session_id}'."));
            return Ok(0);
        }

        ensure_writable(path, force)?;

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
            ExportFormat::Xlsx => export_xlsx(&rows, path)?,
        }

        Ok(rows.len())
    }
}
