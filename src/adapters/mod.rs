// Adapters layer: concrete implementations for external systems (files, workbooks, output documents).

pub mod export;
pub mod html;
pub mod storage;
pub mod workbook;
