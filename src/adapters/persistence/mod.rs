//! Filesystem adapters: recipient and message inputs, CSV report export.

pub mod input_files;
pub mod report_csv;

pub use input_files::FsInputSource;
pub use report_csv::CsvReportWriter;
