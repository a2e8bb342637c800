//! helmcurve-report: Rendering of difficulty reports.
//!
//! JSON persistence lives on [`helmcurve_core::report::DifficultyReport`];
//! this crate renders the same report as a self-contained HTML page.

pub mod html;

pub use html::{generate_html, write_html_report};
