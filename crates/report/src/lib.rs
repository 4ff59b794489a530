pub mod disaster;
pub mod diversity;
pub mod evaluation;
pub mod export;
pub mod generator;
pub mod sections;
pub mod template;

pub use disaster::DisasterType;
pub use diversity::{ensure_attribution, ensure_section_diversity, DiversityOutcome, OPENING_CHARS};
pub use evaluation::{evaluate_batch, rouge, RougeScore, SummaryMetrics};
pub use export::ExportBundle;
pub use generator::{ReportStage, StructuredOutputs, StructuredReport, StructuredReportGenerator};
pub use sections::{ReportSections, SectionKey};
pub use template::{assemble_report, format_byline, normalize_headers, strip_canonical_headers, strip_header_lines, today};
