pub mod formatter;

pub use formatter::{
    format_json, format_summary_table, format_tariff_table, should_use_colors, JsonReport,
    NumberFormat,
};
