pub mod config_cmd;
pub mod output;
pub mod report_cmd;
pub mod text;
