pub mod io;
pub mod timing;
pub mod volume;

use crate::model::StatementStatistics;

/// A single heuristic over one statement.
///
/// Rules are stateless and independent; each returns at most one message.
pub trait StatementRule: Send + Sync {
    fn id(&self) -> &'static str;
    fn evaluate(&self, stmt: &StatementStatistics) -> Option<String>;
}

/// Rules run by default, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn StatementRule>> {
    vec![
        Box::new(timing::HighMeanExecTimeRule),
        Box::new(timing::HighStddevExecTimeRule),
        Box::new(io::TempBlocksRule),
        Box::new(io::SharedBlocksReadRatioRule),
        Box::new(volume::HighWalBytesRule),
    ]
}

/// Default rules plus the opt-in total-time and rows-per-call checks.
pub fn extended_rules() -> Vec<Box<dyn StatementRule>> {
    vec![
        Box::new(timing::HighTotalExecTimeRule),
        Box::new(timing::HighMeanExecTimeRule),
        Box::new(timing::HighStddevExecTimeRule),
        Box::new(io::TempBlocksRule),
        Box::new(io::SharedBlocksReadRatioRule),
        Box::new(volume::LowRowsPerCallRule),
        Box::new(volume::HighWalBytesRule),
    ]
}
