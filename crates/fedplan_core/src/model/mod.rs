mod scenario;
mod summary;

pub use scenario::{
    ConversionSource, MortalityAssumptions, ParticipantScenario, RothConversion, Scenario,
    TspPlan, TspTransferMode, WithdrawalStrategy,
};
pub use summary::{ProjectionSummary, YearProjection};
