pub mod answer_retrieval;
pub mod completion;
pub mod context;

pub use answer_retrieval::{AnswerOrchestrator, AnswerSource, ChatAnswer, ChatQuery};
pub use completion::{
    AzureCompletionService, ChatRole, ChatTurn, Completion, CompletionService, CompletionSettings,
    UpstreamError,
};
pub use context::{assemble_context, ContextLimits};
