//! Task dispatch: journaled, bounded, at-least-once execution of workflows

mod dispatcher;
mod runner;

pub use dispatcher::TaskDispatcher;
pub use runner::WorkflowRunner;
