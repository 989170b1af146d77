pub mod dispatcher;
pub mod replies;

pub use dispatcher::TurnDispatcher;
