use crate::cli::actions::{link, security, server, Action};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
        Action::Security(args) => security::execute(&args),
        Action::Link(args) => link::execute(&args),
    }
}
