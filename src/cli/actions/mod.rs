pub mod link;
pub mod security;
pub mod server;

// Single match over every action lives in run.rs.
mod run;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    Security(security::Args),
    Link(link::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
